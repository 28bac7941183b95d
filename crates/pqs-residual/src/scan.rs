//! Rego 文本的词法扫描（最小实现，不是解析器）
//!
//! 语法合法性由 regorus 判定；这里只提取 residual store 需要的名字信息：
//! - 模块的 package 路径与顶层规则名
//! - 查询或模块中的静态 `data.` 引用路径

use std::collections::BTreeSet;

/// 扫描结果类型
pub type ScanResult<T> = Result<T, ScanError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("unterminated string starting at line {line}")]
    UnterminatedString { line: usize },
    #[error("unbalanced '{ch}' at line {line}")]
    UnbalancedBracket { ch: char, line: usize },
    #[error("module has no package declaration")]
    MissingPackage,
}

/// 模块概要：package 路径与顶层规则名
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleOutline {
    pub package: Vec<String>,
    pub rules: BTreeSet<String>,
}

impl ModuleOutline {
    /// `data.` 之后的引用路径能否由本模块解析
    ///
    /// 引用是 package 的前缀（子树引用），或以 package 开头且下一段是本模块定义的规则。
    pub fn resolves(&self, path: &[String]) -> bool {
        if self.package.starts_with(path) {
            return true;
        }
        path.starts_with(&self.package) && self.rules.contains(&path[self.package.len()])
    }

    pub fn package_path(&self) -> String {
        self.package.join(".")
    }
}

// ============================================================
// Lexer
// ============================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Dot,
    Open(char),
    Close(char),
    Newline,
    Other,
}

fn tokenize(src: &str) -> ScanResult<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '\n' => {
                tokens.push((Token::Newline, line));
                line += 1;
            }
            c if c.is_whitespace() => {}
            '"' => {
                let start = line;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(ScanError::UnterminatedString { line: start }),
                        },
                        Some('\n') | None => {
                            return Err(ScanError::UnterminatedString { line: start });
                        }
                        Some(other) => value.push(other),
                    }
                }
                tokens.push((Token::Str(value), start));
            }
            '`' => {
                let start = line;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(other) => {
                            if other == '\n' {
                                line += 1;
                            }
                            value.push(other);
                        }
                        None => return Err(ScanError::UnterminatedString { line: start }),
                    }
                }
                tokens.push((Token::Str(value), start));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Ident(ident), line));
            }
            c if c.is_ascii_digit() => {
                // 数字字面量（含小数、指数）整体跳过，避免 `1.5` 被拆成引用
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '.' || next == '_' {
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Other, line));
            }
            '.' => tokens.push((Token::Dot, line)),
            '(' | '[' | '{' => tokens.push((Token::Open(c), line)),
            ')' | ']' | '}' => tokens.push((Token::Close(c), line)),
            _ => tokens.push((Token::Other, line)),
        }
    }

    Ok(tokens)
}

/// Read `.ident` / `["str"]` segments starting at `start`.
fn read_segments(tokens: &[(Token, usize)], start: usize, path: &mut Vec<String>) -> usize {
    let mut i = start;
    loop {
        match (tokens.get(i), tokens.get(i + 1), tokens.get(i + 2)) {
            (Some((Token::Dot, _)), Some((Token::Ident(seg), _)), _) => {
                path.push(seg.clone());
                i += 2;
            }
            (
                Some((Token::Open('['), _)),
                Some((Token::Str(seg), _)),
                Some((Token::Close(']'), _)),
            ) => {
                path.push(seg.clone());
                i += 3;
            }
            _ => return i,
        }
    }
}

// ============================================================
// Outline
// ============================================================

/// 提取模块的 package 路径与顶层规则名
pub fn outline(source: &str) -> ScanResult<ModuleOutline> {
    let tokens = tokenize(source)?;
    let mut package: Option<Vec<String>> = None;
    let mut rules = BTreeSet::new();
    let mut depth = 0usize;
    let mut at_stmt_start = true;

    let mut i = 0;
    while i < tokens.len() {
        let (token, line) = &tokens[i];
        match token {
            Token::Open(_) => {
                depth += 1;
                at_stmt_start = false;
            }
            Token::Close(ch) => {
                depth = depth.checked_sub(1).ok_or(ScanError::UnbalancedBracket {
                    ch: *ch,
                    line: *line,
                })?;
                at_stmt_start = false;
            }
            Token::Newline => {
                if depth == 0 {
                    at_stmt_start = true;
                }
            }
            Token::Ident(word) if depth == 0 && at_stmt_start => {
                at_stmt_start = false;
                match word.as_str() {
                    "package" if package.is_none() => {
                        if let Some((Token::Ident(first), _)) = tokens.get(i + 1) {
                            let mut path = vec![first.clone()];
                            i = read_segments(&tokens, i + 2, &mut path);
                            package = Some(path);
                            continue;
                        }
                    }
                    "package" | "import" | "else" => {}
                    "default" => {
                        if let Some((Token::Ident(name), _)) = tokens.get(i + 1) {
                            rules.insert(name.clone());
                        }
                    }
                    name => {
                        rules.insert(name.to_string());
                    }
                }
            }
            _ => at_stmt_start = false,
        }
        i += 1;
    }

    if depth != 0 {
        let line = tokens.last().map(|(_, l)| *l).unwrap_or(1);
        return Err(ScanError::UnbalancedBracket { ch: '{', line });
    }

    let package = package.ok_or(ScanError::MissingPackage)?;
    Ok(ModuleOutline { package, rules })
}

/// 提取文本中所有静态 `data.` 引用路径（去重，保持出现顺序）
///
/// 动态下标（如 `data.policies[input.user]`）处截断。`with` 的替换目标不算引用。
pub fn data_refs(text: &str) -> ScanResult<Vec<Vec<String>>> {
    let tokens = tokenize(text)?;
    let mut refs: Vec<Vec<String>> = Vec::new();

    for (i, (token, _)) in tokens.iter().enumerate() {
        let Token::Ident(word) = token else {
            continue;
        };
        if word != "data" {
            continue;
        }
        // `input.data` 之类的字段访问不是根引用
        if i > 0 && tokens[i - 1].0 == Token::Dot {
            continue;
        }
        if i > 0 && matches!(&tokens[i - 1].0, Token::Ident(w) if w == "with") {
            continue;
        }
        let mut path = Vec::new();
        read_segments(&tokens, i + 1, &mut path);
        if !refs.contains(&path) {
            refs.push(path);
        }
    }

    Ok(refs)
}
