//! Boolean condition evaluation for `<if expr="...">`
//!
//! Supports the subset upstream WebUI sources use: identifiers, `not`,
//! `and`, `or`, parentheses, `True` and `False`.

/// Platform predicates that map onto a define
const ALIASES: &[(&str, &str)] = &[
    ("is_linux", "linux"),
    ("is_macosx", "macosx"),
    ("is_chromeos", "chromeos_ash"),
];

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Ident(&'a str),
    Open,
    Close,
}

fn tokenize(expr: &str) -> Result<Vec<Token<'_>>, String> {
    let mut tokens = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => i += 1,
            b'(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            b')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            c if c == b'_' || c.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                tokens.push(Token::Ident(&expr[start..i]));
            }
            other => {
                return Err(format!(
                    "unexpected '{}' in expression '{}'",
                    other as char, expr
                ));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a, 'd> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    defines: &'d [(&'d str, bool)],
}

impl<'a> Parser<'a, '_> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek() == Some(&Token::Ident(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<bool, String> {
        let mut value = self.and_expr()?;
        while self.eat_keyword("or") {
            let rhs = self.and_expr()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and_expr(&mut self) -> Result<bool, String> {
        let mut value = self.not_expr()?;
        while self.eat_keyword("and") {
            let rhs = self.not_expr()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn not_expr(&mut self) -> Result<bool, String> {
        if self.eat_keyword("not") {
            return Ok(!self.not_expr()?);
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<bool, String> {
        let token = self.peek().cloned();
        self.pos += 1;
        match token {
            Some(Token::Open) => {
                let value = self.or_expr()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(value)
                    }
                    _ => Err("missing ')'".to_string()),
                }
            }
            Some(Token::Ident("True")) => Ok(true),
            Some(Token::Ident("False")) => Ok(false),
            Some(Token::Ident(name)) if matches!(name, "and" | "or" | "not") => {
                Err(format!("unexpected '{name}'"))
            }
            Some(Token::Ident(name)) => self.lookup(name),
            Some(Token::Close) => Err("unexpected ')'".to_string()),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn lookup(&self, name: &str) -> Result<bool, String> {
        let define = |key: &str| {
            self.defines
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
        };

        if let Some(value) = define(name) {
            return Ok(value);
        }
        if let Some((_, target)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
            return Ok(define(*target).unwrap_or(false));
        }
        if name.starts_with("is_") {
            // platform we are not building for
            return Ok(false);
        }
        Err(format!("unknown name '{name}'"))
    }
}

/// Evaluate `expr` against `defines`
pub fn evaluate(expr: &str, defines: &[(&str, bool)]) -> Result<bool, String> {
    let mut parser = Parser {
        tokens: tokenize(expr)?,
        pos: 0,
        defines,
    };
    let value = parser.or_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("trailing input in expression '{expr}'"));
    }
    Ok(value)
}
