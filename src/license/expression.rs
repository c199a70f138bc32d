//! SPDX expression parsing, used to check a declared license against the text-derived one.

use std::collections::HashSet;

use anyhow::{bail, Result};

use super::classifier::split_and;

/// Tokens produced by [`tokenize`].
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Id(String),
    And,
    Or,
    With,
    LParen,
    RParen,
}

/// Tokenize an SPDX license expression into a flat [`Vec<Token>`].
pub fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '(' {
            tokens.push(Token::LParen);
            chars.next();
        } else if c == ')' {
            tokens.push(Token::RParen);
            chars.next();
        } else {
            let mut s = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '(' || c == ')' {
                    break;
                }
                s.push(c);
                chars.next();
            }
            let token = match s.as_str() {
                "AND" | "and" => Token::And,
                "OR" | "or" => Token::Or,
                "WITH" | "with" => Token::With,
                _ => Token::Id(s),
            };
            tokens.push(token);
        }
    }
    tokens
}

/// Recursive descent evaluator: an identifier is `true` when it is one of the
/// licenses found in the package's text.
///
/// Grammar (AND binds tighter than OR):
/// ```text
/// expr     := or_expr
/// or_expr  := and_expr ( "OR" and_expr )*
/// and_expr := atom ( "AND" atom )*
/// atom     := "(" expr ")" | id ( "WITH" id )?
/// ```
struct ExprParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    found: &'a HashSet<String>,
    mentioned: HashSet<String>,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn parse_or(&mut self) -> Result<bool> {
        let mut result = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.consume();
            let rhs = self.parse_and()?;
            result = result || rhs;
        }
        Ok(result)
    }

    fn parse_and(&mut self) -> Result<bool> {
        let mut result = self.parse_atom()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.consume();
            let rhs = self.parse_atom()?;
            result = result && rhs;
        }
        Ok(result)
    }

    fn parse_atom(&mut self) -> Result<bool> {
        match self.consume() {
            Some(Token::LParen) => {
                let result = self.parse_or()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(result),
                    other => bail!("expected ')' but found {:?}", other),
                }
            }
            Some(Token::Id(id)) => {
                // the exception does not change which license applies
                if matches!(self.peek(), Some(Token::With)) {
                    self.consume();
                    match self.consume() {
                        Some(Token::Id(_)) => {}
                        other => bail!("expected exception id after WITH but found {:?}", other),
                    }
                }
                let base = base_id(&id).to_string();
                let hit = self.found.iter().any(|f| base_id(f) == base);
                self.mentioned.insert(base);
                Ok(hit)
            }
            other => bail!("expected license id or '(' but found {:?}", other),
        }
    }
}

/// Check whether a declared expression agrees with a text-derived `(A AND B)` expression.
///
/// They agree when the declared expression holds given the licenses found in
/// the text, and the text found no license the declaration never mentions.
/// Returns an error when `declared` is not a valid SPDX expression.
pub fn agrees_with_text(declared: &str, resolved: &str) -> Result<bool> {
    let found: HashSet<String> = split_and(resolved).into_iter().map(str::to_string).collect();

    let mut parser = ExprParser {
        tokens: tokenize(declared),
        pos: 0,
        found: &found,
        mentioned: HashSet::new(),
    };

    let holds = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        bail!("unexpected {:?} after end of expression", token);
    }

    let all_mentioned = found.iter().all(|id| parser.mentioned.contains(base_id(id)));

    Ok(holds && all_mentioned)
}

/// `GPL-3.0-only`, `GPL-3.0-or-later`, `GPL-3.0+` and `GPL-3.0` compare equal.
fn base_id(id: &str) -> &str {
    id.strip_suffix("-only")
        .or_else(|| id.strip_suffix("-or-later"))
        .or_else(|| id.strip_suffix('+'))
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_agreement() {
        assert!(agrees_with_text("MIT", "MIT").unwrap());
        assert!(!agrees_with_text("MIT", "ISC").unwrap());
    }

    #[test]
    fn test_or_declared_matches_either() {
        assert!(agrees_with_text("MIT OR Apache-2.0", "MIT").unwrap());
        assert!(agrees_with_text("(MIT OR Apache-2.0)", "(Apache-2.0 AND MIT)").unwrap());
    }

    #[test]
    fn test_and_declared_needs_both() {
        assert!(!agrees_with_text("MIT AND ISC", "MIT").unwrap());
        assert!(agrees_with_text("MIT AND ISC", "(ISC AND MIT)").unwrap());
    }

    #[test]
    fn test_extra_text_license_disagrees() {
        assert!(!agrees_with_text("MIT", "(MIT AND ISC)").unwrap());
    }

    #[test]
    fn test_deprecated_declared_matches_only_variant() {
        assert!(agrees_with_text("GPL-3.0", "GPL-3.0-only").unwrap());
        assert!(agrees_with_text("LGPL-2.1-or-later", "LGPL-2.1-only").unwrap());
    }

    #[test]
    fn test_with_exception_uses_base() {
        assert!(agrees_with_text("GPL-3.0-only WITH Classpath-exception-2.0", "GPL-3.0-only").unwrap());
    }

    #[test]
    fn test_invalid_expression_is_an_error() {
        assert!(agrees_with_text("(MIT OR", "MIT").is_err());
        assert!(agrees_with_text("MIT ISC", "MIT").is_err());
        assert!(agrees_with_text("", "MIT").is_err());
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("(MIT OR Apache-2.0)"),
            vec![
                Token::LParen,
                Token::Id("MIT".into()),
                Token::Or,
                Token::Id("Apache-2.0".into()),
                Token::RParen
            ]
        );
    }
}
