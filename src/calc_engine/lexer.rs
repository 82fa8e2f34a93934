use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{CalcResult, CalculatorError};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    /// One of `+ - * /`.
    Op(char),
    /// An operator the calculator recognises but does not evaluate, such as `%` or `**`.
    UnsupportedOp(&'static str),
    Ident(String),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Op(c) => write!(f, "'{}'", c),
            Token::UnsupportedOp(op) => write!(f, "'{}'", op),
            Token::Ident(name) => write!(f, "name '{}'", name),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

/// A token and the char offset it starts at.
pub type Spanned = (Token, usize);

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }
}

pub fn tokenize(input: &str) -> CalcResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut cursor = Cursor {
        chars: input.chars().peekable(),
        pos: 0,
    };

    while let Some(c) = cursor.peek() {
        let start = cursor.pos;
        if c.is_whitespace() {
            cursor.bump();
            continue;
        }
        if c.is_ascii_digit() || c == '.' {
            tokens.push((lex_number(&mut cursor)?, start));
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(ch) = cursor.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    ident.push(ch);
                    cursor.bump();
                } else {
                    break;
                }
            }
            tokens.push((Token::Ident(ident), start));
            continue;
        }

        cursor.bump();
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '*' if cursor.eat('*') => Token::UnsupportedOp("**"),
            '/' if cursor.eat('/') => Token::UnsupportedOp("//"),
            '+' | '-' | '*' | '/' => Token::Op(c),
            '%' => Token::UnsupportedOp("%"),
            '^' => Token::UnsupportedOp("^"),
            '<' if cursor.eat('=') => Token::UnsupportedOp("<="),
            '>' if cursor.eat('=') => Token::UnsupportedOp(">="),
            '<' => Token::UnsupportedOp("<"),
            '>' => Token::UnsupportedOp(">"),
            '=' if cursor.eat('=') => Token::UnsupportedOp("=="),
            '!' if cursor.eat('=') => Token::UnsupportedOp("!="),
            _ => {
                return Err(CalculatorError::syntax(
                    format!("invalid character '{}'", c),
                    start,
                ))
            }
        };
        tokens.push((token, start));
    }

    Ok(tokens)
}

fn lex_number(cursor: &mut Cursor<'_>) -> CalcResult<Token> {
    let start = cursor.pos;
    let mut literal = String::new();
    let mut has_dot = false;

    while let Some(ch) = cursor.peek() {
        match ch {
            '0'..='9' => literal.push(ch),
            '.' if !has_dot => {
                has_dot = true;
                literal.push(ch);
            }
            _ => break,
        }
        cursor.bump();
    }

    // Exponents, digit separators and suffixes like `2x` are not numbers here.
    if cursor
        .peek()
        .is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
    {
        while let Some(ch) = cursor.peek() {
            if !(ch.is_alphanumeric() || ch == '_' || ch == '.') {
                break;
            }
            literal.push(ch);
            cursor.bump();
        }
        return Err(CalculatorError::syntax(
            format!("invalid number literal '{}'", literal),
            start,
        ));
    }

    if literal == "." {
        return Err(CalculatorError::syntax("unexpected '.'", start));
    }

    let int_part = literal.split('.').next().unwrap_or_default();
    if !has_dot && int_part.len() > 1 && int_part.starts_with('0') && int_part.contains(|c: char| c != '0') {
        return Err(CalculatorError::syntax(
            format!("leading zeros are not allowed in '{}'", literal),
            start,
        ));
    }

    let value: f64 = literal
        .parse()
        .map_err(|_| CalculatorError::syntax(format!("invalid number '{}'", literal), start))?;
    if value.is_infinite() {
        return Err(CalculatorError::out_of_range(literal));
    }
    Ok(Token::Number(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCause;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn tokenizes_arithmetic() {
        assert_eq!(
            kinds("-(1.5 + .5) / 2."),
            vec![
                Token::Op('-'),
                Token::LParen,
                Token::Number(1.5),
                Token::Op('+'),
                Token::Number(0.5),
                Token::RParen,
                Token::Op('/'),
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn records_char_offsets() {
        let tokens = tokenize("12 *  x").unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|(_, pos)| *pos).collect();
        assert_eq!(offsets, [0, 3, 6]);
    }

    #[test]
    fn recognises_unsupported_operators() {
        assert_eq!(
            kinds("2 ** 3 // 4 % 5 <= 6"),
            vec![
                Token::Number(2.0),
                Token::UnsupportedOp("**"),
                Token::Number(3.0),
                Token::UnsupportedOp("//"),
                Token::Number(4.0),
                Token::UnsupportedOp("%"),
                Token::Number(5.0),
                Token::UnsupportedOp("<="),
                Token::Number(6.0),
            ]
        );
    }

    #[test]
    fn identifiers_are_tokens() {
        assert_eq!(
            kinds("foo_1(2)"),
            vec![
                Token::Ident("foo_1".to_string()),
                Token::LParen,
                Token::Number(2.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn rejects_exponent_notation() {
        let err = tokenize("1e5").unwrap_err();
        assert_eq!(err.cause(), ErrorCause::Syntax);
        assert!(err.message().contains("'1e5'"));
    }

    #[test]
    fn rejects_leading_zeros_but_not_zero() {
        assert!(tokenize("05").is_err());
        assert_eq!(kinds("00"), vec![Token::Number(0.0)]);
        assert_eq!(kinds("05.5"), vec![Token::Number(5.5)]);
    }

    #[test]
    fn rejects_stray_characters() {
        let err = tokenize("1 $ 2").unwrap_err();
        assert_eq!(err.cause(), ErrorCause::Syntax);
        assert!(err.message().contains("position 2"));
        assert!(tokenize("1 = 2").is_err());
        assert!(tokenize(".").is_err());
    }

    #[test]
    fn huge_literal_is_out_of_range() {
        let literal = "9".repeat(400);
        assert_eq!(tokenize(&literal).unwrap_err().cause(), ErrorCause::OutOfRange);
    }
}
