use super::ast::{BinaryOp, Expr, UnaryOp};
use super::lexer::{Spanned, Token};
use crate::error::{CalcResult, CalculatorError};

/// Deepest combined nesting of parentheses and unary signs. Each level
/// costs several parser frames, so this keeps a 2 MiB thread stack safe
/// in debug builds. Flat operator chains are not counted.
pub const MAX_DEPTH: usize = 256;

/// Recursive descent over the token stream:
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/') unary)*
/// unary   := ('+' | '-') unary | primary
/// primary := number | '(' expr ')'
/// ```
pub struct Parser {
    tokens: Vec<Spanned>,
    current: usize,
    end_pos: usize,
    nesting: usize,
}

impl Parser {
    /// `end_pos` is the char length of the source, used to locate
    /// "unexpected end of input" errors.
    pub fn new(tokens: Vec<Spanned>, end_pos: usize) -> Self {
        Parser {
            tokens,
            current: 0,
            end_pos,
            nesting: 0,
        }
    }

    pub fn parse(&mut self) -> CalcResult<Expr> {
        if self.tokens.is_empty() {
            return Err(CalculatorError::syntax("empty expression", 0));
        }

        let expr = self.expr()?;
        if let Some((token, pos)) = self.tokens.get(self.current) {
            return Err(match token {
                Token::RParen => CalculatorError::syntax("unmatched ')'", *pos),
                other => CalculatorError::syntax(format!("unexpected {}", other), *pos),
            });
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current).map(|(token, _)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.current)
            .map_or(self.end_pos, |(_, pos)| *pos)
    }

    fn expr(&mut self) -> CalcResult<Expr> {
        let mut left = self.term()?;

        while let Some(Token::Op(c @ ('+' | '-'))) = self.peek() {
            let op = binary_op(*c)?;
            self.current += 1;
            let right = self.term()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn term(&mut self) -> CalcResult<Expr> {
        let mut left = self.unary()?;

        loop {
            match self.peek() {
                Some(Token::Op(c @ ('*' | '/'))) => {
                    let op = binary_op(*c)?;
                    self.current += 1;
                    let right = self.unary()?;
                    left = Expr::binary(op, left, right);
                }
                // The right operand still has to parse, so `1 %` stays a syntax error.
                Some(Token::UnsupportedOp(op)) => {
                    let op = *op;
                    self.current += 1;
                    self.unary()?;
                    return Err(unsupported_operator(op));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn unary(&mut self) -> CalcResult<Expr> {
        if let Some(Token::Op(c)) = self.peek() {
            if let Some(op) = UnaryOp::from_symbol(*c) {
                self.current += 1;
                self.enter()?;
                let operand = self.unary()?;
                self.nesting -= 1;
                return Ok(Expr::unary(op, operand));
            }
        }
        self.primary()
    }

    fn primary(&mut self) -> CalcResult<Expr> {
        let pos = self.position();
        let token = match self.tokens.get(self.current) {
            Some((token, _)) => token.clone(),
            None => return Err(CalculatorError::syntax("unexpected end of input", pos)),
        };
        self.current += 1;

        match token {
            Token::Number(value) => Ok(Expr::Literal(value)),
            Token::LParen => {
                if self.peek() == Some(&Token::RParen) {
                    return Err(CalculatorError::syntax("empty parentheses", pos));
                }
                self.enter()?;
                let inner = self.expr()?;
                self.nesting -= 1;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.current += 1;
                        Ok(inner)
                    }
                    Some(other) => Err(CalculatorError::syntax(
                        format!("expected ')' but found {}", other),
                        self.position(),
                    )),
                    None => Err(CalculatorError::syntax("'(' was never closed", pos)),
                }
            }
            Token::Ident(name) => {
                if self.peek() == Some(&Token::LParen) {
                    Err(CalculatorError::unsupported(format!("call to '{}'", name)))
                } else {
                    Err(CalculatorError::unsupported(format!("name '{}'", name)))
                }
            }
            other => Err(CalculatorError::syntax(format!("unexpected {}", other), pos)),
        }
    }

    /// Called before descending into a parenthesis or unary operand.
    fn enter(&mut self) -> CalcResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(CalculatorError::syntax(
                "expression is nested too deeply",
                self.position(),
            ));
        }
        Ok(())
    }
}

fn binary_op(symbol: char) -> CalcResult<BinaryOp> {
    BinaryOp::from_symbol(symbol)
        .ok_or_else(|| CalculatorError::unsupported(format!("operator '{}'", symbol)))
}

fn unsupported_operator(op: &str) -> CalculatorError {
    CalculatorError::unsupported(format!("operator '{}'", op))
}
