use std::fmt;

use super::EvaluationTrace;
use crate::error::{CalcResult, CalculatorError};

/// Operators a tree may contain. Anything the lexer can produce beyond these
/// is rejected while parsing.
pub const BINARY_OPERATORS: [(char, BinaryOp); 4] = [
    ('+', BinaryOp::Add),
    ('-', BinaryOp::Sub),
    ('*', BinaryOp::Mul),
    ('/', BinaryOp::Div),
];

pub const UNARY_OPERATORS: [(char, UnaryOp); 2] = [('+', UnaryOp::Plus), ('-', UnaryOp::Minus)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl UnaryOp {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        UNARY_OPERATORS
            .iter()
            .find(|(c, _)| *c == symbol)
            .map(|(_, op)| *op)
    }

    pub fn symbol(self) -> char {
        match self {
            UnaryOp::Plus => '+',
            UnaryOp::Minus => '-',
        }
    }

    fn apply(self, operand: f64) -> f64 {
        match self {
            UnaryOp::Plus => operand,
            UnaryOp::Minus => -operand,
        }
    }
}

impl BinaryOp {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        BINARY_OPERATORS
            .iter()
            .find(|(c, _)| *c == symbol)
            .map(|(_, op)| *op)
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    fn apply(self, left: f64, right: f64) -> CalcResult<f64> {
        match self {
            BinaryOp::Add => Ok(left + right),
            BinaryOp::Sub => Ok(left - right),
            BinaryOp::Mul => Ok(left * right),
            BinaryOp::Div if right == 0.0 => Err(CalculatorError::division_by_zero()),
            BinaryOp::Div => Ok(left / right),
        }
    }
}

/// Parsed arithmetic. Built once per `calculate` call and thrown away after.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Depth-first, left operand before right.
    pub fn evaluate(&self, trace: &mut EvaluationTrace) -> CalcResult<f64> {
        match self {
            Expr::Literal(value) => Ok(*value),
            Expr::Unary { op, operand } => {
                let value = operand.evaluate(trace)?;
                let result = op.apply(value);
                if *op == UnaryOp::Minus {
                    trace.add_step(format!("-{}", value), result);
                }
                Ok(result)
            }
            Expr::Binary { .. } => {
                let (first, rest) = self.left_spine();
                let mut acc = first.evaluate(trace)?;
                for (op, right) in rest {
                    let right = right.evaluate(trace)?;
                    let result = op.apply(acc, right)?;
                    trace.add_step(format!("{} {} {}", acc, op.symbol(), right), result);
                    acc = result;
                }
                Ok(acc)
            }
        }
    }

    /// Unrolls a left-associative chain such as `1 + 2 * 3 - 4` into its
    /// leftmost operand and the `(op, right)` pairs applied to it in order.
    /// Chains grow on the left, so walking them in a loop keeps recursion
    /// bounded by parenthesis depth alone.
    fn left_spine(&self) -> (&Expr, Vec<(BinaryOp, &Expr)>) {
        let mut rest = Vec::new();
        let mut node = self;
        while let Expr::Binary { op, left, right } = node {
            rest.push((*op, &**right));
            node = &**left;
        }
        rest.reverse();
        (node, rest)
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node, &mut pending);
        }
    }
}

/// Moves the boxed children out, leaving literals behind, so dropping a
/// long chain never recurses.
fn detach_children(expr: &mut Expr, into: &mut Vec<Expr>) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Unary { operand, .. } => {
            into.push(std::mem::replace(&mut **operand, Expr::Literal(0.0)));
        }
        Expr::Binary { left, right, .. } => {
            into.push(std::mem::replace(&mut **left, Expr::Literal(0.0)));
            into.push(std::mem::replace(&mut **right, Expr::Literal(0.0)));
        }
    }
}

impl fmt::Display for Expr {
    /// Fully parenthesised, so the grouping the parser chose is visible.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Unary { op, operand } => write!(f, "({}{})", op.symbol(), operand),
            Expr::Binary { .. } => {
                let (first, rest) = self.left_spine();
                for _ in &rest {
                    f.write_str("(")?;
                }
                write!(f, "{}", first)?;
                for (op, right) in rest {
                    write!(f, " {} {})", op.symbol(), right)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &Expr) -> CalcResult<f64> {
        expr.evaluate(&mut EvaluationTrace::new(false))
    }

    #[test]
    fn operator_tables_round_trip_symbols() {
        for (symbol, op) in BINARY_OPERATORS {
            assert_eq!(BinaryOp::from_symbol(symbol), Some(op));
            assert_eq!(op.symbol(), symbol);
        }
        assert_eq!(BinaryOp::from_symbol('%'), None);
        assert_eq!(UnaryOp::from_symbol('*'), None);
    }

    #[test]
    fn evaluates_nested_tree() {
        // -(2 + 3) * 4
        let tree = Expr::binary(
            BinaryOp::Mul,
            Expr::unary(
                UnaryOp::Minus,
                Expr::binary(BinaryOp::Add, Expr::Literal(2.0), Expr::Literal(3.0)),
            ),
            Expr::Literal(4.0),
        );
        assert_eq!(eval(&tree), Ok(-20.0));
    }

    #[test]
    fn negative_zero_divisor_is_still_zero() {
        let tree = Expr::binary(
            BinaryOp::Div,
            Expr::Literal(1.0),
            Expr::unary(UnaryOp::Minus, Expr::Literal(0.0)),
        );
        assert_eq!(eval(&tree), Err(CalculatorError::division_by_zero()));
    }

    #[test]
    fn trace_follows_evaluation_order() {
        let tree = Expr::binary(
            BinaryOp::Sub,
            Expr::binary(BinaryOp::Mul, Expr::Literal(2.0), Expr::Literal(3.0)),
            Expr::unary(UnaryOp::Minus, Expr::Literal(1.0)),
        );
        let mut trace = EvaluationTrace::new(true);
        assert_eq!(tree.evaluate(&mut trace), Ok(7.0));
        let ops: Vec<&str> = trace.steps.iter().map(|s| s.operation.as_str()).collect();
        assert_eq!(ops, ["2 * 3", "-1", "6 - -1"]);
    }

    #[test]
    fn display_shows_grouping() {
        let tree = Expr::binary(
            BinaryOp::Sub,
            Expr::binary(BinaryOp::Sub, Expr::Literal(10.0), Expr::Literal(2.0)),
            Expr::Literal(3.0),
        );
        assert_eq!(tree.to_string(), "((10 - 2) - 3)");
    }

    #[test]
    fn long_chain_evaluates_and_drops() {
        let mut tree = Expr::Literal(0.0);
        for _ in 0..100_000 {
            tree = Expr::binary(BinaryOp::Add, tree, Expr::Literal(1.0));
        }
        assert_eq!(eval(&tree), Ok(100_000.0));
        drop(tree);
    }

    #[test]
    fn chain_trace_keeps_left_to_right_order() {
        // 1 + 2 * 3 - 4
        let tree = Expr::binary(
            BinaryOp::Sub,
            Expr::binary(
                BinaryOp::Add,
                Expr::Literal(1.0),
                Expr::binary(BinaryOp::Mul, Expr::Literal(2.0), Expr::Literal(3.0)),
            ),
            Expr::Literal(4.0),
        );
        let mut trace = EvaluationTrace::new(true);
        assert_eq!(tree.evaluate(&mut trace), Ok(3.0));
        let ops: Vec<&str> = trace.steps.iter().map(|s| s.operation.as_str()).collect();
        assert_eq!(ops, ["2 * 3", "1 + 6", "7 - 4"]);
        assert_eq!(tree.to_string(), "((1 + (2 * 3)) - 4)");
    }
}
