pub mod ast;
pub mod lexer;
pub mod parser;
pub mod percent;

use crate::error::CalcResult;
use ast::Expr;
use lexer::tokenize;
use parser::Parser;

pub use percent::rewrite_percentages;

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub operation: String,
    pub result: f64,
}

#[derive(Debug, Default)]
pub struct EvaluationTrace {
    pub steps: Vec<Step>,
    pub detailed_mode: bool,
}

impl EvaluationTrace {
    pub fn new(detailed_mode: bool) -> Self {
        EvaluationTrace {
            steps: Vec::new(),
            detailed_mode,
        }
    }

    pub fn add_step(&mut self, operation: String, result: f64) {
        if self.detailed_mode {
            self.steps.push(Step { operation, result });
        }
    }
}

/// Evaluates `+ - * /` arithmetic with unary signs, parentheses and `N%`
/// literals. Holds no state between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Calculator
    }

    #[tracing::instrument(level = "debug")]
    pub fn calculate(&self, expression: &str) -> CalcResult<f64> {
        self.calculate_traced(expression, &mut EvaluationTrace::new(false))
    }

    /// Same as [`Calculator::calculate`], recording each percentage rewrite
    /// and operation into `trace` when it is in detailed mode.
    pub fn calculate_traced(&self, expression: &str, trace: &mut EvaluationTrace) -> CalcResult<f64> {
        let tree = parse_expression(expression, trace)?;
        let result = tree.evaluate(trace);
        match &result {
            Ok(value) => tracing::debug!(value, "evaluated"),
            Err(err) => tracing::debug!(%err, "evaluation failed"),
        }
        result
    }
}

/// Runs the percentage rewrite, lexer and parser, returning the tree that
/// `calculate` would evaluate.
pub fn parse(expression: &str) -> CalcResult<Expr> {
    parse_expression(expression, &mut EvaluationTrace::new(false))
}

fn parse_expression(expression: &str, trace: &mut EvaluationTrace) -> CalcResult<Expr> {
    let rewritten = percent::rewrite_percentages_traced(expression.trim(), trace);
    tracing::debug!(%rewritten, "percentages rewritten");

    let tokens = tokenize(&rewritten)?;
    let tree = Parser::new(tokens, rewritten.chars().count()).parse()?;
    tracing::trace!(%tree, "parsed");
    Ok(tree)
}

/// Evaluates `expression` with a fresh [`Calculator`].
pub fn calculate(expression: &str) -> CalcResult<f64> {
    Calculator::new().calculate(expression)
}
