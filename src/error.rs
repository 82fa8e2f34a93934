pub type CalcResult<T> = Result<T, CalculatorError>;

/// What went wrong, for callers that need to branch on it.
/// The message is what gets shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCause {
    Syntax,
    Unsupported,
    DivisionByZero,
    OutOfRange,
}

/// The one error every stage of `calculate` reports.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CalculatorError {
    cause: ErrorCause,
    message: String,
}

impl CalculatorError {
    pub fn syntax(detail: impl Into<String>, position: usize) -> Self {
        Self {
            cause: ErrorCause::Syntax,
            message: format!("Invalid syntax: {} (at position {})", detail.into(), position),
        }
    }

    pub fn unsupported(component: impl Into<String>) -> Self {
        Self {
            cause: ErrorCause::Unsupported,
            message: format!("Unsupported expression component: {}", component.into()),
        }
    }

    pub fn division_by_zero() -> Self {
        Self {
            cause: ErrorCause::DivisionByZero,
            message: "Division by zero".to_string(),
        }
    }

    pub fn out_of_range(literal: impl Into<String>) -> Self {
        Self {
            cause: ErrorCause::OutOfRange,
            message: format!("Number out of range: {}", literal.into()),
        }
    }

    pub fn cause(&self) -> ErrorCause {
        self.cause
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
