//! Arithmetic calculator with percentage literals.
//!
//! ```
//! use percent_calc::calculate;
//!
//! assert_eq!(calculate("200 * 10%").unwrap(), 20.0);
//! assert!(calculate("5 / 0").is_err());
//! ```

pub mod calc_engine;
pub mod commands;
pub mod error;
pub mod helpers;
pub mod keypad;

#[cfg(feature = "line")]
pub mod line_mode;
#[cfg(feature = "tui")]
mod render_help;
#[cfg(feature = "tui")]
pub mod tui_mode;

pub use calc_engine::{calculate, Calculator, EvaluationTrace, Step};
pub use error::{CalcResult, CalculatorError, ErrorCause};
