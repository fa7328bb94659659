//! Expression evaluator
//!
//! Scans an expression into text and calls, resolves calls innermost first
//! through the function registry and finishes with variable substitution.

#![warn(missing_docs)]

mod clock;
mod context;
mod engine;
mod error;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::VariableContext;
pub use engine::{ExpressionEngine, ExpressionEngineBuilder};
pub use error::{EvaluationError, EvaluationResult};
