// Error types for expression evaluation

use crate::registry::function::FunctionError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors raised while resolving an expression.
///
/// They never leave [`ExpressionEngine::evaluate`](super::ExpressionEngine::evaluate):
/// the engine logs them and keeps the affected text or fallback value.
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// Function calls nested deeper than the configured limit
    #[error("Function calls nested deeper than {limit} levels")]
    NestingTooDeep {
        /// Configured maximum depth
        limit: usize,
    },

    /// Function evaluation error
    #[error("Function error: {0}")]
    Function(#[from] FunctionError),
}
