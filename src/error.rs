//! Error types for the docflow expression crate
//!
//! Expression evaluation itself never fails; these errors come from loading
//! configuration, counter tables and field documents.

use crate::config::ConfigError;
use crate::counter::CounterError;
use crate::evaluator::EvaluationError;
use crate::fields::DocumentError;
use crate::registry::FunctionError;
use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Any error the crate can report
#[derive(Error, Debug)]
pub enum Error {
    /// Counter store errors
    #[error(transparent)]
    Counter(#[from] CounterError),

    /// Configuration loading errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Field definition or document errors
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Errors raised while resolving an expression
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Function errors surfaced outside an evaluation
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// Other I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
