//! Function registry for document expressions
//!
//! Functions are trait objects keyed by their exact expression name. Each one
//! declares a signature used for arity checks and the generated catalogue,
//! and a fallback value the evaluator substitutes when it fails.

#![warn(missing_docs)]

pub mod function;
pub mod functions;
pub mod signature;

pub use function::{
    EvaluationContext, ExpressionFunction, FunctionError, FunctionRegistry, FunctionResult,
};
pub use functions::{RegexCache, SqlError, SqlExecutor, SqlRow};
pub use signature::{FunctionSignature, ParameterInfo};

/// Create a registry with all built-in functions
pub fn create_standard_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    functions::string::register_string_functions(&mut registry);
    functions::datetime::register_datetime_functions(&mut registry);
    functions::conditional::register_conditional_functions(&mut registry);
    functions::regex::register_regex_functions(&mut registry);
    functions::counter::register_counter_functions(&mut registry);
    functions::external::register_external_functions(&mut registry);
    registry
}
