//! Conditional functions

mod if_function;

pub use if_function::{ComparisonOperator, IfFunction};

use crate::registry::function::FunctionRegistry;

/// Register all conditional functions
pub fn register_conditional_functions(registry: &mut FunctionRegistry) {
    registry.register(IfFunction);
}
