//! Counter functions

mod autoincrement;

pub use autoincrement::AutoIncrementFunction;

use crate::registry::function::FunctionRegistry;

/// Register all counter functions
pub fn register_counter_functions(registry: &mut FunctionRegistry) {
    registry.register(AutoIncrementFunction);
}
