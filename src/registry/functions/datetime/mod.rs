//! Date and time functions

mod format_date;

pub use format_date::{FormatDateFunction, format_date};

use crate::registry::function::FunctionRegistry;

/// Register all datetime functions
pub fn register_datetime_functions(registry: &mut FunctionRegistry) {
    registry.register(FormatDateFunction);
}
