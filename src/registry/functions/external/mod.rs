//! Functions reaching outside the process: scripts and databases

mod scripting;
mod sql;

pub use scripting::{ScriptingFunction, run_script};
pub use sql::{SqlError, SqlExecutor, SqlFunction, SqlRow};

use crate::registry::function::FunctionRegistry;

/// Register all external functions
pub fn register_external_functions(registry: &mut FunctionRegistry) {
    registry.register(ScriptingFunction);
    registry.register(SqlFunction);
}
