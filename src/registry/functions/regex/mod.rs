//! Regular expression functions

mod cache;
mod regexp_match;
mod regexp_replace;

pub use cache::{RegexCache, RegexCacheStats};
pub use regexp_match::RegexpMatchFunction;
pub use regexp_replace::{RegexpReplaceFunction, translate_replacement};

use crate::registry::function::{
    EvaluationContext, FunctionError, FunctionRegistry, FunctionResult,
};
use regex::Regex;
use std::sync::Arc;

/// Register all regex functions
pub fn register_regex_functions(registry: &mut FunctionRegistry) {
    registry.register(RegexpMatchFunction);
    registry.register(RegexpReplaceFunction);
}

fn compile(
    function: &str,
    pattern: &str,
    context: &EvaluationContext<'_>,
) -> FunctionResult<Arc<Regex>> {
    context.regex_cache.get_or_compile(pattern).map_err(|e| {
        FunctionError::invalid_argument(function, 1, format!("invalid pattern: {e}"))
    })
}
