//! String manipulation functions

mod format;
mod index_of;
mod left;
mod len;
mod mid;
mod right;
mod to_lower;
mod to_upper;
mod trim;

pub use format::FormatFunction;
pub use index_of::IndexOfFunction;
pub use left::LeftFunction;
pub use len::LenFunction;
pub use mid::MidFunction;
pub use right::RightFunction;
pub use to_lower::ToLowerFunction;
pub use to_upper::ToUpperFunction;
pub use trim::TrimFunction;

use crate::registry::function::{FunctionError, FunctionRegistry, FunctionResult};

/// Register all string functions
pub fn register_string_functions(registry: &mut FunctionRegistry) {
    registry.register(TrimFunction);
    registry.register(LeftFunction);
    registry.register(RightFunction);
    registry.register(MidFunction);
    registry.register(ToUpperFunction);
    registry.register(ToLowerFunction);
    registry.register(LenFunction);
    registry.register(FormatFunction);
    registry.register(IndexOfFunction);
}

/// Parse an integer argument, surrounding whitespace allowed
pub(crate) fn parse_int(function: &str, index: usize, value: &str) -> FunctionResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| FunctionError::invalid_argument(function, index, format!("'{value}' is not an integer")))
}

/// Resolve a possibly negative slice bound against `len` characters
fn clamp_bound(bound: i64, len: usize) -> usize {
    let len_i = len as i64;
    if bound < 0 {
        (len_i + bound).max(0) as usize
    } else {
        bound.min(len_i) as usize
    }
}

/// Character slice `[start, stop)` where negative bounds count from the end
pub(crate) fn slice_chars(text: &str, start: Option<i64>, stop: Option<i64>) -> String {
    let len = text.chars().count();
    let from = start.map_or(0, |s| clamp_bound(s, len));
    let to = stop.map_or(len, |s| clamp_bound(s, len));
    if from >= to {
        return String::new();
    }
    text.chars().skip(from).take(to - from).collect()
}
