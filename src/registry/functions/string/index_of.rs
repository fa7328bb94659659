//! INDEXOF(start, text, search, caseSensitive?) - finds a substring

use super::parse_int;
use crate::registry::function::{EvaluationContext, ExpressionFunction, FunctionResult, arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// INDEXOF(start, text, search, caseSensitive?) - 1-based position of
/// `search` in `text`, or `0` when absent.
///
/// `start` is the number of characters skipped before searching; a negative
/// value counts from the end.
pub struct IndexOfFunction;

impl ExpressionFunction for IndexOfFunction {
    fn name(&self) -> &str {
        "INDEXOF"
    }
    fn human_friendly_name(&self) -> &str {
        "Index Of"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "INDEXOF",
                vec![
                    ParameterInfo::required("start"),
                    ParameterInfo::required("text"),
                    ParameterInfo::required("search"),
                    ParameterInfo::with_default("caseSensitive", "true"),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Searches `text` for `search`, skipping the first `start` characters. Returns the \
         1-based position or `0`. Any `caseSensitive` value other than `true` compares \
         case-insensitively."
    }
    fn fallback(&self, _args: &[String]) -> String {
        "0".to_string()
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let start = parse_int(self.name(), 0, arg(args, 0))?;
        let case_sensitive = args
            .get(3)
            .is_none_or(|flag| flag.eq_ignore_ascii_case("true"));

        let (haystack, needle) = if case_sensitive {
            (arg(args, 1).to_string(), arg(args, 2).to_string())
        } else {
            (arg(args, 1).to_lowercase(), arg(args, 2).to_lowercase())
        };

        let len = haystack.chars().count() as i64;
        let skip = if start < 0 { (len + start).max(0) } else { start };
        if skip > len {
            return Ok("0".to_string());
        }
        let skip = skip as usize;

        let offset = haystack
            .char_indices()
            .nth(skip)
            .map_or(haystack.len(), |(byte, _)| byte);
        Ok(match haystack[offset..].find(&needle) {
            Some(byte) => {
                let position = skip + haystack[offset..offset + byte].chars().count();
                (position + 1).to_string()
            }
            None => "0".to_string(),
        })
    }
}
