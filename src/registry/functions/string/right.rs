//! RIGHT(text, n) - trailing characters

use super::{parse_int, slice_chars};
use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionResult, arg, first_arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// RIGHT(text, n) - the last `n` characters.
///
/// `n = 0` yields an empty string; a negative `n` drops that many characters
/// from the start.
pub struct RightFunction;

impl ExpressionFunction for RightFunction {
    fn name(&self) -> &str {
        "RIGHT"
    }
    fn human_friendly_name(&self) -> &str {
        "Right"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "RIGHT",
                vec![ParameterInfo::required("text"), ParameterInfo::required("n")],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Returns the last n characters. A negative n removes characters from the start."
    }
    fn fallback(&self, args: &[String]) -> String {
        first_arg(args)
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let n = parse_int(self.name(), 1, arg(args, 1))?;
        if n == 0 {
            return Ok(String::new());
        }
        Ok(slice_chars(arg(args, 0), Some(n.saturating_neg()), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::test_support::TestEnv;
    use rstest::rstest;

    #[rstest]
    #[case("Rechnung_001", "3", "001")]
    #[case("abc", "10", "abc")]
    #[case("abcdef", "-2", "cdef")]
    #[case("abc", "0", "")]
    #[case("abc", "", "abc")]
    fn test_right(#[case] text: &str, #[case] n: &str, #[case] expected: &str) {
        let env = TestEnv::default();
        assert_eq!(env.call_or_fallback(&RightFunction, &[text, n]), expected);
    }
}
