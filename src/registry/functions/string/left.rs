//! LEFT(text, n) - leading characters

use super::{parse_int, slice_chars};
use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionResult, arg, first_arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// LEFT(text, n) - the first `n` characters.
///
/// A negative `n` drops that many characters from the end instead.
pub struct LeftFunction;

impl ExpressionFunction for LeftFunction {
    fn name(&self) -> &str {
        "LEFT"
    }
    fn human_friendly_name(&self) -> &str {
        "Left"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "LEFT",
                vec![ParameterInfo::required("text"), ParameterInfo::required("n")],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Returns the first n characters. A negative n removes characters from the end. \
         Falls back to the unchanged text when n is not a number."
    }
    fn fallback(&self, args: &[String]) -> String {
        first_arg(args)
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let n = parse_int(self.name(), 1, arg(args, 1))?;
        Ok(slice_chars(arg(args, 0), None, Some(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::test_support::TestEnv;
    use rstest::rstest;

    #[rstest]
    #[case("Rechnung_001", "8", "Rechnung")]
    #[case("abc", "10", "abc")]
    #[case("abcdef", "-2", "abcd")]
    #[case("abc", "0", "")]
    #[case("abc", "x", "abc")]
    fn test_left(#[case] text: &str, #[case] n: &str, #[case] expected: &str) {
        let env = TestEnv::default();
        assert_eq!(env.call_or_fallback(&LeftFunction, &[text, n]), expected);
    }
}
