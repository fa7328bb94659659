//! FORMAT(value, pattern) - zero padding

use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionResult, arg, first_arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// FORMAT(value, pattern) - left-pads `value` with zeros to as many
/// characters as `pattern` has `#` signs. A leading sign stays in front.
pub struct FormatFunction;

impl ExpressionFunction for FormatFunction {
    fn name(&self) -> &str {
        "FORMAT"
    }
    fn human_friendly_name(&self) -> &str {
        "Format"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "FORMAT",
                vec![
                    ParameterInfo::required("value"),
                    ParameterInfo::required("pattern"),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Pads the value with leading zeros to the number of `#` in the pattern: \
         `FORMAT(\"42\", \"#####\")` yields `00042`. Longer values and patterns without \
         `#` leave the value unchanged."
    }
    fn fallback(&self, args: &[String]) -> String {
        first_arg(args)
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let value = arg(args, 0);
        let width = arg(args, 1).chars().filter(|&c| c == '#').count();
        Ok(zero_fill(value, width))
    }
}

fn zero_fill(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let padding = "0".repeat(width - len);
    match value.chars().next() {
        Some(sign @ ('+' | '-')) => format!("{sign}{padding}{}", &value[1..]),
        _ => format!("{padding}{value}"),
    }
}
