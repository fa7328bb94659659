//! TRIM(text) - removes whitespace from both ends

use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionResult, arg, first_arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// TRIM(text) - removes whitespace from both ends
pub struct TrimFunction;

impl ExpressionFunction for TrimFunction {
    fn name(&self) -> &str {
        "TRIM"
    }
    fn human_friendly_name(&self) -> &str {
        "Trim"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new("TRIM", vec![ParameterInfo::required("text")])
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Removes leading and trailing whitespace. `TRIM(\"  A-17 \")` yields `A-17`."
    }
    fn fallback(&self, args: &[String]) -> String {
        first_arg(args)
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        Ok(arg(args, 0).trim().to_string())
    }
}
