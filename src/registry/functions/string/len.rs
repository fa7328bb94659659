//! LEN(text) - character count

use crate::registry::function::{EvaluationContext, ExpressionFunction, FunctionResult, arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// LEN(text) - number of characters (not bytes)
pub struct LenFunction;

impl ExpressionFunction for LenFunction {
    fn name(&self) -> &str {
        "LEN"
    }
    fn human_friendly_name(&self) -> &str {
        "Length"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new("LEN", vec![ParameterInfo::required("text")])
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn fallback(&self, _args: &[String]) -> String {
        "0".to_string()
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        Ok(arg(args, 0).chars().count().to_string())
    }
}
