//! TOLOWER(text) - converts to lower case

use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionResult, arg, first_arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// TOLOWER(text) - converts to lower case
pub struct ToLowerFunction;

impl ExpressionFunction for ToLowerFunction {
    fn name(&self) -> &str {
        "TOLOWER"
    }
    fn human_friendly_name(&self) -> &str {
        "To Lower"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new("TOLOWER", vec![ParameterInfo::required("text")])
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn fallback(&self, args: &[String]) -> String {
        first_arg(args)
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        Ok(arg(args, 0).to_lowercase())
    }
}
