//! TOUPPER(text) - converts to upper case

use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionResult, arg, first_arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// TOUPPER(text) - converts to upper case
pub struct ToUpperFunction;

impl ExpressionFunction for ToUpperFunction {
    fn name(&self) -> &str {
        "TOUPPER"
    }
    fn human_friendly_name(&self) -> &str {
        "To Upper"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new("TOUPPER", vec![ParameterInfo::required("text")])
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
        Ok(arg(args, 0).to_uppercase())
    }
}
