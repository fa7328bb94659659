//! MID(text, start, length?) - substring by 1-based position

use super::{parse_int, slice_chars};
use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionResult, arg, first_arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// MID(text, start, length?) - substring starting at the 1-based `start`
pub struct MidFunction;

impl ExpressionFunction for MidFunction {
    fn name(&self) -> &str {
        "MID"
    }
    fn human_friendly_name(&self) -> &str {
        "Mid"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "MID",
                vec![
                    ParameterInfo::required("text"),
                    ParameterInfo::required("start"),
                    ParameterInfo::optional("length"),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Returns `length` characters starting at the 1-based position `start`, or the rest \
         of the text when `length` is omitted or empty. Positions below 1 count as 1."
    }
    fn fallback(&self, args: &[String]) -> String {
        first_arg(args)
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let text = arg(args, 0);
        let start = parse_int(self.name(), 1, arg(args, 1))?.max(1) - 1;
        let stop = match args.get(2).filter(|len| !len.is_empty()) {
            Some(length) => Some(start.saturating_add(parse_int(self.name(), 2, length)?)),
            None => None,
        };
        Ok(slice_chars(text, Some(start), stop))
    }
}
