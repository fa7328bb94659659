//! AUTOINCREMENT(name, start?, step?) - persistent sequence numbers

use crate::counter::CounterCategory;
use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionError, FunctionResult, arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// Prefix for counters created by `AUTOINCREMENT`
pub const AUTO_COUNTER_PREFIX: &str = "auto_";

/// AUTOINCREMENT(name, start?, step?) - hands out the next value of the
/// counter `auto_<name>`.
///
/// The first call creates the counter at `start`. Non-numeric `start` or
/// `step` count as 1.
pub struct AutoIncrementFunction;

fn parse_or_one(value: Option<&String>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

impl ExpressionFunction for AutoIncrementFunction {
    fn name(&self) -> &str {
        "AUTOINCREMENT"
    }
    fn human_friendly_name(&self) -> &str {
        "Auto Increment"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "AUTOINCREMENT",
                vec![
                    ParameterInfo::required("name"),
                    ParameterInfo::with_default("start", "1"),
                    ParameterInfo::with_default("step", "1"),
                ],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns the current value of the persistent counter `auto_<name>` and advances \
         it by `step`. `AUTOINCREMENT(\"Invoice\", 1000)` yields 1000, 1001, 1002, ... \
         across documents and restarts."
    }
    fn fallback(&self, args: &[String]) -> String {
        args.get(1).cloned().unwrap_or_else(|| "1".to_string())
    }
    fn evaluate(&self, args: &[String], context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let name = format!("{AUTO_COUNTER_PREFIX}{}", arg(args, 0));
        let start = parse_or_one(args.get(1));
        let step = parse_or_one(args.get(2));

        context
            .counters
            .get_and_increment(&name, CounterCategory::Auto, start, step)
            .map(|value| value.to_string())
            .map_err(|source| FunctionError::Counter {
                name: self.name().to_string(),
                source,
            })
    }
}
