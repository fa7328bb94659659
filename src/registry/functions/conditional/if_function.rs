//! IF(value, operator, compare, then, else, caseSensitive?) - conditional text

use crate::registry::function::{EvaluationContext, ExpressionFunction, FunctionResult, arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};
use std::cmp::Ordering;

/// Comparison operators understood by `IF`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `=` or `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// `contains`
    Contains,
    /// `startswith`
    StartsWith,
    /// `endswith`
    EndsWith,
}

impl ComparisonOperator {
    /// Parse an operator as written in an expression; `None` if unknown
    pub fn parse(op: &str) -> Option<Self> {
        Some(match op.trim() {
            "=" | "==" => Self::Equal,
            "!=" => Self::NotEqual,
            ">" => Self::Greater,
            "<" => Self::Less,
            ">=" => Self::GreaterOrEqual,
            "<=" => Self::LessOrEqual,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            _ => return None,
        })
    }

    /// Apply the operator.
    ///
    /// Ordering operators compare numerically when both sides parse as
    /// numbers and by code point otherwise.
    pub fn compare(self, left: &str, right: &str) -> bool {
        match self {
            Self::Equal => left == right,
            Self::NotEqual => left != right,
            Self::Contains => left.contains(right),
            Self::StartsWith => left.starts_with(right),
            Self::EndsWith => left.ends_with(right),
            Self::Greater | Self::Less | Self::GreaterOrEqual | Self::LessOrEqual => {
                let ordering = match (parse_number(left), parse_number(right)) {
                    (Some(l), Some(r)) => l.partial_cmp(&r),
                    _ => Some(left.cmp(right)),
                };
                // NaN compares false for every ordering
                let Some(ordering) = ordering else {
                    return false;
                };
                match self {
                    Self::Greater => ordering == Ordering::Greater,
                    Self::Less => ordering == Ordering::Less,
                    Self::GreaterOrEqual => ordering != Ordering::Less,
                    _ => ordering != Ordering::Greater,
                }
            }
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// IF(value, operator, compare, then, else, caseSensitive?)
pub struct IfFunction;

impl ExpressionFunction for IfFunction {
    fn name(&self) -> &str {
        "IF"
    }
    fn human_friendly_name(&self) -> &str {
        "If"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "IF",
                vec![
                    ParameterInfo::required("value"),
                    ParameterInfo::required("operator"),
                    ParameterInfo::required("compare"),
                    ParameterInfo::required("then"),
                    ParameterInfo::required("else"),
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
        "Returns `then` when `value operator compare` holds and `else` otherwise. Operators: \
         `=` `==` `!=` `>` `<` `>=` `<=` `contains` `startswith` `endswith`. Unknown \
         operators are false."
    }
    fn fallback(&self, args: &[String]) -> String {
        arg(args, 4).to_string()
    }
    fn evaluate(&self, args: &[String], _context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let case_sensitive = args
            .get(5)
            .is_none_or(|flag| flag.eq_ignore_ascii_case("true"));
        let (left, right) = if case_sensitive {
            (arg(args, 0).to_string(), arg(args, 2).to_string())
        } else {
            (arg(args, 0).to_lowercase(), arg(args, 2).to_lowercase())
        };

        let holds = match ComparisonOperator::parse(arg(args, 1)) {
            Some(op) => op.compare(&left, &right),
            None => {
                log::warn!("IF: unknown operator '{}'", arg(args, 1));
                false
            }
        };
        Ok(if holds { arg(args, 3) } else { arg(args, 4) }.to_string())
    }
}
