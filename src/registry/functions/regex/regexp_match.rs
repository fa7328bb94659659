//! REGEXP.MATCH(text, pattern, index?) - extract a match or group

use super::compile;
use crate::registry::function::{EvaluationContext, ExpressionFunction, FunctionResult, arg};
use crate::registry::functions::string::parse_int;
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// REGEXP.MATCH(text, pattern, index?) - first match of `pattern`.
///
/// With capture groups, `index` counts the groups from zero, so `0` is the
/// first group. Without groups, index `0` is the whole match. Missing
/// matches, groups that did not participate and out-of-range indices give an
/// empty string.
pub struct RegexpMatchFunction;

impl ExpressionFunction for RegexpMatchFunction {
    fn name(&self) -> &str {
        "REGEXP.MATCH"
    }
    fn human_friendly_name(&self) -> &str {
        "Regular Expression Match"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "REGEXP.MATCH",
                vec![
                    ParameterInfo::required("text"),
                    ParameterInfo::required("pattern"),
                    ParameterInfo::with_default("index", "0"),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Returns the first match of `pattern` in `text`. When the pattern has capture \
         groups, `index` selects one of them, `0` being the first group."
    }
    fn evaluate(&self, args: &[String], context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let regex = compile(self.name(), arg(args, 1), context)?;
        let index = match args.get(2) {
            Some(index) => parse_int(self.name(), 2, index)?,
            None => 0,
        };
        let Ok(index) = usize::try_from(index) else {
            return Ok(String::new());
        };

        // Group 0 is the whole match; only patterns without groups expose it
        let group = if regex.captures_len() > 1 {
            index + 1
        } else if index == 0 {
            0
        } else {
            return Ok(String::new());
        };

        Ok(regex
            .captures(arg(args, 0))
            .and_then(|caps| caps.get(group))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::test_support::TestEnv;
    use rstest::rstest;

    #[rstest]
    #[case(&["Rechnung Nr. 4711 vom 01.02.2025", r"\d+"], "4711")]
    #[case(&["Rechnung Nr. 4711", r"Nr\. (\d+)"], "4711")]
    #[case(&["Rechnung Nr. 4711", r"Nr\. (\d+)", "0"], "4711")]
    #[case(&["Rechnung Nr. 4711", r"Nr\. (\d+)", "1"], "")]
    #[case(&["01.02.2025", r"(\d+)\.(\d+)\.(\d+)", "2"], "2025")]
    #[case(&["01.02.2025", r"(\d+)\.(\d+)\.(\d+)", "3"], "")]
    #[case(&["Rechnung Nr. 4711", r"\d+", "1"], "")]
    #[case(&["Rechnung Nr. 4711", r"Nr\. (\d+)", "-1"], "")]
    #[case(&["ohne Nummer", r"\d+"], "")]
    #[case(&["abc", r"(b)|(x)", "1"], "")]
    #[case(&["abc", "(unclosed"], "")]
    fn test_regexp_match(#[case] args: &[&str], #[case] expected: &str) {
        let env = TestEnv::default();
        assert_eq!(env.call_or_fallback(&RegexpMatchFunction, args), expected);
    }
}
