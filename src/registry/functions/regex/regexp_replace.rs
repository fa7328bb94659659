//! REGEXP.REPLACE(text, pattern, replacement) - substitute all matches

use super::compile;
use crate::registry::function::{
    EvaluationContext, ExpressionFunction, FunctionResult, arg, first_arg,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// Convert backslash group references to the regex crate's syntax.
///
/// `\1` and `\12` become `${1}` and `${12}`, `\g<name>` becomes `${name}`,
/// `\n`, `\t`, `\r` and `\\` become their characters and a literal `$` is
/// doubled. Any other backslash sequence is copied as written.
pub fn translate_replacement(replacement: &str) -> String {
    let chars: Vec<char> = replacement.chars().collect();
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '$' => {
                out.push_str("$$");
                i += 1;
            }
            '\\' if i + 1 < chars.len() => {
                let next = chars[i + 1];
                if next.is_ascii_digit() {
                    let digits = chars[i + 1..]
                        .iter()
                        .take(2)
                        .take_while(|c| c.is_ascii_digit())
                        .count();
                    let group: String = chars[i + 1..i + 1 + digits].iter().collect();
                    out.push_str(&format!("${{{group}}}"));
                    i += 1 + digits;
                    continue;
                }

                if next == 'g' && chars.get(i + 2) == Some(&'<') {
                    if let Some(len) = chars[i + 3..].iter().position(|&c| c == '>') {
                        let name: String = chars[i + 3..i + 3 + len].iter().collect();
                        out.push_str(&format!("${{{name}}}"));
                        i += 4 + len;
                        continue;
                    }
                }

                match next {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '\\' => out.push('\\'),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
                i += 2;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    out
}

/// REGEXP.REPLACE(text, pattern, replacement) - replace every match
pub struct RegexpReplaceFunction;

impl ExpressionFunction for RegexpReplaceFunction {
    fn name(&self) -> &str {
        "REGEXP.REPLACE"
    }
    fn human_friendly_name(&self) -> &str {
        "Regular Expression Replace"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "REGEXP.REPLACE",
                vec![
                    ParameterInfo::required("text"),
                    ParameterInfo::required("pattern"),
                    ParameterInfo::required("replacement"),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Replaces every match of `pattern`. The replacement may refer to groups as `\\1` or \
         `\\g<name>`. An invalid pattern leaves the text unchanged."
    }
    fn fallback(&self, args: &[String]) -> String {
        first_arg(args)
    }
    fn evaluate(&self, args: &[String], context: &EvaluationContext<'_>) -> FunctionResult<String> {
        let regex = compile(self.name(), arg(args, 1), context)?;
        let replacement = translate_replacement(arg(args, 2));
        Ok(regex
            .replace_all(arg(args, 0), replacement.as_str())
            .into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::test_support::TestEnv;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(r"\1", "${1}")]
    #[case(r"\12x", "${12}x")]
    #[case(r"\g<year>-\g<1>", "${year}-${1}")]
    #[case("costs $5", "costs $$5")]
    #[case(r"a\nb", "a\nb")]
    #[case(r"\\", "\\")]
    #[case(r"\q", r"\q")]
    #[case(r"\g<open", r"\g<open")]
    fn test_translate_replacement(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(translate_replacement(input), expected);
    }

    #[rstest]
    #[case(&["a b", r"\s+", "_"], "a_b")]
    #[case(&["20.06.2025", r"(\d+)\.(\d+)\.(\d+)", r"\3-\2-\1"], "2025-06-20")]
    #[case(
        &["20.06.2025", r"(?P<d>\d+)\.(?P<m>\d+)\.(?P<y>\d+)", r"\g<y>\g<m>\g<d>"],
        "20250620"
    )]
    #[case(&["price 5", r"\d", "$"], "price $")]
    #[case(&["keep", "(unclosed", "x"], "keep")]
    fn test_regexp_replace(#[case] args: &[&str], #[case] expected: &str) {
        let env = TestEnv::default();
        assert_eq!(env.call_or_fallback(&RegexpReplaceFunction, args), expected);
    }
}
