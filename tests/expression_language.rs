//! End-to-end behaviour of the expression language

use chrono::{NaiveDate, NaiveDateTime};
use docflow_expr::{ExpressionEngine, FixedClock, InMemoryCounterStore, VariableContext};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;

fn friday() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 20)
        .and_then(|d| d.and_hms_opt(14, 5, 9))
        .unwrap()
}

fn engine() -> ExpressionEngine {
    ExpressionEngine::builder()
        .with_clock(Arc::new(FixedClock(friday())))
        .with_counters(Arc::new(InMemoryCounterStore::new()))
        .build()
}

fn vars() -> VariableContext {
    [
        ("FileName", "Rechnung_001"),
        ("Kunde", "Muster GmbH"),
        ("level1", "Eingang"),
    ]
    .into_iter()
    .collect()
}

#[rstest]
#[case("<FileName>.pdf", "Rechnung_001.pdf")]
#[case("<Unbekannt>/<FileName>", "<Unbekannt>/Rechnung_001")]
#[case("plain text (with parens)", "plain text (with parens)")]
#[case("<FileName> COPY(2).pdf", "Rechnung_001 COPY(2).pdf")]
#[case("ABC(x)_PDF(1)", "ABC(x)_PDF(1)")]
fn test_expressions_without_calls_are_substitution(#[case] expr: &str, #[case] expected: &str) {
    let ctx = vars();
    assert_eq!(engine().evaluate(expr, &ctx), ctx.substitute(expr));
    assert_eq!(engine().evaluate(expr, &ctx), expected);
}

#[rstest]
#[case(r#"FORMATDATE("dd.mm.yyyy")"#, "20.06.2025")]
#[case(r#"FORMATDATE("d.m.yy")"#, "20.6.25")]
#[case(r#"LEFT("Rechnung_001", 8)"#, "Rechnung")]
#[case(r#"RIGHT("Rechnung_001", 3)"#, "001")]
#[case(r#"IF("5", ">", "3", "yes", "no")"#, "yes")]
#[case(r#"IF("abc", ">", "3", "yes", "no")"#, "yes")]
#[case(r#"REGEXP.REPLACE("a b", "\s+", "_")"#, "a_b")]
#[case(r#"before FOO("x") LEFT("ab", 1) after"#, "before  a after")]
#[case(r#"TOUPPER(LEFT(<Kunde>, 6))_<level1>"#, "MUSTER_Eingang")]
#[case(r#"MID(<FileName>, 10, 3)"#, "001")]
#[case(r#####"FORMAT(LEN(<Kunde>), "####")"#####, "0011")]
#[case(r#"REGEXP.MATCH(<FileName>, "_(\d+)")"#, "001")]
#[case(r#"REGEXP.MATCH("Nr. 4711", "Nr\. (\d+)")"#, "4711")]
#[case(r#"REGEXP.MATCH("Nr. 4711", "Nr\. (\d+)", 1)"#, "")]
#[case(r#"LEFT("unterminated", 3"#, r#"LEFT("unterminated", 3"#)]
fn test_documented_results(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(engine().evaluate(expr, &vars()), expected);
}

#[test]
fn test_autoincrement_sequence() {
    let engine = engine();
    let ctx = VariableContext::new();
    let values: Vec<String> = (0..3)
        .map(|_| engine.evaluate(r#"AUTOINCREMENT("Invoice", 1000, 1)"#, &ctx))
        .collect();
    assert_eq!(values, vec!["1000", "1001", "1002"]);
}

#[test]
fn test_evaluate_never_panics_on_garbage() {
    let engine = engine();
    let ctx = vars();
    for expr in [
        "(((",
        ")))",
        "LEFT(",
        "IF()",
        "MID(\"abc\", \"x\")",
        "REGEXP.MATCH(\"a\", \"(\")",
        "<<<>>>",
        "\"",
        "FORMATDATE(\"yyyyyy\")",
    ] {
        let _ = engine.evaluate(expr, &ctx);
    }
}
