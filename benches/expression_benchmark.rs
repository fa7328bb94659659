use criterion::{Criterion, criterion_group, criterion_main};
use docflow_expr::parser::Tokenizer;
use docflow_expr::{
    ExpressionEngine, FieldDefinition, FieldEvaluator, InMemoryCounterStore, VariableContext,
};
use std::hint::black_box;
use std::sync::Arc;

const EXPRESSIONS: &[(&str, &str)] = &[
    ("substitution_only", "<level1>/<Date>_<FileName>.pdf"),
    ("single_call", r#"LEFT(<FileName>, 8)"#),
    (
        "nested_calls",
        r#"TOUPPER(MID(<FileName>, 1, LEN(LEFT(<FileName>, 8))))_FORMATDATE("yyyymmdd")"#,
    ),
    (
        "regex_cached",
        r#"REGEXP.REPLACE(<Kunde>, "\s+", "_")_REGEXP.MATCH(<FileName>, "\d+")"#,
    ),
];

fn variables() -> VariableContext {
    [
        ("FileName", "Rechnung_000123"),
        ("Kunde", "Muster Handels GmbH"),
        ("level1", "Eingang"),
        ("Date", "2025-06-20"),
    ]
    .into_iter()
    .collect()
}

fn benchmark_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");
    for (name, expression) in EXPRESSIONS {
        group.bench_function(*name, |b| {
            b.iter(|| Tokenizer::new(black_box(expression)).count())
        });
    }
    group.finish();
}

fn benchmark_evaluation(c: &mut Criterion) {
    let engine = ExpressionEngine::new(Arc::new(InMemoryCounterStore::new()));
    let vars = variables();

    let mut group = c.benchmark_group("evaluate");
    for (name, expression) in EXPRESSIONS {
        group.bench_function(*name, |b| {
            b.iter(|| engine.evaluate(black_box(expression), black_box(&vars)))
        });
    }
    group.bench_function("autoincrement", |b| {
        b.iter(|| engine.evaluate(r#"AUTOINCREMENT("Bench", 1, 1)"#, &vars))
    });
    group.finish();
}

fn benchmark_field_pass(c: &mut Criterion) {
    let evaluator = FieldEvaluator::new(ExpressionEngine::default());
    let fields: Vec<FieldDefinition> = (0..20)
        .map(|i| {
            let expr = if i == 0 {
                "LEFT(<FileName>, 8)".to_string()
            } else {
                format!("TOUPPER(<F{}>)_{i}", i - 1)
            };
            FieldDefinition::new(format!("F{i}"), expr)
        })
        .collect();
    let vars = variables();

    c.bench_function("field_pass_20", |b| {
        b.iter(|| evaluator.evaluate_all(black_box(&fields), vars.clone()))
    });
}

criterion_group!(
    benches,
    benchmark_tokenizer,
    benchmark_evaluation,
    benchmark_field_pass
);
criterion_main!(benches);
