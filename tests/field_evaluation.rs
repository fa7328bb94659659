//! Field passes over a document built from a real file

use chrono::{NaiveDate, NaiveDateTime};
use docflow_expr::{
    ContextBuilder, ExpressionEngine, FieldDefinition, FieldDocument, FieldEvaluator,
    FixedClock, InMemoryCounterStore, analyze_dependencies,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 20)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

fn evaluator() -> FieldEvaluator {
    FieldEvaluator::new(
        ExpressionEngine::builder()
            .with_clock(Arc::new(FixedClock(now())))
            .with_counters(Arc::new(InMemoryCounterStore::new()))
            .build(),
    )
}

#[test]
fn test_field_order_decides_visibility() {
    let before = vec![FieldDefinition::new("A", "X"), FieldDefinition::new("B", "<A>")];
    let after = vec![FieldDefinition::new("B", "<A>"), FieldDefinition::new("A", "X")];

    let (_, doc) = evaluator().evaluate_all(&before, Default::default());
    assert_eq!(doc.get("B"), Some("X"));

    let (_, doc) = evaluator().evaluate_all(&after, Default::default());
    assert_eq!(doc.get("B"), Some("<A>"));
    assert_eq!(analyze_dependencies(&after).forward_references.len(), 1);
}

#[test]
fn test_pass_over_scanned_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Eingang");
    let folder = root.join("Lieferant");
    fs::create_dir_all(&folder).unwrap();
    let file = folder.join("Rechnung_4711.pdf");
    fs::write(&file, b"%PDF-1.7").unwrap();

    let definitions = dir.path().join("fields.json");
    fs::write(
        &definitions,
        r#"[
            {"name": "Nummer", "expression": "REGEXP.MATCH(<FileName>, \"\\d+\")"},
            {"name": "Ablage", "expression": "<level1>/FORMATDATE(\"yyyy\")/<Nummer>"},
            {"name": "Titel", "expression": "TOUPPER(<OCR_Absender>) <Nummer>"}
        ]"#,
    )
    .unwrap();
    let fields = FieldDefinition::load_all(&definitions).unwrap();

    let evaluator = evaluator();
    let context = ContextBuilder::from_engine(evaluator.engine())
        .with_file(&file)
        .with_hierarchy(&file, &root)
        .with_zones([("Absender", "Muster GmbH")])
        .build();
    let (_, doc) = evaluator.evaluate_all(&fields, context);

    assert_eq!(doc.get("Nummer"), Some("4711"));
    assert_eq!(doc.get("Ablage"), Some("Lieferant/2025/4711"));
    assert_eq!(doc.get("Titel"), Some("MUSTER GMBH 4711"));

    let out = dir.path().join("Rechnung_4711.json");
    doc.save(&out).unwrap();
    assert_eq!(FieldDocument::load(&out).unwrap(), doc);
}

#[test]
fn test_stored_document_feeds_next_pass() {
    let stored: FieldDocument = [("Kunde", "Muster"), ("Status", "neu")].into_iter().collect();
    let evaluator = evaluator();
    let mut context = ContextBuilder::new(now()).with_document(&stored).build();
    let mut document = stored.clone();

    let fields = vec![FieldDefinition::new("Status", "<Status>-geprüft <Kunde>")];
    evaluator.evaluate_into(&fields, &mut context, &mut document);

    assert_eq!(document.names(), vec!["Kunde", "Status"]);
    assert_eq!(document.get("Status"), Some("neu-geprüft Muster"));
}

#[tokio::test]
async fn test_async_pass() {
    let fields = vec![
        FieldDefinition::new("Jahr", r#"FORMATDATE("yyyy")"#),
        FieldDefinition::new("Pfad", "<Jahr>/LEFT(\"Rechnung\", 3)"),
    ];
    let (context, doc) = evaluator()
        .evaluate_all_async(fields, Default::default())
        .await
        .unwrap();
    assert_eq!(doc.get("Pfad"), Some("2025/Rec"));
    assert_eq!(context.get("Jahr"), Some("2025"));
}
