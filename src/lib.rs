//! Expression language for document processing pipelines
//!
//! Expressions mix literal text with function calls and `<Name>` variable
//! references, for example `LEFT(<FileName>, 8)_FORMATDATE("yyyy")`. They are
//! used to build file names, folder paths and field values while documents
//! flow through a pipeline.
//!
//! - [`ExpressionEngine`] resolves one expression against a [`VariableContext`].
//! - [`ContextBuilder`] collects the standard variables for a document.
//! - [`FieldEvaluator`] evaluates an ordered list of [`FieldDefinition`]s.
//! - [`FileCounterStore`] keeps `AUTOINCREMENT` counters across runs.

pub mod config;
pub mod context;
pub mod counter;
pub mod error;
pub mod evaluator;
pub mod fields;
pub mod io;
pub mod parser;
pub mod registry;

// Re-export main types
pub use config::{ConfigError, EngineConfig, ScriptingConfig};
pub use context::ContextBuilder;
pub use counter::{
    CounterCategory, CounterError, CounterStore, FileCounterStore, InMemoryCounterStore,
};
pub use error::{Error, Result};
pub use evaluator::{
    Clock, ExpressionEngine, ExpressionEngineBuilder, FixedClock, SystemClock, VariableContext,
};
pub use fields::{
    DependencyReport, DocumentError, FieldDefinition, FieldDocument, FieldEvaluator, FieldSource,
    analyze_dependencies,
};
pub use registry::{
    ExpressionFunction, FunctionError, FunctionRegistry, SqlError, SqlExecutor, SqlRow,
    create_standard_registry,
};
