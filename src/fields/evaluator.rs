//! Field-by-field evaluation pass

use super::{FieldDefinition, FieldDocument};
use crate::evaluator::{ExpressionEngine, VariableContext};
use log::debug;
use tokio::task::JoinError;

/// Evaluates field definitions in declaration order
#[derive(Debug, Clone)]
pub struct FieldEvaluator {
    engine: ExpressionEngine,
}

impl FieldEvaluator {
    /// Evaluator backed by `engine`
    pub fn new(engine: ExpressionEngine) -> Self {
        Self { engine }
    }

    /// The underlying engine
    pub fn engine(&self) -> &ExpressionEngine {
        &self.engine
    }

    /// Evaluate every field once, in order.
    ///
    /// Returns the context extended by all field values and a new document
    /// holding the fields in declaration order.
    pub fn evaluate_all(
        &self,
        fields: &[FieldDefinition],
        mut context: VariableContext,
    ) -> (VariableContext, FieldDocument) {
        let mut document = FieldDocument::new();
        self.evaluate_into(fields, &mut context, &mut document);
        (context, document)
    }

    /// Evaluate every field once, in order, updating an existing document.
    ///
    /// Fields already in the document keep their position; new ones are
    /// appended. The clock is read once for the whole pass.
    pub fn evaluate_into(
        &self,
        fields: &[FieldDefinition],
        context: &mut VariableContext,
        document: &mut FieldDocument,
    ) {
        let now = self.engine.now();
        for field in fields {
            let value = if field.expression.is_empty() {
                String::new()
            } else {
                self.engine
                    .evaluate_at(&field.effective_expression(), context, now)
            };
            debug!("Field {} = '{}'", field.name, value);
            context.set(field.name.clone(), value.clone());
            document.set(field.name.clone(), value);
        }
    }

    /// Run [`evaluate_all`](Self::evaluate_all) on tokio's blocking pool.
    ///
    /// Script fields block their thread, so async callers should use this
    /// instead of calling the synchronous pass on an executor thread.
    pub async fn evaluate_all_async(
        &self,
        fields: Vec<FieldDefinition>,
        context: VariableContext,
    ) -> Result<(VariableContext, FieldDocument), JoinError> {
        let evaluator = self.clone();
        tokio::task::spawn_blocking(move || evaluator.evaluate_all(&fields, context)).await
    }
}

impl Default for FieldEvaluator {
    fn default() -> Self {
        Self::new(ExpressionEngine::default())
    }
}
