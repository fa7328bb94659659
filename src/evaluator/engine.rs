// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Expression evaluation engine
//!
//! Resolves document expressions: literal text mixed with function calls such
//! as `LEFT(<FileName>, 8)` and variable references such as `<Date>`.
//!
//! ## Quick Start
//!
//! ```rust
//! use docflow_expr::{ExpressionEngine, VariableContext};
//!
//! let engine = ExpressionEngine::default();
//! let mut vars = VariableContext::new();
//! vars.set("FileName", "Rechnung_001");
//!
//! assert_eq!(engine.evaluate("LEFT(<FileName>, 8)", &vars), "Rechnung");
//! assert_eq!(engine.evaluate("<FileName>.pdf", &vars), "Rechnung_001.pdf");
//! ```
//!
//! Evaluation is total: failing functions yield their fallback value and
//! unknown variables stay as written. Text shaped like a call, such as
//! `COPY(2)`, stays as written unless the expression also calls a registered
//! function; then unknown calls vanish.

use super::clock::{Clock, SystemClock};
use super::context::VariableContext;
use super::error::{EvaluationError, EvaluationResult};
use crate::config::EngineConfig;
use crate::counter::{CounterStore, InMemoryCounterStore};
use crate::parser::{FunctionCall, Segment, Tokenizer, contains_call};
use crate::registry::function::{EvaluationContext, ExpressionFunction, FunctionRegistry};
use crate::registry::functions::{RegexCache, SqlExecutor};
use crate::registry::create_standard_registry;
use chrono::NaiveDateTime;
use log::{trace, warn};
use std::fmt;
use std::sync::Arc;

/// Expression evaluation engine.
///
/// Cheap to clone; clones share the registry, counter store, clock and regex
/// cache, so one engine can serve any number of worker threads.
#[derive(Clone)]
pub struct ExpressionEngine {
    registry: Arc<FunctionRegistry>,
    counters: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
    regex_cache: Arc<RegexCache>,
    sql: Option<Arc<dyn SqlExecutor>>,
}

impl ExpressionEngine {
    /// Engine with the standard functions and the given counter store
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self::builder().with_counters(counters).build()
    }

    /// Start configuring an engine
    pub fn builder() -> ExpressionEngineBuilder {
        ExpressionEngineBuilder::default()
    }

    /// Returns the current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered functions
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Shared counter store
    pub fn counters(&self) -> &Arc<dyn CounterStore> {
        &self.counters
    }

    /// Current time according to the engine's clock
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Evaluate an expression against `variables`.
    ///
    /// The clock is read once, so every date function in the expression sees
    /// the same instant.
    pub fn evaluate(&self, expression: &str, variables: &VariableContext) -> String {
        self.evaluate_at(expression, variables, self.clock.now())
    }

    /// Evaluate with an explicit evaluation time
    pub fn evaluate_at(
        &self,
        expression: &str,
        variables: &VariableContext,
        now: NaiveDateTime,
    ) -> String {
        if !self.has_known_call(expression) {
            return variables.substitute(expression);
        }

        let context = self.function_context(now);
        let resolved = match self.resolve(expression, variables, &context, 0) {
            Ok(text) => text,
            // Top-level calls handle their own depth errors; nothing else escapes
            Err(e) => {
                warn!("Expression '{expression}' kept unevaluated: {e}");
                expression.to_string()
            }
        };
        variables.substitute(&resolved)
    }

    /// Whether `text` calls a registered function; text without one is
    /// left to variable substitution, call-shaped or not
    fn has_known_call(&self, text: &str) -> bool {
        contains_call(text) && self.registry.is_called_in(text)
    }

    fn function_context(&self, now: NaiveDateTime) -> EvaluationContext<'_> {
        EvaluationContext {
            now,
            counters: self.counters.as_ref(),
            scripting: &self.config.scripting,
            regex_cache: &self.regex_cache,
            sql: self.sql.as_deref(),
        }
    }

    /// Replace every call in `text` by its result, innermost first
    fn resolve(
        &self,
        text: &str,
        variables: &VariableContext,
        context: &EvaluationContext<'_>,
        depth: usize,
    ) -> EvaluationResult<String> {
        let mut out = String::with_capacity(text.len());
        for segment in Tokenizer::new(text) {
            let source = &text[segment.start..segment.end];
            match segment.value {
                Segment::Text(literal) => out.push_str(literal),
                Segment::Call(call) => {
                    match self.resolve_call(&call, variables, context, depth + 1) {
                        Ok(value) => out.push_str(&value),
                        Err(e @ EvaluationError::NestingTooDeep { .. }) if depth == 0 => {
                            warn!("Call kept as text: {e}");
                            out.push_str(source);
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        Ok(out)
    }

    fn resolve_call(
        &self,
        call: &FunctionCall<'_>,
        variables: &VariableContext,
        context: &EvaluationContext<'_>,
        depth: usize,
    ) -> EvaluationResult<String> {
        if depth > self.config.max_nesting_depth {
            return Err(EvaluationError::NestingTooDeep {
                limit: self.config.max_nesting_depth,
            });
        }

        // `X.LEFT(...)` with unknown `X.LEFT` but known `LEFT`: the prefix is text
        let (prefix, function) = match self.registry.get(call.name) {
            Some(function) => ("", function),
            None => match call
                .name
                .split_once('.')
                .and_then(|(head, tail)| Some((head, self.registry.get(tail)?)))
            {
                Some((head, function)) => (head, function),
                None => {
                    warn!("Unknown function {}(), removed", call.name);
                    return Ok(String::new());
                }
            },
        };

        let args = call
            .args
            .iter()
            .map(|arg| self.resolve_argument(arg, variables, context, depth))
            .collect::<EvaluationResult<Vec<_>>>()?;

        let value = invoke(function.as_ref(), &args, context);
        Ok(if prefix.is_empty() {
            value
        } else {
            format!("{prefix}.{value}")
        })
    }

    fn resolve_argument(
        &self,
        arg: &str,
        variables: &VariableContext,
        context: &EvaluationContext<'_>,
        depth: usize,
    ) -> EvaluationResult<String> {
        if self.has_known_call(arg) {
            Ok(variables.substitute(&self.resolve(arg, variables, context, depth)?))
        } else {
            Ok(variables.substitute(arg))
        }
    }
}

/// Run a function; failures are logged and replaced by its fallback
fn invoke(function: &dyn ExpressionFunction, args: &[String], context: &EvaluationContext<'_>) -> String {
    let result = function
        .validate_args(args)
        .and_then(|()| function.evaluate(args, context));
    match result {
        Ok(value) => {
            trace!("{}({}) = {value:?}", function.name(), args.join(", "));
            value
        }
        Err(e) => {
            let fallback = function.fallback(args);
            warn!("{e}; using {fallback:?}");
            fallback
        }
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ExpressionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionEngine")
            .field("functions", &self.registry.len())
            .field("counters", &self.counters)
            .field("clock", &self.clock)
            .field("config", &self.config)
            .field("sql", &self.sql.is_some())
            .finish()
    }
}

/// Builder for [`ExpressionEngine`]
#[derive(Default)]
pub struct ExpressionEngineBuilder {
    registry: Option<FunctionRegistry>,
    counters: Option<Arc<dyn CounterStore>>,
    clock: Option<Arc<dyn Clock>>,
    config: EngineConfig,
    sql: Option<Arc<dyn SqlExecutor>>,
}

impl ExpressionEngineBuilder {
    /// Use a custom function registry instead of the standard one
    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Counter store for `AUTOINCREMENT` (in-memory when not set)
    pub fn with_counters(mut self, counters: Arc<dyn CounterStore>) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Time source (system clock when not set)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Database collaborator for `SQL`
    pub fn with_sql_executor(mut self, sql: Arc<dyn SqlExecutor>) -> Self {
        self.sql = Some(sql);
        self
    }

    /// Build the engine
    pub fn build(self) -> ExpressionEngine {
        ExpressionEngine {
            registry: Arc::new(self.registry.unwrap_or_else(create_standard_registry)),
            counters: self
                .counters
                .unwrap_or_else(|| Arc::new(InMemoryCounterStore::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            regex_cache: Arc::new(RegexCache::new(self.config.regex_cache_size)),
            config: Arc::new(self.config),
            sql: self.sql,
        }
    }
}
