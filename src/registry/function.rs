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

//! Function trait, evaluation context and registry

use crate::config::ScriptingConfig;
use crate::counter::{CounterError, CounterStore};
use crate::registry::functions::external::SqlExecutor;
use crate::registry::functions::regex::RegexCache;
use crate::registry::signature::FunctionSignature;
use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function evaluation errors.
///
/// None of these reach the caller of the engine: the dispatcher logs them and
/// substitutes the function's fallback value.
#[derive(Error, Debug)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("Function '{name}' expects {min}-{} arguments, got {actual}", max.map_or("∞".to_string(), |n| n.to_string()))]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments (None for unlimited)
        max: Option<usize>,
        /// Actual arguments provided
        actual: usize,
    },

    /// An argument could not be interpreted
    #[error("Function '{name}' argument {index}: {message}")]
    InvalidArgument {
        /// Function name
        name: String,
        /// Zero-based argument index
        index: usize,
        /// What was wrong with it
        message: String,
    },

    /// Runtime evaluation error
    #[error("Function '{name}' evaluation error: {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },

    /// The counter store refused the operation
    #[error("Function '{name}' counter error: {source}")]
    Counter {
        /// Function name
        name: String,
        /// Store error
        #[source]
        source: CounterError,
    },

    /// An external script could not be run or failed
    #[error("Function '{name}' script error: {message}")]
    Script {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },

    /// The function is not available in this configuration
    #[error("Function '{name}' is unavailable: {message}")]
    Unsupported {
        /// Function name
        name: String,
        /// Reason
        message: String,
    },
}

impl FunctionError {
    /// Shorthand for [`FunctionError::EvaluationError`]
    pub fn evaluation(name: &str, message: impl Into<String>) -> Self {
        FunctionError::EvaluationError {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for [`FunctionError::InvalidArgument`]
    pub fn invalid_argument(name: &str, index: usize, message: impl Into<String>) -> Self {
        FunctionError::InvalidArgument {
            name: name.to_string(),
            index,
            message: message.into(),
        }
    }
}

/// Everything a function may consult while it runs.
///
/// Built once per `evaluate` call; `now` is the clock snapshot shared by every
/// call inside one expression.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Local time of this evaluation
    pub now: NaiveDateTime,
    /// Shared counter service
    pub counters: &'a dyn CounterStore,
    /// External script settings
    pub scripting: &'a ScriptingConfig,
    /// Compiled pattern cache
    pub regex_cache: &'a RegexCache,
    /// Database collaborator, if one was injected
    pub sql: Option<&'a dyn SqlExecutor>,
}

impl fmt::Debug for EvaluationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("now", &self.now)
            .field("counters", &self.counters)
            .field("scripting_enabled", &self.scripting.enabled)
            .field("sql", &self.sql.is_some())
            .finish()
    }
}

/// A function callable from expressions
pub trait ExpressionFunction: Send + Sync {
    /// Name as written in expressions, e.g. `REGEXP.MATCH`
    fn name(&self) -> &str;

    /// Get the human-friendly name for the function (for documentation)
    fn human_friendly_name(&self) -> &str;

    /// Get the function signature
    fn signature(&self) -> &FunctionSignature;

    /// Evaluate with already-resolved arguments
    fn evaluate(&self, args: &[String], context: &EvaluationContext<'_>)
    -> FunctionResult<String>;

    /// Value substituted when evaluation fails
    fn fallback(&self, _args: &[String]) -> String {
        String::new()
    }

    /// Get function documentation
    fn documentation(&self) -> &str {
        ""
    }

    /// Check if this function is pure (deterministic with no side effects)
    fn is_pure(&self) -> bool {
        false
    }

    /// Validate arguments before evaluation
    fn validate_args(&self, args: &[String]) -> FunctionResult<()> {
        let sig = self.signature();
        if !sig.accepts(args.len()) {
            return Err(FunctionError::InvalidArity {
                name: self.name().to_string(),
                min: sig.min_arity,
                max: sig.max_arity,
                actual: args.len(),
            });
        }
        Ok(())
    }
}

/// Fallback shared by the string functions: the first argument unchanged
pub(crate) fn first_arg(args: &[String]) -> String {
    args.first().cloned().unwrap_or_default()
}

/// Argument at `index`, empty when omitted
pub(crate) fn arg(args: &[String], index: usize) -> &str {
    args.get(index).map(String::as_str).unwrap_or("")
}

/// Registry of callable functions, keyed by exact name
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<dyn ExpressionFunction>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, replacing any function of the same name
    pub fn register<F: ExpressionFunction + 'static>(&mut self, function: F) {
        self.register_arc(Arc::new(function));
    }

    /// Register a shared function instance
    pub fn register_arc(&mut self, function: Arc<dyn ExpressionFunction>) {
        let name = function.name().to_string();
        if self.functions.insert(name.clone(), function).is_some() {
            log::debug!("Function {name} re-registered");
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ExpressionFunction>> {
        self.functions.get(name).cloned()
    }

    /// Whether a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Whether `text` contains a registered name directly followed by `(`
    pub fn is_called_in(&self, text: &str) -> bool {
        self.functions.keys().any(|name| {
            text.match_indices(name.as_str())
                .any(|(at, _)| text[at + name.len()..].starts_with('('))
        })
    }

    /// Registered names in sorted order
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no function is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Generate a markdown catalogue of all registered functions
    pub fn generate_function_docs(&self) -> String {
        let mut docs = String::new();
        docs.push_str("# Expression Function Reference\n\n");

        for name in self.function_names() {
            let Some(function) = self.functions.get(name) else {
                continue;
            };
            let sig = function.signature();
            docs.push_str(&format!("## {}\n\n", function.human_friendly_name()));
            docs.push_str(&format!("**Syntax:** `{}`\n\n", sig.syntax()));
            docs.push_str(&format!(
                "- **Arity:** {}{}\n",
                sig.min_arity,
                match sig.max_arity {
                    Some(max) if max == sig.min_arity => String::new(),
                    Some(max) => format!("-{max}"),
                    None => "+".to_string(),
                }
            ));
            for param in &sig.parameters {
                let kind = match (&param.default, param.optional) {
                    (Some(default), _) => format!("optional, default `{default}`"),
                    (None, true) => "optional".to_string(),
                    (None, false) => "required".to_string(),
                };
                docs.push_str(&format!("  - `{}`: {kind}\n", param.name));
            }
            docs.push_str(&format!(
                "- **Pure:** {}\n\n",
                if function.is_pure() { "yes" } else { "no" }
            ));

            let doc = function.documentation();
            if !doc.is_empty() {
                docs.push_str(doc);
                docs.push_str("\n\n");
            }
        }
        docs
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.function_names())
            .finish()
    }
}
