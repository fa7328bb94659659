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

//! Variables visible to an expression

use crate::parser::variable_references;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Case-sensitive name to value map for `<Name>` references.
///
/// Setting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableContext {
    variables: FxHashMap<String, String>,
}

impl VariableContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.variables.insert(name.into(), value.into())
    }

    /// Get a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Whether a variable is defined
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Remove a variable
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.variables.remove(name)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether no variable is defined
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate over all variables in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Variable names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Replace each `<Name>` with its value; unknown names stay as written
    pub fn substitute(&self, text: &str) -> String {
        let refs = variable_references(text);
        if refs.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for reference in refs {
            if let Some(value) = self.variables.get(reference.value) {
                out.push_str(&text[last..reference.start]);
                out.push_str(value);
                last = reference.end;
            }
        }
        out.push_str(&text[last..]);
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        context.extend(iter);
        context
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for VariableContext {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.set(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn context() -> VariableContext {
        [("Kunde", "Muster GmbH"), ("Nr", "17"), ("leer", "")]
            .into_iter()
            .collect()
    }

    #[rstest]
    #[case("<Kunde>_<Nr>.pdf", "Muster GmbH_17.pdf")]
    #[case("<Unbekannt>-<Nr>", "<Unbekannt>-17")]
    #[case("a<leer>b", "ab")]
    #[case("<<Nr>>", "<17>")]
    #[case("<kunde>", "<kunde>")]
    #[case("no refs", "no refs")]
    #[case("<>", "<>")]
    fn test_substitute(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(context().substitute(text), expected);
    }

    #[test]
    fn test_last_write_wins() {
        let mut ctx = context();
        assert_eq!(ctx.set("Nr", "18"), Some("17".to_string()));
        assert_eq!(ctx.get("Nr"), Some("18"));
        assert_eq!(ctx.names(), vec!["Kunde", "Nr", "leer"]);
    }

    #[test]
    fn test_json_is_a_plain_map() {
        let ctx: VariableContext = [("A", "1")].into_iter().collect();
        assert_eq!(serde_json::to_value(&ctx).unwrap(), serde_json::json!({"A": "1"}));
    }
}
