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

//! Engine configuration options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid configuration
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        /// Config path
        path: PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration for expression evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum depth of nested function calls before the text is kept literally
    pub max_nesting_depth: usize,

    /// Number of compiled regular expressions kept for reuse
    pub regex_cache_size: usize,

    /// Number of `levelN` folder tokens below the root (`level0` is the root)
    pub hierarchy_depth: usize,

    /// Counter file used by the CLI when none is given explicitly
    pub counters_path: Option<PathBuf>,

    /// External script execution
    pub scripting: ScriptingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 64,
            regex_cache_size: 128,
            hierarchy_depth: 5,
            counters_path: None,
            scripting: ScriptingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration that never launches external processes
    pub fn sandboxed() -> Self {
        Self {
            scripting: ScriptingConfig {
                enabled: false,
                ..ScriptingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Load a JSON configuration; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the script timeout
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.scripting.timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    /// Set the counter file
    pub fn with_counters_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.counters_path = Some(path.into());
        self
    }

    /// Set the number of folder level tokens
    pub fn with_hierarchy_depth(mut self, depth: usize) -> Self {
        self.hierarchy_depth = depth;
        self
    }
}

/// Settings for the `SCRIPTING` function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptingConfig {
    /// Whether scripts may run at all
    pub enabled: bool,

    /// Wall-clock limit for one script run in milliseconds
    pub timeout_ms: u64,

    /// Command prefix per lowercase file extension.
    ///
    /// The script path and its arguments are appended to the prefix. An empty
    /// prefix runs the file directly.
    pub interpreters: BTreeMap<String, Vec<String>>,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        let mut interpreters = BTreeMap::new();
        let mut add = |ext: &str, prefix: &[&str]| {
            interpreters.insert(
                ext.to_string(),
                prefix.iter().map(|s| s.to_string()).collect(),
            );
        };
        add("bat", &["cmd", "/C"]);
        add("cmd", &["cmd", "/C"]);
        add("vbs", &["cscript", "//NoLogo"]);
        add(
            "ps1",
            &["powershell", "-NoProfile", "-ExecutionPolicy", "Bypass", "-File"],
        );
        add("py", &["python"]);
        add("sh", &["sh"]);
        add("exe", &[]);

        Self {
            enabled: true,
            timeout_ms: 30_000,
            interpreters,
        }
    }
}

impl ScriptingConfig {
    /// Timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Command prefix for a script path, `None` for unsupported extensions.
    ///
    /// Files without an extension run directly.
    pub fn interpreter_for(&self, script: &Path) -> Option<&[String]> {
        match script.extension() {
            Some(ext) => self
                .interpreters
                .get(&ext.to_string_lossy().to_ascii_lowercase())
                .map(Vec::as_slice),
            None => Some(&[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"scripting": {"timeout_ms": 500}}"#).unwrap();
        assert_eq!(config.scripting.timeout(), Duration::from_millis(500));
        assert!(config.scripting.enabled);
        assert!(config.scripting.interpreters.contains_key("vbs"));
        assert_eq!(config.hierarchy_depth, 5);
    }

    #[test]
    fn test_interpreter_lookup() {
        let scripting = ScriptingConfig::default();
        assert_eq!(
            scripting.interpreter_for(Path::new("run.BAT")).unwrap(),
            ["cmd".to_string(), "/C".to_string()]
        );
        assert!(scripting.interpreter_for(Path::new("tool")).unwrap().is_empty());
        assert!(scripting.interpreter_for(Path::new("notes.txt")).is_none());
    }

    #[test]
    fn test_sandboxed_disables_scripting() {
        assert!(!EngineConfig::sandboxed().scripting.enabled);
    }
}
