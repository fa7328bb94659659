//! Persistent named counters
//!
//! Counters are grouped by [`CounterCategory`] and advanced through
//! [`CounterStore::get_and_increment`], which hands out the current value and
//! moves the counter forward for the next caller as one atomic step.
//! [`FileCounterStore`] keeps the table in a JSON document shaped
//! `{"counters": {"auto": {"auto_Invoice": 1003}, "custom": {}, "system": {}}}`;
//! [`InMemoryCounterStore`] keeps it in memory only.

#![warn(missing_docs)]

mod file;
mod memory;
mod store;

pub use file::{FileCounterStore, JsonFileBackend};
pub use memory::{InMemoryCounterStore, MemoryBackend};
pub use store::{CounterBackend, PersistentCounters};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Result type for counter operations
pub type CounterResult<T> = Result<T, CounterError>;

/// Counter store errors
#[derive(Error, Debug)]
pub enum CounterError {
    /// Reading or writing the counter file failed
    #[error("Counter file {} could not be accessed: {source}", path.display())]
    Io {
        /// Counter file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The counter file exists but does not hold a counter table
    #[error("Counter file {} is not a valid counter table: {source}", path.display())]
    Corrupt {
        /// Counter file path
        path: PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The table could not be serialized
    #[error("Counters could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Advancing the counter would leave the i64 range
    #[error("Counter {category}/{name} would overflow")]
    Overflow {
        /// Counter category
        category: CounterCategory,
        /// Counter name
        name: String,
    },

    /// A category name that is not one of auto, custom, system
    #[error("Unknown counter category '{0}'")]
    UnknownCategory(String),
}

/// Value a counter restarts at when no other value is given
pub const DEFAULT_RESET_VALUE: i64 = 1;

/// Counter groups kept in the counter table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum CounterCategory {
    /// Counters created by `AUTOINCREMENT`
    #[default]
    Auto,
    /// Counters managed by users
    Custom,
    /// Counters owned by the host application
    System,
}

impl CounterCategory {
    /// All categories in storage order
    pub const ALL: [CounterCategory; 3] = [
        CounterCategory::Auto,
        CounterCategory::Custom,
        CounterCategory::System,
    ];

    /// Lowercase storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterCategory::Auto => "auto",
            CounterCategory::Custom => "custom",
            CounterCategory::System => "system",
        }
    }
}

impl fmt::Display for CounterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CounterCategory {
    type Err = CounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(CounterCategory::Auto),
            "custom" => Ok(CounterCategory::Custom),
            "system" => Ok(CounterCategory::System),
            _ => Err(CounterError::UnknownCategory(s.to_string())),
        }
    }
}

/// A counter as listed by [`CounterStore::list_all`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Counter name
    pub name: String,
    /// Category the counter lives in
    pub category: CounterCategory,
    /// Value the next get-and-increment will hand out
    pub value: i64,
}

/// Shared counter service
///
/// Implementations serialize all mutations so concurrent callers observe
/// distinct, gapless values.
pub trait CounterStore: Send + Sync + fmt::Debug {
    /// Return the counter's current value and advance it by `step`.
    ///
    /// A missing counter starts at `start`.
    fn get_and_increment(
        &self,
        name: &str,
        category: CounterCategory,
        start: i64,
        step: i64,
    ) -> CounterResult<i64>;

    /// Current value, `None` if the counter does not exist
    fn get(&self, name: &str, category: CounterCategory) -> CounterResult<Option<i64>>;

    /// Set a counter, creating it if needed
    fn set(&self, name: &str, category: CounterCategory, value: i64) -> CounterResult<()>;

    /// Restart a counter so the next get-and-increment hands out `value`
    fn reset(&self, name: &str, category: CounterCategory, value: i64) -> CounterResult<()> {
        self.set(name, category, value)
    }

    /// Delete a counter; returns whether it existed
    fn delete(&self, name: &str, category: CounterCategory) -> CounterResult<bool>;

    /// Every counter, ordered by category then name
    fn list_all(&self) -> CounterResult<Vec<Counter>>;

    /// Counters of one category by name
    fn list_category(&self, category: CounterCategory) -> CounterResult<BTreeMap<String, i64>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|c| c.category == category)
            .map(|c| (c.name, c.value))
            .collect())
    }

    /// Delete all counters of a category; returns how many were removed
    fn clear_category(&self, category: CounterCategory) -> CounterResult<usize>;
}

/// The persisted counter table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterTable {
    #[serde(default)]
    counters: BTreeMap<CounterCategory, BTreeMap<String, i64>>,
}

impl Default for CounterTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterTable {
    /// Empty table with all categories present
    pub fn new() -> Self {
        let mut table = Self {
            counters: BTreeMap::new(),
        };
        table.ensure_categories();
        table
    }

    /// Make sure every category has an entry (files written by older
    /// versions may lack some)
    pub fn ensure_categories(&mut self) {
        for category in CounterCategory::ALL {
            self.counters.entry(category).or_default();
        }
    }

    /// Current value of a counter
    pub fn get(&self, category: CounterCategory, name: &str) -> Option<i64> {
        self.counters.get(&category)?.get(name).copied()
    }

    /// Hand out the current value and store the advanced one
    pub fn get_and_increment(
        &mut self,
        category: CounterCategory,
        name: &str,
        start: i64,
        step: i64,
    ) -> CounterResult<i64> {
        let entries = self.counters.entry(category).or_default();
        let current = entries.get(name).copied().unwrap_or(start);
        let next = current
            .checked_add(step)
            .ok_or_else(|| CounterError::Overflow {
                category,
                name: name.to_string(),
            })?;
        entries.insert(name.to_string(), next);
        Ok(current)
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, category: CounterCategory, name: &str, value: i64) -> Option<i64> {
        self.counters
            .entry(category)
            .or_default()
            .insert(name.to_string(), value)
    }

    /// Remove a counter, returning its value
    pub fn remove(&mut self, category: CounterCategory, name: &str) -> Option<i64> {
        self.counters.get_mut(&category)?.remove(name)
    }

    /// Remove all counters of a category
    pub fn clear(&mut self, category: CounterCategory) -> usize {
        self.counters
            .get_mut(&category)
            .map(|entries| {
                let removed = entries.len();
                entries.clear();
                removed
            })
            .unwrap_or(0)
    }

    /// Flattened listing ordered by category then name
    pub fn counters(&self) -> Vec<Counter> {
        self.counters
            .iter()
            .flat_map(|(category, entries)| {
                entries.iter().map(move |(name, value)| Counter {
                    name: name.clone(),
                    category: *category,
                    value: *value,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_get_and_increment_starts_at_start() {
        let mut table = CounterTable::new();
        assert_eq!(
            table
                .get_and_increment(CounterCategory::Auto, "auto_Invoice", 1000, 1)
                .unwrap(),
            1000
        );
        assert_eq!(
            table
                .get_and_increment(CounterCategory::Auto, "auto_Invoice", 5, 10)
                .unwrap(),
            1001
        );
        assert_eq!(table.get(CounterCategory::Auto, "auto_Invoice"), Some(1011));
    }

    #[test]
    fn test_table_overflow_does_not_advance() {
        let mut table = CounterTable::new();
        table.set(CounterCategory::Custom, "big", i64::MAX);
        let err = table
            .get_and_increment(CounterCategory::Custom, "big", 0, 1)
            .unwrap_err();
        assert!(matches!(err, CounterError::Overflow { .. }));
        assert_eq!(table.get(CounterCategory::Custom, "big"), Some(i64::MAX));
    }

    #[test]
    fn test_table_json_shape() {
        let mut table = CounterTable::new();
        table.set(CounterCategory::Auto, "auto_A", 3);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "counters": {"auto": {"auto_A": 3}, "custom": {}, "system": {}}
            })
        );
    }

    #[test]
    fn test_table_accepts_missing_categories() {
        let mut table: CounterTable =
            serde_json::from_str(r#"{"counters": {"custom": {"x": 7}}}"#).unwrap();
        table.ensure_categories();
        assert_eq!(table.get(CounterCategory::Custom, "x"), Some(7));
        assert_eq!(table.counters().len(), 1);
        assert_eq!(table, {
            let mut expected = CounterTable::new();
            expected.set(CounterCategory::Custom, "x", 7);
            expected
        });
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("AUTO".parse::<CounterCategory>().unwrap(), CounterCategory::Auto);
        assert_eq!(
            " system ".parse::<CounterCategory>().unwrap(),
            CounterCategory::System
        );
        assert!("other".parse::<CounterCategory>().is_err());
    }
}
