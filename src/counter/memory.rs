//! Ephemeral counter store for tests and dry runs

use super::{CounterBackend, CounterResult, CounterTable, PersistentCounters};

/// Backend that keeps nothing outside the process
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackend;

impl CounterBackend for MemoryBackend {
    fn persist(&self, _table: &CounterTable) -> CounterResult<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Counter store without durable state
pub type InMemoryCounterStore = PersistentCounters<MemoryBackend>;

impl PersistentCounters<MemoryBackend> {
    /// Empty in-memory store
    pub fn new() -> Self {
        Self::with_table(CounterTable::new(), MemoryBackend)
    }
}

impl Default for PersistentCounters<MemoryBackend> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::{CounterCategory, CounterStore, DEFAULT_RESET_VALUE};

    #[test]
    fn test_management_operations() {
        let store = InMemoryCounterStore::new();
        store.set("Batch", CounterCategory::Custom, 41).unwrap();
        assert_eq!(store.get("Batch", CounterCategory::Custom).unwrap(), Some(41));
        assert_eq!(store.get("Batch", CounterCategory::Auto).unwrap(), None);

        assert_eq!(
            store
                .get_and_increment("Batch", CounterCategory::Custom, 0, 1)
                .unwrap(),
            41
        );
        store.reset("Batch", CounterCategory::Custom, 7).unwrap();
        assert_eq!(store.get("Batch", CounterCategory::Custom).unwrap(), Some(7));

        assert!(store.delete("Batch", CounterCategory::Custom).unwrap());
        assert!(!store.delete("Batch", CounterCategory::Custom).unwrap());
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let store = InMemoryCounterStore::new();
        for _ in 0..3 {
            store
                .get_and_increment("auto_Invoice", CounterCategory::Auto, 1000, 1)
                .unwrap();
        }
        store
            .reset("auto_Invoice", CounterCategory::Auto, DEFAULT_RESET_VALUE)
            .unwrap();
        assert_eq!(
            store
                .get_and_increment("auto_Invoice", CounterCategory::Auto, 1000, 1)
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_clear_category_leaves_others() {
        let store = InMemoryCounterStore::new();
        store.set("a", CounterCategory::Auto, 1).unwrap();
        store.set("b", CounterCategory::Auto, 2).unwrap();
        store.set("c", CounterCategory::System, 3).unwrap();

        assert_eq!(store.clear_category(CounterCategory::Auto).unwrap(), 2);
        let remaining = store.list_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "c");
        assert_eq!(
            store.list_category(CounterCategory::System).unwrap().get("c"),
            Some(&3)
        );
    }
}
