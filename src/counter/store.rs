//! Mutex-guarded counter table with a pluggable persistence backend

use super::{Counter, CounterCategory, CounterResult, CounterStore, CounterTable};
use log::debug;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;

/// Where a counter table is written after each mutation
pub trait CounterBackend: Send + Sync {
    /// Durably store the complete table
    fn persist(&self, table: &CounterTable) -> CounterResult<()>;

    /// Short description for logs and debug output
    fn describe(&self) -> String;
}

/// Counter store holding the table in memory and persisting every change.
///
/// Each mutation runs against a copy of the table under the lock; the copy
/// replaces the live table only once the backend accepted it, so a failed
/// write leaves both the durable state and the in-memory state unchanged.
pub struct PersistentCounters<B> {
    table: Mutex<CounterTable>,
    backend: B,
}

impl<B: CounterBackend> PersistentCounters<B> {
    /// Wrap an existing table
    pub fn with_table(mut table: CounterTable, backend: B) -> Self {
        table.ensure_categories();
        Self {
            table: Mutex::new(table),
            backend,
        }
    }

    /// The persistence backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Copy of the current table
    pub fn snapshot(&self) -> CounterTable {
        self.table.lock().clone()
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut CounterTable) -> CounterResult<T>) -> CounterResult<T> {
        let mut live = self.table.lock();
        let mut next = live.clone();
        let out = f(&mut next)?;
        if next != *live {
            self.backend.persist(&next)?;
            *live = next;
        }
        Ok(out)
    }
}

impl<B> fmt::Debug for PersistentCounters<B>
where
    B: CounterBackend,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentCounters")
            .field("backend", &self.backend.describe())
            .field("counter_count", &self.table.lock().counters().len())
            .finish()
    }
}

impl<B: CounterBackend> CounterStore for PersistentCounters<B> {
    fn get_and_increment(
        &self,
        name: &str,
        category: CounterCategory,
        start: i64,
        step: i64,
    ) -> CounterResult<i64> {
        let current =
            self.mutate(|table| table.get_and_increment(category, name, start, step))?;
        debug!(
            "Counter {category}/{name}: handed out {current}, next {}",
            current.saturating_add(step)
        );
        Ok(current)
    }

    fn get(&self, name: &str, category: CounterCategory) -> CounterResult<Option<i64>> {
        Ok(self.table.lock().get(category, name))
    }

    fn set(&self, name: &str, category: CounterCategory, value: i64) -> CounterResult<()> {
        let old = self.mutate(|table| Ok(table.set(category, name, value)))?;
        debug!("Counter {category}/{name} set: {old:?} -> {value}");
        Ok(())
    }

    fn delete(&self, name: &str, category: CounterCategory) -> CounterResult<bool> {
        let removed = self.mutate(|table| Ok(table.remove(category, name)))?;
        if removed.is_some() {
            debug!("Counter {category}/{name} deleted");
        }
        Ok(removed.is_some())
    }

    fn list_all(&self) -> CounterResult<Vec<Counter>> {
        Ok(self.table.lock().counters())
    }

    fn list_category(&self, category: CounterCategory) -> CounterResult<BTreeMap<String, i64>> {
        Ok(self
            .table
            .lock()
            .counters()
            .into_iter()
            .filter(|c| c.category == category)
            .map(|c| (c.name, c.value))
            .collect())
    }

    fn clear_category(&self, category: CounterCategory) -> CounterResult<usize> {
        let removed = self.mutate(|table| Ok(table.clear(category)))?;
        log::info!("Cleared {removed} counters in category '{category}'");
        Ok(removed)
    }
}
