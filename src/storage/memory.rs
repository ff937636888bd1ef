use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{QuadStoreError, Result};
use crate::storage::{KeyValueTable, StorageBackend};

type Entries = Arc<RwLock<BTreeMap<String, String>>>;

/// In-process backend. Clones share the same tables, so a store closed on one
/// handle can be reopened from another and see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<RwLock<HashMap<String, Entries>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every table currently held, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let tables = self.tables.read().map_err(|_| poisoned("table registry"))?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl StorageBackend for MemoryBackend {
    type Table = MemoryTable;

    fn exists(&self, name: &str) -> Result<bool> {
        let tables = self.tables.read().map_err(|_| poisoned("table registry"))?;
        Ok(tables.contains_key(name))
    }

    fn open_table(&mut self, name: &str) -> Result<MemoryTable> {
        let mut tables = self.tables.write().map_err(|_| poisoned("table registry"))?;
        let entries = tables.entry(name.to_string()).or_default();
        Ok(MemoryTable { name: name.to_string(), entries: Arc::clone(entries) })
    }

    fn drop_table(&mut self, name: &str) -> Result<()> {
        let mut tables = self.tables.write().map_err(|_| poisoned("table registry"))?;
        if let Some(entries) = tables.remove(name) {
            // Handles that are still open must not keep serving the dropped data.
            entries.write().map_err(|_| poisoned(name))?.clear();
        }
        Ok(())
    }
}

/// Handle to one table of a [`MemoryBackend`].
#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    entries: Entries,
}

impl MemoryTable {
    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, String>>> {
        self.entries.read().map_err(|_| poisoned(&self.name))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, String>>> {
        self.entries.write().map_err(|_| poisoned(&self.name))
    }
}

impl KeyValueTable for MemoryTable {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.write()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.write()?.remove(key);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>> {
        Ok(self.read()?.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    fn clear(&mut self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }
}

fn poisoned(name: &str) -> QuadStoreError {
    QuadStoreError::Storage(format!("lock poisoned on table '{}'", name))
}
