//! Ordered key-value substrate the quad store is built on.
//!
//! The store only needs named, string-keyed tables that support point
//! get/set/delete and an ascending walk over every entry. Range queries and
//! secondary indices are built on top of that by the `indexing` module.

use crate::error::Result;

pub mod file;
pub mod memory;
pub mod util;

pub use file::{FileBackend, FileTable};
pub use memory::{MemoryBackend, MemoryTable};
pub use util::StoreConfig;

/// One ordered, string-keyed table.
pub trait KeyValueTable {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Deleting an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Snapshot of every entry, ascending by key.
    fn entries(&self) -> Result<Vec<(String, String)>>;

    fn len(&self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn clear(&mut self) -> Result<()> {
        for (key, _) in self.entries()? {
            self.delete(&key)?;
        }
        Ok(())
    }

    /// Persist pending writes, for backends that buffer them.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A source of named tables.
pub trait StorageBackend {
    type Table: KeyValueTable;

    fn exists(&self, name: &str) -> Result<bool>;

    /// Opens `name`, creating an empty table if it does not exist yet.
    fn open_table(&mut self, name: &str) -> Result<Self::Table>;

    /// Removes `name` and all of its entries. Dropping an absent table is not an error.
    fn drop_table(&mut self, name: &str) -> Result<()>;

    /// Whether the store should flush its tables after every mutating operation.
    fn sync_writes(&self) -> bool {
        false
    }
}
