use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::storage::{KeyValueTable, StorageBackend, StoreConfig};

const TABLE_EXTENSION: &str = "tbl";

/// Backend keeping one bincode snapshot file per table under a root directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    sync_writes: bool,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), sync_writes: false }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self { root: config.path.clone(), sync_writes: config.sync_writes }
    }

    /// Ask stores on this backend to flush after every operation. Each flush
    /// rewrites the whole snapshot of every table the operation touched.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", escape_table_name(name), TABLE_EXTENSION))
    }
}

impl StorageBackend for FileBackend {
    type Table = FileTable;

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.table_path(name).is_file())
    }

    fn open_table(&mut self, name: &str) -> Result<FileTable> {
        fs::create_dir_all(&self.root)?;
        let path = self.table_path(name);

        if path.is_file() {
            let entries = load_entries(&path)?;
            debug!("Loaded table '{}' with {} entries", name, entries.len());
            return Ok(FileTable {
                name: name.to_string(),
                path,
                entries,
                dirty: false,
            });
        }

        let mut table = FileTable {
            name: name.to_string(),
            path,
            entries: BTreeMap::new(),
            dirty: true,
        };
        // Write the empty snapshot so the table exists on disk from now on.
        table.flush()?;
        Ok(table)
    }

    fn drop_table(&mut self, name: &str) -> Result<()> {
        let path = self.table_path(name);
        if path.is_file() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn sync_writes(&self) -> bool {
        self.sync_writes
    }
}

/// A table loaded into memory from its snapshot file.
///
/// Writes stay in memory until [`KeyValueTable::flush`]. A table dropped with
/// unsaved writes loses them: the owning store decides which tables reach disk
/// and in which order.
#[derive(Debug)]
pub struct FileTable {
    name: String,
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl FileTable {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl KeyValueTable for FileTable {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>> {
        Ok(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        save_entries(&self.path, &self.entries)?;
        self.dirty = false;
        debug!("Flushed table '{}' ({} entries)", self.name, self.entries.len());
        Ok(())
    }
}

impl Drop for FileTable {
    fn drop(&mut self) {
        if self.dirty {
            debug!("Discarding unsaved writes to table '{}'", self.name);
        }
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(bincode::deserialize(&buffer)?)
}

/// Writes to a sibling temp file first so a crash never leaves a half-written snapshot.
fn save_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let encoded = bincode::serialize(entries)?;
    let tmp_path = path.with_extension(format!("{}.tmp", TABLE_EXTENSION));
    {
        let mut file = BufWriter::new(File::create(&tmp_path)?);
        file.write_all(&encoded)?;
        file.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Keeps ASCII alphanumerics, `-` and `_`; every other byte becomes `%xx`.
fn escape_table_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{:02x}", byte));
        }
    }
    escaped
}
