use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the table files of a file-backed store
    pub path: PathBuf,
    /// Create missing tables on open instead of failing with `NotFound`
    pub create: bool,
    /// Save the touched tables after every store operation instead of on close.
    /// Every save rewrites the table's whole snapshot file.
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("./data/quadstore"), create: true, sync_writes: false }
    }
}
