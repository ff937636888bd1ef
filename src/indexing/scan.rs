use std::vec::IntoIter;

use crate::error::Result;
use crate::storage::KeyValueTable;

/// Lazy, single-pass walk over the entries of a table whose keys start with a prefix.
///
/// The walk runs over a sorted snapshot taken when the scan starts. Iteration
/// begins at the first key `>= prefix` and stops at the first key that no
/// longer carries the prefix. Dropping the scan early releases the snapshot.
#[derive(Debug)]
pub struct RangeScan {
    entries: IntoIter<(String, String)>,
    prefix: String,
    done: bool,
}

impl RangeScan {
    pub fn new(table: &impl KeyValueTable, prefix: &str) -> Result<Self> {
        let mut entries = table.entries()?;
        let position = entries.partition_point(|(key, _)| key.as_str() < prefix);
        entries.drain(..position);
        Ok(Self { entries: entries.into_iter(), prefix: prefix.to_string(), done: false })
    }

    /// Only the keys of the remaining entries.
    pub fn keys(self) -> impl Iterator<Item = String> {
        self.map(|(key, _)| key)
    }
}

impl Iterator for RangeScan {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.entries.next() {
            Some((key, value)) if key.starts_with(&self.prefix) => Some((key, value)),
            _ => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, StorageBackend};

    fn table(keys: &[&str]) -> crate::storage::MemoryTable {
        let mut backend = MemoryBackend::new();
        let mut table = backend.open_table("t").unwrap();
        for key in keys {
            table.set(key, "").unwrap();
        }
        table
    }

    #[test]
    fn test_scan_prefix() {
        let table = table(&["^1^2^", "^1^3^", "^12^1^", "1^1^2^", "^2^1^"]);
        let keys: Vec<String> = RangeScan::new(&table, "^1^").unwrap().keys().collect();
        assert_eq!(keys, vec!["^1^2^", "^1^3^"]);
    }

    #[test]
    fn test_scan_empty_table() {
        let table = table(&[]);
        assert_eq!(RangeScan::new(&table, "^").unwrap().count(), 0);
    }

    #[test]
    fn test_scan_no_match() {
        let table = table(&["^1^", "^3^"]);
        assert_eq!(RangeScan::new(&table, "^2^").unwrap().count(), 0);
        assert_eq!(RangeScan::new(&table, "^4^").unwrap().count(), 0);
    }

    #[test]
    fn test_scan_stops_after_first_mismatch() {
        let table = table(&["a", "ab", "b", "ba"]);
        let mut scan = RangeScan::new(&table, "a").unwrap();
        assert_eq!(scan.next().map(|(k, _)| k), Some("a".to_string()));
        assert_eq!(scan.next().map(|(k, _)| k), Some("ab".to_string()));
        assert_eq!(scan.next(), None);
        assert_eq!(scan.next(), None);
    }

    #[test]
    fn test_scan_is_a_snapshot() {
        let mut table = table(&["^1^", "^2^"]);
        let scan = RangeScan::new(&table, "^").unwrap();
        table.delete("^2^").unwrap();
        assert_eq!(scan.count(), 2);
    }
}
