use log::debug;

use crate::core::{decode_term, encode_term, Term, TermId};
use crate::error::{QuadStoreError, Result};
use crate::storage::KeyValueTable;

/// Key in the term-to-id table holding the number of ids handed out so far.
/// Serialized terms always start with `{` or `"`, so it cannot collide with one.
pub const TERM_COUNTER_KEY: &str = "__terms__";

/// Bidirectional dictionary between serialized terms and their ids.
///
/// Ids are assigned from a monotonically increasing counter and never reused.
/// The counter is written back to the term-to-id table on every allocation,
/// next to the mapping it belongs to.
#[derive(Debug)]
pub struct TermInterner<T: KeyValueTable> {
    term_to_id: T,
    id_to_term: T,
    next_id: u64,
}

impl<T: KeyValueTable> TermInterner<T> {
    /// Opens the dictionary over its two tables, restoring the persisted counter.
    pub fn open(term_to_id: T, id_to_term: T) -> Result<Self> {
        let next_id = match term_to_id.get(TERM_COUNTER_KEY)? {
            Some(count) => count.parse().map_err(|_| {
                QuadStoreError::corrupted("k2i", format!("term counter '{}' is not a number", count))
            })?,
            None => 0,
        };
        Ok(Self { term_to_id, id_to_term, next_id })
    }

    /// Returns the id of `serialized`, allocating the next one if it has never been seen.
    pub fn intern(&mut self, serialized: &str) -> Result<TermId> {
        if let Some(id) = self.lookup(serialized)? {
            return Ok(id);
        }

        let id = TermId(self.next_id);
        let key = id.to_string();
        self.term_to_id.set(serialized, &key)?;
        self.id_to_term.set(&key, serialized)?;
        self.next_id += 1;
        self.term_to_id.set(TERM_COUNTER_KEY, &self.next_id.to_string())?;
        debug!("Interned term {} as id {}", serialized, id);
        Ok(id)
    }

    /// Id of `serialized` if it has been interned, without allocating.
    pub fn lookup(&self, serialized: &str) -> Result<Option<TermId>> {
        match self.term_to_id.get(serialized)? {
            Some(id) => TermId::parse(&id).map(Some).ok_or_else(|| {
                QuadStoreError::corrupted("k2i", format!("id '{}' is not a number", id))
            }),
            None => Ok(None),
        }
    }

    /// Serialized term behind `id`. An unknown id means corrupted or foreign data.
    pub fn resolve(&self, id: TermId) -> Result<String> {
        self.id_to_term
            .get(&id.to_string())?
            .ok_or_else(|| QuadStoreError::NotFound(format!("no term for id {}", id)))
    }

    pub fn intern_term(&mut self, term: &Term) -> Result<TermId> {
        self.intern(&encode_term(term)?)
    }

    pub fn lookup_term(&self, term: &Term) -> Result<Option<TermId>> {
        self.lookup(&encode_term(term)?)
    }

    pub fn resolve_term(&self, id: TermId) -> Result<Term> {
        decode_term(&self.resolve(id)?)
    }

    /// Number of ids handed out so far.
    pub fn count(&self) -> u64 {
        self.next_id
    }

    pub fn flush(&mut self) -> Result<()> {
        self.term_to_id.flush()?;
        self.id_to_term.flush()
    }
}
