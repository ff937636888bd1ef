use std::collections::BTreeSet;

use log::debug;

use crate::core::{ContextSet, IdPattern, IdTriple, TermId};
use crate::error::{QuadStoreError, Result};
use crate::indexing::key_codec::{decode_key, encode_key, Rotation};
use crate::indexing::planner::PatternPlanner;
use crate::indexing::scan::RangeScan;
use crate::storage::KeyValueTable;

/// The three physical indices plus the registry of known contexts.
///
/// Each index holds, per triple, one row per context it was added to (empty
/// value) and, while the triple is asserted somewhere, one context-free row
/// whose value is its [`ContextSet`]. All three indices receive exactly the
/// same writes, differing only in key order.
#[derive(Debug)]
pub struct IndexSet<T: KeyValueTable> {
    indices: [T; 3],
    contexts: T,
}

impl<T: KeyValueTable> IndexSet<T> {
    /// `indices` must be ordered SPO, POS, OSP.
    pub fn new(indices: [T; 3], contexts: T) -> Self {
        Self { indices, contexts }
    }

    fn index(&self, rotation: Rotation) -> &T {
        &self.indices[rotation as usize]
    }

    fn index_mut(&mut self, rotation: Rotation) -> &mut T {
        &mut self.indices[rotation as usize]
    }

    /// Records `triple` in `context`. Unless `quoted`, the triple also joins the
    /// conjunctive view with `context` added to its context set.
    pub fn add(&mut self, triple: &IdTriple, context: TermId, quoted: bool) -> Result<()> {
        self.contexts.set(&context.to_string(), "")?;
        self.write_rows(triple, Some(context), "")?;

        if !quoted {
            let mut contexts = self.context_set(triple)?;
            if contexts.insert(context) {
                self.write_context_set(triple, &contexts)?;
            }
        }
        Ok(())
    }

    /// Removes `triple` from `context` only. Returns whether it was there.
    pub fn remove_one(&mut self, triple: &IdTriple, context: TermId) -> Result<bool> {
        if !self.contains(triple, Some(context))? {
            return Ok(false);
        }
        self.delete_rows(triple, Some(context))?;

        let mut contexts = self.context_set(triple)?;
        if contexts.remove(&context) {
            self.write_context_set(triple, &contexts)?;
        }
        Ok(true)
    }

    /// Removes `triple` from every context asserting it and from the conjunctive view.
    pub fn remove_everywhere(&mut self, triple: &IdTriple) -> Result<()> {
        let contexts = self.context_set(triple)?;
        for context in contexts.iter() {
            self.delete_rows(triple, Some(*context))?;
        }
        self.delete_rows(triple, None)
    }

    /// Removes every triple matching `pattern`.
    ///
    /// Without a context, each context-free match is removed everywhere. With a
    /// context, matches are removed from that context only; a fully unbound
    /// pattern additionally drops the context from the registry.
    pub fn remove_matching(&mut self, pattern: &IdPattern, context: Option<TermId>) -> Result<usize> {
        let plan = PatternPlanner::plan(pattern, context);
        let scan = RangeScan::new(self.index(plan.rotation), &plan.prefix)?;

        let mut removed = 0;
        for key in scan.keys() {
            let (_, triple) = decode_key(plan.rotation, &key)?;
            match context {
                Some(context) => {
                    self.remove_one(&triple, context)?;
                }
                None => self.remove_everywhere(&triple)?,
            }
            removed += 1;
        }

        if let Some(context) = context {
            if pattern.mask() == 0 {
                self.contexts.delete(&context.to_string())?;
            }
        }
        debug!("Removed {} triples matching mask {} (context {:?})", removed, pattern.mask(), context);
        Ok(removed)
    }

    /// Lazily enumerates the triples matching `pattern`, in `context` or in the
    /// conjunctive view when `context` is `None`.
    pub fn scan(&self, pattern: &IdPattern, context: Option<TermId>) -> Result<IndexMatches> {
        let plan = PatternPlanner::plan(pattern, context);
        let scan = RangeScan::new(self.index(plan.rotation), &plan.prefix)?;
        Ok(IndexMatches { rotation: plan.rotation, context, scan })
    }

    /// Number of triples in `context`, or in the conjunctive view.
    pub fn count(&self, context: Option<TermId>) -> Result<usize> {
        let plan = PatternPlanner::plan(&IdPattern::default(), context);
        Ok(RangeScan::new(self.index(plan.rotation), &plan.prefix)?.count())
    }

    pub fn contains(&self, triple: &IdTriple, context: Option<TermId>) -> Result<bool> {
        Ok(self.index(Rotation::Spo).get(&encode_key(Rotation::Spo, context, triple))?.is_some())
    }

    /// Contexts currently asserting `triple`; empty when it is not in the conjunctive view.
    pub fn context_set(&self, triple: &IdTriple) -> Result<ContextSet> {
        let key = encode_key(Rotation::Spo, None, triple);
        match self.index(Rotation::Spo).get(&key)? {
            Some(value) => decode_context_set(Rotation::Spo, &key, &value),
            None => Ok(ContextSet::new()),
        }
    }

    /// Every context that has been added to and not removed wholesale, ascending by id.
    pub fn contexts(&self) -> Result<Vec<TermId>> {
        let mut contexts = Vec::new();
        for (key, _) in self.contexts.entries()? {
            let id = TermId::parse(&key).ok_or_else(|| {
                QuadStoreError::corrupted("contexts", format!("non-numeric context id '{}'", key))
            })?;
            contexts.push(id);
        }
        contexts.sort();
        Ok(contexts)
    }

    /// Decodes all three indices and checks they hold the same rows.
    pub fn verify_consistency(&self) -> Result<()> {
        let reference = self.decoded_rows(Rotation::Spo)?;
        for rotation in [Rotation::Pos, Rotation::Osp] {
            let rows = self.decoded_rows(rotation)?;
            if rows != reference {
                let missing = reference.difference(&rows).count();
                let extra = rows.difference(&reference).count();
                return Err(QuadStoreError::corrupted(
                    rotation.table_name(),
                    format!("{} rows missing and {} unexpected compared to c^s^p^o^", missing, extra),
                ));
            }
        }
        Ok(())
    }

    fn decoded_rows(&self, rotation: Rotation) -> Result<BTreeSet<(Option<TermId>, IdTriple, String)>> {
        let mut rows = BTreeSet::new();
        for (key, value) in self.index(rotation).entries()? {
            let (context, triple) = decode_key(rotation, &key)?;
            if context.is_none() && decode_context_set(rotation, &key, &value)?.is_empty() {
                return Err(QuadStoreError::corrupted(
                    rotation.table_name(),
                    format!("context-free row '{}' has an empty context set", key),
                ));
            }
            rows.insert((context, triple, value));
        }
        Ok(rows)
    }

    pub fn flush(&mut self) -> Result<()> {
        for index in &mut self.indices {
            index.flush()?;
        }
        self.contexts.flush()
    }

    fn write_rows(&mut self, triple: &IdTriple, context: Option<TermId>, value: &str) -> Result<()> {
        for rotation in Rotation::ALL {
            let key = encode_key(rotation, context, triple);
            self.index_mut(rotation).set(&key, value)?;
        }
        Ok(())
    }

    fn delete_rows(&mut self, triple: &IdTriple, context: Option<TermId>) -> Result<()> {
        for rotation in Rotation::ALL {
            let key = encode_key(rotation, context, triple);
            self.index_mut(rotation).delete(&key)?;
        }
        Ok(())
    }

    /// An empty set removes the context-free row instead of storing it.
    fn write_context_set(&mut self, triple: &IdTriple, contexts: &ContextSet) -> Result<()> {
        if contexts.is_empty() {
            self.delete_rows(triple, None)
        } else {
            self.write_rows(triple, None, &contexts.encode())
        }
    }
}

fn decode_context_set(rotation: Rotation, key: &str, value: &str) -> Result<ContextSet> {
    ContextSet::decode(value).ok_or_else(|| {
        QuadStoreError::corrupted(
            rotation.table_name(),
            format!("row '{}' holds malformed context set '{}'", key, value),
        )
    })
}

/// Matches of an [`IndexSet::scan`], decoded lazily.
#[derive(Debug)]
pub struct IndexMatches {
    rotation: Rotation,
    context: Option<TermId>,
    scan: RangeScan,
}

impl IndexMatches {
    fn decode(&self, key: &str, value: &str) -> Result<(IdTriple, ContextSet)> {
        let (_, triple) = decode_key(self.rotation, key)?;
        let contexts = match self.context {
            // Per-context rows carry no value; the only context is the one asked for.
            Some(context) => std::iter::once(context).collect(),
            None => decode_context_set(self.rotation, key, value)?,
        };
        Ok((triple, contexts))
    }
}

impl Iterator for IndexMatches {
    type Item = Result<(IdTriple, ContextSet)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.scan.next()?;
        Some(self.decode(&key, &value))
    }
}
