use std::vec::IntoIter;

use log::{debug, info, warn};

use crate::core::{IdPattern, IdTriple, TermId, Term, Triple, TriplePattern};
use crate::error::{QuadStoreError, Result};
use crate::indexing::{IndexMatches, IndexSet, Rotation, TermInterner};
use crate::storage::{FileBackend, KeyValueTable, StorageBackend, StoreConfig};
use crate::store::namespace::NamespaceBindings;

/// Every table a store keeps in its backend.
pub const TABLE_NAMES: [&str; 8] = [
    Rotation::Spo.table_name(),
    Rotation::Pos.table_name(),
    Rotation::Osp.table_name(),
    "contexts",
    "namespace",
    "prefix",
    "k2i",
    "i2k",
];

struct OpenStore<B: StorageBackend> {
    backend: B,
    indices: IndexSet<B::Table>,
    dictionary: TermInterner<B::Table>,
    namespaces: NamespaceBindings<B::Table>,
}

impl<B: StorageBackend> OpenStore<B> {
    /// Saves the dictionary before the indices, so rows on disk never refer to
    /// ids the saved counter has not covered yet.
    fn flush(&mut self) -> Result<()> {
        self.dictionary.flush()?;
        self.namespaces.flush()?;
        self.indices.flush()
    }

    fn sync(&mut self) -> Result<()> {
        if self.backend.sync_writes() {
            self.flush()?;
        }
        Ok(())
    }
}

/// A context-aware quad store over an ordered key-value backend.
///
/// Created closed; every operation other than [`QuadStore::open`] fails with
/// `InvalidState` until the store is opened.
pub struct QuadStore<B: StorageBackend> {
    identifier: Option<String>,
    open: Option<OpenStore<B>>,
}

impl<B: StorageBackend> QuadStore<B> {
    pub fn new(identifier: Option<&str>) -> Self {
        Self { identifier: identifier.map(str::to_string), open: None }
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.open.is_none()
    }

    /// Opens the store's tables in `backend`. Without `create`, a backend missing
    /// any of them is reported as `NotFound`.
    pub fn open(&mut self, mut backend: B, create: bool) -> Result<()> {
        if self.open.is_some() {
            return Err(QuadStoreError::InvalidState("the store is already open".to_string()));
        }

        if !create {
            for name in TABLE_NAMES {
                if !backend.exists(name)? {
                    return Err(QuadStoreError::NotFound(format!("store table '{}' does not exist", name)));
                }
            }
        }

        let indices = [
            backend.open_table(Rotation::Spo.table_name())?,
            backend.open_table(Rotation::Pos.table_name())?,
            backend.open_table(Rotation::Osp.table_name())?,
        ];
        let indices = IndexSet::new(indices, backend.open_table("contexts")?);
        let namespaces =
            NamespaceBindings::new(backend.open_table("namespace")?, backend.open_table("prefix")?);
        let dictionary = TermInterner::open(backend.open_table("k2i")?, backend.open_table("i2k")?)?;

        info!(
            "Opened quad store {} ({} terms interned)",
            self.identifier.as_deref().unwrap_or("<anonymous>"),
            dictionary.count()
        );
        self.open = Some(OpenStore { backend, indices, dictionary, namespaces });
        Ok(())
    }

    /// Flushes and releases the tables. Closing a closed store does nothing.
    /// If a flush fails the store is still closed and the unsaved writes are lost.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut open) = self.open.take() {
            open.flush()?;
            info!("Closed quad store {}", self.identifier.as_deref().unwrap_or("<anonymous>"));
        }
        Ok(())
    }

    /// Drops every table of the store from its backend. The store is closed afterwards.
    pub fn destroy(&mut self) -> Result<()> {
        let open = self.open.take().ok_or_else(closed)?;
        let OpenStore { mut backend, indices, dictionary, namespaces } = open;
        // Release the table handles before their backing storage goes away.
        drop((indices, dictionary, namespaces));
        for name in TABLE_NAMES {
            backend.drop_table(name)?;
        }
        info!("Destroyed quad store {}", self.identifier.as_deref().unwrap_or("<anonymous>"));
        Ok(())
    }

    /// Adds `triple` to `context`. A `quoted` triple is recorded in the context
    /// but stays out of the conjunctive view.
    pub fn add(&mut self, triple: &Triple, context: &Term, quoted: bool) -> Result<()> {
        let open = self.open_mut()?;
        let ids = IdTriple::new(
            open.dictionary.intern_term(&triple.subject)?,
            open.dictionary.intern_term(&triple.predicate)?,
            open.dictionary.intern_term(&triple.object)?,
        );
        let context_id = open.dictionary.intern_term(context)?;
        debug!("Adding {:?} to context {} (quoted: {})", ids, context_id, quoted);
        open.indices.add(&ids, context_id, quoted)?;
        open.sync()
    }

    /// Removes the triples matching `pattern`. Returns how many matches were removed.
    ///
    /// With a context, matches are removed from that context only (and a fully
    /// unbound pattern forgets the context). Without one, each match is removed
    /// from every context asserting it.
    pub fn remove(&mut self, pattern: &TriplePattern, context: Option<&Term>) -> Result<usize> {
        let open = self.open_mut()?;
        let Some(ids) = lookup_pattern(&open.dictionary, pattern)? else {
            return Ok(0);
        };
        let context_id = match context {
            Some(term) => match open.dictionary.lookup_term(term)? {
                Some(id) => Some(id),
                None => return Ok(0),
            },
            None => None,
        };

        let removed = match (context_id, ids.as_triple()) {
            (Some(context_id), Some(triple)) => {
                usize::from(open.indices.remove_one(&triple, context_id)?)
            }
            _ => open.indices.remove_matching(&ids, context_id)?,
        };
        open.sync()?;
        Ok(removed)
    }

    /// Lazily yields the triples matching `pattern` together with their contexts.
    ///
    /// With a context only that context's rows are visited (quoted triples
    /// included) and each match reports just that context. Without one, the
    /// conjunctive view is visited and each match reports every asserting context.
    pub fn triples(&self, pattern: &TriplePattern, context: Option<&Term>) -> Result<Matches<'_, B::Table>> {
        let open = self.open_ref()?;
        let mut matches = Matches {
            dictionary: &open.dictionary,
            pattern: pattern.clone(),
            context: context.cloned(),
            inner: None,
        };

        let Some(ids) = lookup_pattern(&open.dictionary, pattern)? else {
            return Ok(matches);
        };
        let context_id = match context {
            Some(term) => match open.dictionary.lookup_term(term)? {
                Some(id) => Some(id),
                None => return Ok(matches),
            },
            None => None,
        };
        matches.inner = Some(open.indices.scan(&ids, context_id)?);
        Ok(matches)
    }

    /// Number of triples in `context`, or in the conjunctive view.
    pub fn count(&self, context: Option<&Term>) -> Result<usize> {
        let open = self.open_ref()?;
        match context {
            Some(term) => match open.dictionary.lookup_term(term)? {
                Some(id) => open.indices.count(Some(id)),
                None => Ok(0),
            },
            None => open.indices.count(None),
        }
    }

    pub fn len(&self, context: Option<&Term>) -> Result<usize> {
        self.count(context)
    }

    pub fn is_empty(&self, context: Option<&Term>) -> Result<bool> {
        Ok(self.count(context)? == 0)
    }

    pub fn contains(&self, triple: &Triple, context: Option<&Term>) -> Result<bool> {
        let mut matches = self.triples(&TriplePattern::from(triple), context)?;
        matches.next().transpose().map(|found| found.is_some())
    }

    /// All known contexts, or only those currently asserting `triple`.
    pub fn contexts(&self, triple: Option<&Triple>) -> Result<ContextTerms<'_, B::Table>> {
        let open = self.open_ref()?;
        let ids = match triple {
            None => open.indices.contexts()?,
            Some(triple) => match lookup_pattern(&open.dictionary, &TriplePattern::from(triple))? {
                Some(ids) => match ids.as_triple() {
                    Some(triple) => open.indices.context_set(&triple)?.iter().copied().collect(),
                    None => Vec::new(),
                },
                None => Vec::new(),
            },
        };
        Ok(ContextTerms { dictionary: &open.dictionary, ids: ids.into_iter() })
    }

    pub fn bind(&mut self, prefix: &str, namespace: &str) -> Result<()> {
        let open = self.open_mut()?;
        open.namespaces.bind(prefix, namespace)?;
        open.sync()
    }

    pub fn namespace(&self, prefix: &str) -> Result<Option<String>> {
        self.open_ref()?.namespaces.namespace(prefix)
    }

    pub fn prefix(&self, namespace: &str) -> Result<Option<String>> {
        self.open_ref()?.namespaces.prefix(namespace)
    }

    pub fn namespaces(&self) -> Result<Vec<(String, String)>> {
        self.open_ref()?.namespaces.namespaces()
    }

    /// Checks that the three physical indices agree with each other.
    pub fn verify_indices(&self) -> Result<()> {
        self.open_ref()?.indices.verify_consistency()
    }

    /// Number of term ids handed out over the store's lifetime.
    pub fn term_count(&self) -> Result<u64> {
        Ok(self.open_ref()?.dictionary.count())
    }

    /// Backend the store is open on.
    pub fn backend(&self) -> Result<&B> {
        Ok(&self.open_ref()?.backend)
    }

    fn open_ref(&self) -> Result<&OpenStore<B>> {
        self.open.as_ref().ok_or_else(closed)
    }

    fn open_mut(&mut self) -> Result<&mut OpenStore<B>> {
        self.open.as_mut().ok_or_else(closed)
    }
}

impl QuadStore<FileBackend> {
    /// Opens a file-backed store as described by `config`.
    pub fn open_with_config(identifier: Option<&str>, config: &StoreConfig) -> Result<Self> {
        let mut store = Self::new(identifier);
        store.open(FileBackend::from_config(config), config.create)?;
        Ok(store)
    }
}

impl<B: StorageBackend> Drop for QuadStore<B> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close quad store on drop: {}", e);
        }
    }
}

fn closed() -> QuadStoreError {
    QuadStoreError::InvalidState("the store must be open".to_string())
}

/// Interned form of `pattern`, or `None` when a bound term was never interned
/// (nothing can match it).
fn lookup_pattern<T: KeyValueTable>(
    dictionary: &TermInterner<T>,
    pattern: &TriplePattern,
) -> Result<Option<IdPattern>> {
    let mut ids = [None; 3];
    for (slot, term) in ids.iter_mut().zip(pattern.positions()) {
        if let Some(term) = term {
            match dictionary.lookup_term(term)? {
                Some(id) => *slot = Some(id),
                None => return Ok(None),
            }
        }
    }
    Ok(Some(IdPattern::from_positions(ids)))
}

/// Lazy results of [`QuadStore::triples`]. Terms bound in the pattern are
/// returned as given; wildcard positions are resolved through the dictionary.
pub struct Matches<'a, T: KeyValueTable> {
    dictionary: &'a TermInterner<T>,
    pattern: TriplePattern,
    context: Option<Term>,
    inner: Option<IndexMatches>,
}

impl<T: KeyValueTable> Matches<'_, T> {
    fn resolve(&self, ids: IdTriple, contexts: Vec<TermId>) -> Result<(Triple, Vec<Term>)> {
        let [s, p, o] = ids.positions();
        let [bound_s, bound_p, bound_o] = self.pattern.positions();
        let triple = Triple::new(
            self.term(bound_s, s)?,
            self.term(bound_p, p)?,
            self.term(bound_o, o)?,
        );
        let contexts = match &self.context {
            Some(context) => vec![context.clone()],
            None => contexts
                .into_iter()
                .map(|id| self.dictionary.resolve_term(id))
                .collect::<Result<Vec<_>>>()?,
        };
        Ok((triple, contexts))
    }

    fn term(&self, bound: Option<&Term>, id: TermId) -> Result<Term> {
        match bound {
            Some(term) => Ok(term.clone()),
            None => self.dictionary.resolve_term(id),
        }
    }
}

impl<T: KeyValueTable> Iterator for Matches<'_, T> {
    type Item = Result<(Triple, Vec<Term>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.inner.as_mut()?.next()?;
        Some(row.and_then(|(ids, contexts)| self.resolve(ids, contexts.iter().copied().collect())))
    }
}

/// Lazily resolved context terms of [`QuadStore::contexts`].
pub struct ContextTerms<'a, T: KeyValueTable> {
    dictionary: &'a TermInterner<T>,
    ids: IntoIter<TermId>,
}

impl<T: KeyValueTable> Iterator for ContextTerms<'_, T> {
    type Item = Result<Term>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        Some(self.dictionary.resolve_term(id))
    }
}
