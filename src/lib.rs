//! # Quadstore
//!
//! Quadstore is a context-aware RDF quad store that keeps its indices in any
//! ordered, string-keyed key-value substrate.
//!
//! Terms are interned into compact numeric ids. Every (subject, predicate,
//! object) triple is written under three rotated key orders (SPO, POS, OSP),
//! each prefixed by its context, so any combination of bound fields can be
//! answered with a single prefix scan. A context-free row per triple carries
//! the set of contexts asserting it and backs the conjunctive (union) view.
//!
//! ## Features
//!
//! - Pattern matching with any subset of subject, predicate, object and context bound
//! - Shared context sets for identical triples asserted in several graphs
//! - Quoted (not asserted) triples that stay out of the conjunctive view
//! - In-memory and file-backed storage backends
//!
//! ## Example
//!
//! ```rust
//! use quadstore::{MemoryBackend, QuadStore, Result, Term, Triple, TriplePattern};
//!
//! fn example() -> Result<()> {
//!     let mut store = QuadStore::new(Some("example"));
//!     store.open(MemoryBackend::new(), true)?;
//!
//!     let likes = Term::iri("http://example.org/likes");
//!     let triple = Triple::new(Term::iri("http://example.org/alice"), likes.clone(), Term::literal("pizza"));
//!     store.add(&triple, &Term::iri("http://example.org/graph1"), false)?;
//!
//!     let pattern = TriplePattern::new(None, Some(likes), None);
//!     for row in store.triples(&pattern, None)? {
//!         let (triple, contexts) = row?;
//!         println!("{} {} {} in {:?}", triple.subject, triple.predicate, triple.object, contexts);
//!     }
//!     store.close()
//! }
//! # example().unwrap();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::new_without_default)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::cast_possible_truncation)]

/// Core data structures and types
pub mod core;

/// Error types and result definitions
pub mod error;

/// Term interning, key layout, planning and scans
pub mod indexing;

/// Ordered key-value backends
pub mod storage;

/// The host-facing quad store
pub mod store;

// Re-export commonly used types
pub use crate::core::{ContextSet, IdPattern, IdTriple, Term, TermId, Triple, TriplePattern};
pub use error::{QuadStoreError, Result};
pub use storage::{FileBackend, KeyValueTable, MemoryBackend, StorageBackend, StoreConfig};
pub use store::QuadStore;
