//! The host-facing quad store.

pub mod namespace;
pub mod quad_store;

pub use namespace::NamespaceBindings;
pub use quad_store::{ContextTerms, Matches, QuadStore, TABLE_NAMES};
