//! Core data structures and types for the quad store

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Separator between the fields of a physical index key and between the ids of a context set.
/// Term ids are decimal digit strings, so it can never occur inside one.
pub const SEPARATOR: char = '^';

/// User-facing RDF term. The store never interprets it; it only interns its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal { value: String, language: Option<String>, datatype: Option<String> },
    Variable(String),
    /// Reference to a nested formula / graph, typically used as a quoted context
    QuotedGraph(String),
}

impl Term {
    pub fn iri(value: &str) -> Self {
        Term::Iri(value.to_string())
    }

    pub fn blank(id: &str) -> Self {
        Term::BlankNode(id.to_string())
    }

    pub fn literal(value: &str) -> Self {
        Term::Literal { value: value.to_string(), language: None, datatype: None }
    }

    pub fn lang_literal(value: &str, language: &str) -> Self {
        Term::Literal {
            value: value.to_string(),
            language: Some(language.to_string()),
            datatype: None,
        }
    }

    pub fn typed_literal(value: &str, datatype: &str) -> Self {
        Term::Literal {
            value: value.to_string(),
            language: None,
            datatype: Some(datatype.to_string()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "_:{}", id),
            Term::Literal { value, language: Some(lang), .. } => write!(f, "\"{}\"@{}", value, lang),
            Term::Literal { value, datatype: Some(dt), .. } => write!(f, "\"{}\"^^<{}>", value, dt),
            Term::Literal { value, .. } => write!(f, "\"{}\"", value),
            Term::Variable(name) => write!(f, "?{}", name),
            Term::QuotedGraph(id) => write!(f, "{{{}}}", id),
        }
    }
}

/// A (subject, predicate, object) statement over user-facing terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self { subject, predicate, object }
    }
}

/// A triple pattern: `None` positions are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Term>,
    pub predicate: Option<Term>,
    pub object: Option<Term>,
}

impl TriplePattern {
    pub fn new(subject: Option<Term>, predicate: Option<Term>, object: Option<Term>) -> Self {
        Self { subject, predicate, object }
    }

    /// The pattern with every position unbound.
    pub fn any() -> Self {
        Self::default()
    }

    /// The bound terms in canonical (subject, predicate, object) order.
    pub fn positions(&self) -> [Option<&Term>; 3] {
        [self.subject.as_ref(), self.predicate.as_ref(), self.object.as_ref()]
    }
}

impl From<&Triple> for TriplePattern {
    fn from(triple: &Triple) -> Self {
        Self {
            subject: Some(triple.subject.clone()),
            predicate: Some(triple.predicate.clone()),
            object: Some(triple.object.clone()),
        }
    }
}

/// Interned identifier of a term, unique for the lifetime of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermId(pub u64);

impl TermId {
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok().map(TermId)
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal storage triple with interned ids, in canonical (s, p, o) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdTriple {
    pub subject: TermId,
    pub predicate: TermId,
    pub object: TermId,
}

impl IdTriple {
    pub fn new(subject: TermId, predicate: TermId, object: TermId) -> Self {
        Self { subject, predicate, object }
    }

    pub fn from_positions(fields: [TermId; 3]) -> Self {
        Self { subject: fields[0], predicate: fields[1], object: fields[2] }
    }

    pub fn positions(&self) -> [TermId; 3] {
        [self.subject, self.predicate, self.object]
    }
}

/// Interned triple pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdPattern {
    pub subject: Option<TermId>,
    pub predicate: Option<TermId>,
    pub object: Option<TermId>,
}

impl IdPattern {
    pub fn new(subject: Option<TermId>, predicate: Option<TermId>, object: Option<TermId>) -> Self {
        Self { subject, predicate, object }
    }

    pub fn from_positions(fields: [Option<TermId>; 3]) -> Self {
        Self { subject: fields[0], predicate: fields[1], object: fields[2] }
    }

    pub fn positions(&self) -> [Option<TermId>; 3] {
        [self.subject, self.predicate, self.object]
    }

    /// Bound-field mask: subject = bit 0, predicate = bit 1, object = bit 2.
    pub fn mask(&self) -> usize {
        self.positions()
            .iter()
            .enumerate()
            .filter(|(_, field)| field.is_some())
            .fold(0, |mask, (bit, _)| mask | (1 << bit))
    }

    /// The triple this pattern denotes when every position is bound.
    pub fn as_triple(&self) -> Option<IdTriple> {
        Some(IdTriple::new(self.subject?, self.predicate?, self.object?))
    }
}

impl From<IdTriple> for IdPattern {
    fn from(triple: IdTriple) -> Self {
        Self::from_positions(triple.positions().map(Some))
    }
}

/// The contexts in which a triple is asserted (non-quoted).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSet(BTreeSet<TermId>);

impl ContextSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Decode a stored value; empty pieces are ignored.
    pub fn decode(value: &str) -> Option<Self> {
        let mut ids = BTreeSet::new();
        for piece in value.split(SEPARATOR).filter(|piece| !piece.is_empty()) {
            ids.insert(TermId::parse(piece)?);
        }
        Some(Self(ids))
    }

    pub fn encode(&self) -> String {
        self.0.iter().map(TermId::to_string).collect::<Vec<_>>().join(&SEPARATOR.to_string())
    }

    pub fn insert(&mut self, id: TermId) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: &TermId) -> bool {
        self.0.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TermId> {
        self.0.iter()
    }
}

impl FromIterator<TermId> for ContextSet {
    fn from_iter<I: IntoIterator<Item = TermId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub mod encoding;
pub use encoding::*;
