//! Term Interner Integration Tests
//!
//! The interner maps the serialized form of a term to a numeric id and back.
//! Ids come from a counter persisted next to the mappings, so they stay unique
//! across reopen and are never handed out twice.

use quadstore::indexing::dictionary::TERM_COUNTER_KEY;
use quadstore::indexing::TermInterner;
use quadstore::storage::{KeyValueTable, MemoryBackend, MemoryTable, StorageBackend};
use quadstore::{QuadStore, QuadStoreError, Term, TermId, Triple, TriplePattern};

fn open_interner(backend: &mut MemoryBackend) -> TermInterner<MemoryTable> {
    TermInterner::open(backend.open_table("k2i").unwrap(), backend.open_table("i2k").unwrap()).unwrap()
}

fn sample_terms() -> Vec<Term> {
    vec![
        Term::iri("http://example.org/person/Alice"),
        Term::iri("http://example.org/knows"),
        Term::blank("b0"),
        Term::literal("something"),
        Term::lang_literal("hello", "en"),
        Term::lang_literal("こんにちは", "ja"),
        Term::typed_literal("23.5", "http://www.w3.org/2001/XMLSchema#double"),
        Term::Variable("x".to_string()),
        Term::QuotedGraph("formula-1".to_string()),
    ]
}

#[test]
fn test_interning_round_trip() {
    let mut backend = MemoryBackend::new();
    let mut dict = open_interner(&mut backend);

    for term in sample_terms() {
        let id = dict.intern_term(&term).unwrap();
        assert_eq!(dict.resolve_term(id).unwrap(), term);
        assert_eq!(dict.intern_term(&term).unwrap(), id, "re-interning {} changed its id", term);
    }
    assert_eq!(dict.count(), sample_terms().len() as u64);
}

#[test]
fn test_ids_are_strictly_increasing() {
    let mut backend = MemoryBackend::new();
    let mut dict = open_interner(&mut backend);

    let ids: Vec<TermId> = sample_terms().iter().map(|t| dict.intern_term(t).unwrap()).collect();
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    assert_eq!(ids.first(), Some(&TermId(0)));
}

#[test]
fn test_counter_survives_reopen() {
    let mut backend = MemoryBackend::new();
    {
        let mut dict = open_interner(&mut backend);
        dict.intern_term(&Term::iri("a")).unwrap();
        dict.intern_term(&Term::iri("b")).unwrap();
        dict.intern_term(&Term::iri("c")).unwrap();
    }

    let mut dict = open_interner(&mut backend);
    assert_eq!(dict.count(), 3);
    assert_eq!(dict.intern_term(&Term::iri("b")).unwrap(), TermId(1));
    assert_eq!(dict.intern_term(&Term::iri("d")).unwrap(), TermId(3));

    let k2i = backend.open_table("k2i").unwrap();
    assert_eq!(k2i.get(TERM_COUNTER_KEY).unwrap(), Some("4".to_string()));
}

#[test]
fn test_unknown_id_is_an_error() {
    let mut backend = MemoryBackend::new();
    let mut dict = open_interner(&mut backend);
    dict.intern_term(&Term::iri("a")).unwrap();

    match dict.resolve(TermId(7)) {
        Err(QuadStoreError::NotFound(msg)) => assert!(msg.contains('7')),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_ids_are_not_reused_after_removal() {
    let mut store = QuadStore::new(None);
    store.open(MemoryBackend::new(), true).unwrap();

    let ctx = Term::iri("ctx");
    let triple = Triple::new(Term::iri("s"), Term::iri("p"), Term::iri("o"));
    store.add(&triple, &ctx, false).unwrap();
    assert_eq!(store.term_count().unwrap(), 4);

    store.remove(&TriplePattern::from(&triple), None).unwrap();
    assert_eq!(store.count(None).unwrap(), 0);

    // The old terms keep their ids; only the new term gets a fresh one.
    let other = Triple::new(Term::iri("s"), Term::iri("p"), Term::iri("o2"));
    store.add(&other, &ctx, false).unwrap();
    assert_eq!(store.term_count().unwrap(), 5);
}
