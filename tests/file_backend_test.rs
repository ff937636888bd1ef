//! File Backend Integration Tests
//!
//! Stores opened on a directory must survive close and reopen, refuse to open
//! a missing store without `create`, and leave nothing behind once destroyed.

use std::fs;
use std::path::{Path, PathBuf};

use quadstore::indexing::dictionary::TERM_COUNTER_KEY;
use quadstore::indexing::Rotation;
use quadstore::store::TABLE_NAMES;
use quadstore::{
    FileBackend, KeyValueTable, QuadStore, QuadStoreError, Result, StorageBackend, StoreConfig,
    Term, Triple, TriplePattern,
};
use tempfile::TempDir;

fn config(dir: &TempDir, create: bool) -> StoreConfig {
    StoreConfig { path: dir.path().join("store"), create, sync_writes: false }
}

/// Makes the next save of a table fail by occupying its temp file path with a directory.
fn block_save(store_dir: &Path, file_stem: &str) -> PathBuf {
    let tmp = store_dir.join(format!("{}.tbl.tmp", file_stem));
    fs::create_dir(&tmp).unwrap();
    tmp
}

fn xyz() -> (Triple, Term) {
    (
        Triple::new(Term::iri("http://example.org/x"), Term::iri("http://example.org/y"), Term::literal("z")),
        Term::iri("http://example.org/h"),
    )
}

fn all_rows(store: &QuadStore<FileBackend>) -> Vec<(Triple, Vec<Term>)> {
    store.triples(&TriplePattern::any(), None).unwrap().collect::<Result<_>>().unwrap()
}

fn sample() -> Vec<(Triple, Term)> {
    let likes = Term::iri("http://example.org/likes");
    vec![
        (
            Triple::new(Term::iri("http://example.org/alice"), likes.clone(), Term::literal("pizza")),
            Term::iri("http://example.org/ctx1"),
        ),
        (
            Triple::new(Term::iri("http://example.org/alice"), likes.clone(), Term::literal("pizza")),
            Term::iri("http://example.org/ctx2"),
        ),
        (
            Triple::new(Term::iri("http://example.org/bob"), likes, Term::lang_literal("fromage", "fr")),
            Term::iri("http://example.org/ctx1"),
        ),
    ]
}

#[test]
fn test_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = QuadStore::<FileBackend>::open_with_config(Some("disk"), &config(&dir, true)).unwrap();
        for (triple, context) in sample() {
            store.add(&triple, &context, false).unwrap();
        }
        store.bind("ex", "http://example.org/").unwrap();
        store.close().unwrap();
    }

    let store = QuadStore::<FileBackend>::open_with_config(Some("disk"), &config(&dir, false)).unwrap();
    assert_eq!(store.count(None).unwrap(), 2);
    assert_eq!(store.count(Some(&Term::iri("http://example.org/ctx1"))).unwrap(), 2);
    assert_eq!(store.namespace("ex").unwrap().as_deref(), Some("http://example.org/"));

    let quads = sample();
    let (alice_likes_pizza, _) = &quads[0];
    let contexts: Vec<Term> = store.contexts(Some(alice_likes_pizza)).unwrap().collect::<Result<_>>().unwrap();
    assert_eq!(contexts.len(), 2);
    store.verify_indices().unwrap();
}

#[test]
fn test_dropping_an_open_store_persists_it() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, true)).unwrap();
        let quads = sample();
        let (triple, context) = &quads[2];
        store.add(triple, context, false).unwrap();
    }

    let store = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, false)).unwrap();
    assert_eq!(store.len(None).unwrap(), 1);
}

#[test]
fn test_term_ids_continue_after_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, true)).unwrap();
        let quads = sample();
        let (triple, context) = &quads[0];
        store.add(triple, context, false).unwrap();
        assert_eq!(store.term_count().unwrap(), 4);
    }

    let mut store = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, false)).unwrap();
    assert_eq!(store.term_count().unwrap(), 4);
    let quads = sample();
    let (triple, context) = &quads[2];
    store.add(triple, context, false).unwrap();
    assert_eq!(store.term_count().unwrap(), 6);
}

#[test]
fn test_missing_store_without_create_is_not_found() {
    let dir = TempDir::new().unwrap();
    let result = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, false));
    assert!(matches!(result, Err(QuadStoreError::NotFound(_))));
}

#[test]
fn test_destroy_removes_table_files() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, true);
    let mut store = QuadStore::<FileBackend>::open_with_config(None, &cfg).unwrap();
    for (triple, context) in sample() {
        store.add(&triple, &context, false).unwrap();
    }

    let backend = store.backend().unwrap().clone();
    for name in TABLE_NAMES {
        assert!(backend.exists(name).unwrap(), "table {} missing", name);
    }

    store.destroy().unwrap();
    assert!(store.is_closed());
    for name in TABLE_NAMES {
        assert!(!backend.exists(name).unwrap(), "table {} left behind", name);
    }

    let reopened = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, false));
    assert!(matches!(reopened, Err(QuadStoreError::NotFound(_))));
}

#[test]
fn test_sync_writes_persist_each_operation() {
    let dir = TempDir::new().unwrap();
    let cfg = StoreConfig { sync_writes: true, ..config(&dir, true) };
    let mut store = QuadStore::<FileBackend>::open_with_config(None, &cfg).unwrap();
    let quads = sample();
    let (triple, context) = &quads[0];
    store.add(triple, context, false).unwrap();

    // Read the files back while the store is still open.
    let mut reader = FileBackend::new(&cfg.path);
    let spo = reader.open_table(Rotation::Spo.table_name()).unwrap();
    assert_eq!(spo.len().unwrap(), 2);
    let k2i = reader.open_table("k2i").unwrap();
    assert_eq!(k2i.get(TERM_COUNTER_KEY).unwrap(), Some("4".to_string()));

    store.remove(&TriplePattern::from(triple), None).unwrap();
    let spo = FileBackend::new(&cfg.path).open_table(Rotation::Spo.table_name()).unwrap();
    assert!(spo.is_empty().unwrap());
}

#[test]
fn test_failed_index_save_does_not_reuse_ids() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, true);
    let mut store = QuadStore::<FileBackend>::open_with_config(None, &cfg).unwrap();
    let quads = sample();
    let (triple, context) = &quads[0];
    store.add(triple, context, false).unwrap();

    let blocker = block_save(&cfg.path, "c%5es%5ep%5eo%5e");
    assert!(store.close().is_err());
    assert!(store.is_closed());
    fs::remove_dir(blocker).unwrap();

    // The dictionary was saved before the indices, so the old ids stay taken.
    let mut store = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, false)).unwrap();
    assert_eq!(store.term_count().unwrap(), 4);
    assert_eq!(store.len(None).unwrap(), 0);

    let (triple, context) = xyz();
    store.add(&triple, &context, false).unwrap();
    assert_eq!(store.term_count().unwrap(), 8);
    assert_eq!(all_rows(&store), vec![(triple, vec![context])]);
    store.verify_indices().unwrap();
}

#[test]
fn test_failed_dictionary_save_keeps_index_rows_off_disk() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, true);
    let mut store = QuadStore::<FileBackend>::open_with_config(None, &cfg).unwrap();
    let quads = sample();
    let (triple, context) = &quads[0];
    store.add(triple, context, false).unwrap();

    let blocker = block_save(&cfg.path, "k2i");
    assert!(store.close().is_err());
    drop(store);
    fs::remove_dir(blocker).unwrap();

    // No row may outlive the ids it refers to and come back as some other term.
    let mut store = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, false)).unwrap();
    assert_eq!(store.len(None).unwrap(), 0);

    let (triple, context) = xyz();
    store.add(&triple, &context, false).unwrap();
    assert_eq!(all_rows(&store), vec![(triple, vec![context])]);
    let contexts: Vec<Term> = store.contexts(None).unwrap().collect::<Result<_>>().unwrap();
    assert_eq!(contexts, vec![Term::iri("http://example.org/h")]);
}

#[test]
fn test_removals_persist() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, true)).unwrap();
        for (triple, context) in sample() {
            store.add(&triple, &context, false).unwrap();
        }
        let pattern = TriplePattern::new(Some(Term::iri("http://example.org/alice")), None, None);
        assert_eq!(store.remove(&pattern, Some(&Term::iri("http://example.org/ctx1"))).unwrap(), 1);
        store.close().unwrap();
    }

    let store = QuadStore::<FileBackend>::open_with_config(None, &config(&dir, false)).unwrap();
    let quads = sample();
    let alice = &quads[0].0;
    assert!(store.contains(alice, None).unwrap());
    assert!(!store.contains(alice, Some(&Term::iri("http://example.org/ctx1"))).unwrap());
    assert!(store.contains(alice, Some(&Term::iri("http://example.org/ctx2"))).unwrap());
    store.verify_indices().unwrap();
}
