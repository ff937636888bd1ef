//! Quadstore - load a synthetic dataset and time every pattern shape.
//!
//! Usage:
//!   quadstore --records 100000 --contexts 4 --memory
//!   quadstore --records 100000 --path data/quadstore --sync-writes

use clap::Parser;
use quadstore::{
    FileBackend, MemoryBackend, QuadStore, StorageBackend, StoreConfig, Term, Triple,
    TriplePattern,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "quadstore")]
#[command(about = "Quadstore - load synthetic quads and benchmark pattern queries")]
struct Args {
    /// Number of quads to generate
    #[arg(short, long, default_value = "100000")]
    records: u64,

    /// Number of contexts the quads are spread over
    #[arg(short, long, default_value = "4")]
    contexts: u64,

    /// Directory for the file-backed store
    #[arg(long, default_value = "data/quadstore")]
    path: PathBuf,

    /// Save the touched tables after every operation
    #[arg(long)]
    sync_writes: bool,

    /// Keep the store in memory instead of on disk
    #[arg(long)]
    memory: bool,
}

fn subject(i: u64) -> Term {
    Term::iri(&format!("http://example.org/subject/{}", i % 1000))
}

fn predicate(i: u64) -> Term {
    Term::iri(&format!("http://example.org/predicate/{}", i % 50))
}

fn object(i: u64) -> Term {
    Term::literal(&format!("value-{}", i % 2000))
}

fn context(i: u64, contexts: u64) -> Term {
    Term::iri(&format!("http://example.org/graph/{}", i % contexts.max(1)))
}

fn load<B: StorageBackend>(store: &mut QuadStore<B>, args: &Args) -> quadstore::Result<()> {
    println!("Loading {} quads over {} contexts", args.records, args.contexts);
    let start = Instant::now();
    for i in 0..args.records {
        let triple = Triple::new(subject(i), predicate(i), object(i));
        store.add(&triple, &context(i, args.contexts), false)?;
    }
    let elapsed = start.elapsed();
    println!(
        "Loaded in {:.3} ms ({:.0} quads/sec), {} distinct triples, {} terms",
        elapsed.as_secs_f64() * 1000.0,
        args.records as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        store.count(None)?,
        store.term_count()?
    );
    Ok(())
}

fn benchmark_patterns<B: StorageBackend>(store: &QuadStore<B>, args: &Args) -> quadstore::Result<()> {
    println!("\nPattern Query Benchmark");
    let pivot = 42;

    for mask in 0..8u8 {
        let pattern = TriplePattern::new(
            (mask & 1 != 0).then(|| subject(pivot)),
            (mask & 2 != 0).then(|| predicate(pivot)),
            (mask & 4 != 0).then(|| object(pivot)),
        );
        let label = format!(
            "({}, {}, {})",
            if mask & 1 != 0 { "s" } else { "?" },
            if mask & 2 != 0 { "p" } else { "?" },
            if mask & 4 != 0 { "o" } else { "?" }
        );

        let start = Instant::now();
        let count = store.triples(&pattern, None)?.count();
        println!("{:<10} {:>8} matches in {:.3} ms", label, count, start.elapsed().as_secs_f64() * 1000.0);
    }

    let graph = context(pivot, args.contexts);
    let start = Instant::now();
    let count = store.triples(&TriplePattern::any(), Some(&graph))?.count();
    println!(
        "{:<10} {:>8} matches in {:.3} ms ({})",
        "context",
        count,
        start.elapsed().as_secs_f64() * 1000.0,
        graph
    );
    Ok(())
}

fn run<B: StorageBackend>(store: &mut QuadStore<B>, args: &Args) -> quadstore::Result<()> {
    load(store, args)?;
    benchmark_patterns(store, args)?;

    let start = Instant::now();
    store.verify_indices()?;
    println!("\nIndex consistency check passed in {:.3} ms", start.elapsed().as_secs_f64() * 1000.0);
    store.close()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Quadstore");
    println!("=========\n");

    if args.memory {
        let mut store = QuadStore::new(Some("quadstore-cli"));
        store.open(MemoryBackend::new(), true)?;
        run(&mut store, &args)?;
    } else {
        let config = StoreConfig { path: args.path.clone(), create: true, sync_writes: args.sync_writes };
        let mut store = QuadStore::<FileBackend>::open_with_config(Some("quadstore-cli"), &config)?;
        run(&mut store, &args)?;
        println!("Store persisted under {}", config.path.display());
    }

    Ok(())
}
