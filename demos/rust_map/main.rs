//! Basic lmdbmap Example - Ordered Map
//!
//! This example demonstrates:
//! - Opening an environment and a named map table
//! - Inserting and overwriting entries in a write transaction
//! - Iterating in key order and seeking with bounds
//! - Storing structured values through CBOR
//!
//! Run with: cargo run -p rust_map

use lmdbmap_core::{Cbor, EnvConfig, Environment, Map};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Book {
    title: String,
    year: u16,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let env = Environment::open(dir.path(), EnvConfig::new())?;

    let scores: Map<String, u32> = Map::open(&env, "scores")?;
    let books: Map<u64, Cbor<Book>> = Map::open(&env, "books")?;

    let mut txn = env.begin_write()?;
    scores.insert(&mut txn, &"alice".to_string(), &42)?;
    scores.insert(&mut txn, &"bob".to_string(), &17)?;
    // Insert never overwrites; put does.
    let inserted = scores.insert(&mut txn, &"alice".to_string(), &0)?;
    println!("second insert of alice stored: {inserted}");
    scores.put(&mut txn, &"carol".to_string(), &99)?;

    for (isbn, title, year) in [
        (9780131103628, "The C Programming Language", 1978),
        (9780262033848, "Introduction to Algorithms", 1990),
        (9781593278281, "The Rust Programming Language", 2018),
    ] {
        let book = Book {
            title: title.to_string(),
            year,
        };
        books.put(&mut txn, &isbn, &Cbor(book))?;
    }
    txn.commit()?;

    let txn = env.begin_read()?;

    println!("\nScores in key order:");
    for entry in scores.begin(&txn)? {
        let (name, score) = entry?;
        println!("  {name}: {score}");
    }

    println!("\nBooks from ISBN 9780200000000 onwards:");
    for entry in books.lower_bound(&txn, &9780200000000)? {
        let (isbn, book) = entry?;
        println!("  {isbn}: {} ({})", book.0.title, book.0.year);
    }

    println!("\n{} scores, {} books", scores.len(&txn)?, books.len(&txn)?);
    txn.abort();

    Ok(())
}
