//! lmdbmap Multimap Example - Tag Index
//!
//! This example demonstrates:
//! - Storing several values under one key
//! - Reading all values of a key in sorted order
//! - Walking one key's values with `equal_range`
//! - Removing a single pair or a whole key
//!
//! Run with: cargo run -p rust_multimap

use lmdbmap_core::{EnvConfig, Environment, Multimap};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let env = Environment::open(dir.path(), EnvConfig::new())?;

    // tag -> post id
    let tags: Multimap<String, u64> = Multimap::open(&env, "tags")?;

    let mut txn = env.begin_write()?;
    for (tag, post) in [
        ("rust", 7),
        ("rust", 3),
        ("lmdb", 3),
        ("rust", 12),
        ("storage", 12),
        ("lmdb", 5),
    ] {
        tags.insert(&mut txn, &tag.to_string(), &post)?;
    }
    // A repeated pair is not stored twice.
    let again = tags.insert(&mut txn, &"rust".to_string(), &7)?;
    println!("rust -> 7 stored again: {again}");
    txn.commit()?;

    let txn = env.begin_read()?;
    let rust = "rust".to_string();
    println!("posts tagged rust: {:?}", tags.get(&txn, &rust)?);
    println!("posts tagged lmdb: {}", tags.count(&txn, &"lmdb".to_string())?);

    {
        let (mut it, end) = tags.equal_range(&txn, &rust)?;
        print!("walking rust:");
        while it != end {
            if let Some(post) = it.value()? {
                print!(" {post}");
            }
            it.advance()?;
        }
        println!();
    }
    txn.abort();

    let mut txn = env.begin_write()?;
    tags.erase_pair(&mut txn, &rust, &3)?;
    tags.erase(&mut txn, &"storage".to_string())?;
    txn.commit()?;

    let txn = env.begin_read()?;
    println!("\nAll pairs after removals:");
    for entry in tags.begin(&txn)? {
        let (tag, post) = entry?;
        println!("  {tag} -> {post}");
    }
    Ok(())
}
