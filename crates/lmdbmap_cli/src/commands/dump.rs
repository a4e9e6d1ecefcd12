//! Dump command implementation.

use super::{hex_encode, open_env, CommandResult};
use serde::Serialize;
use std::path::Path;

/// One raw entry for output.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EntryInfo {
    /// Hex-encoded key bytes.
    pub key: String,
    /// Hex-encoded value bytes.
    pub value: String,
}

/// Runs the dump command.
pub fn run(path: &Path, table: &str, limit: Option<usize>, format: &str) -> CommandResult {
    let entries = read_entries(path, table, limit)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            print_text_output(&entries);
        }
    }

    Ok(())
}

/// Reads up to `limit` entries of `table` in (key, value) order.
pub fn read_entries(path: &Path, table: &str, limit: Option<usize>) -> CommandResult<Vec<EntryInfo>> {
    let env = open_env(path)?;
    let handle = env.open_table(table)?;
    let txn = env.begin_read()?;

    let mut entries = Vec::new();
    for entry in handle.raw_entries(&txn)?.take(limit.unwrap_or(usize::MAX)) {
        let (key, value) = entry?;
        entries.push(EntryInfo {
            key: hex_encode(key),
            value: hex_encode(value),
        });
    }
    Ok(entries)
}

fn print_text_output(entries: &[EntryInfo]) {
    for entry in entries {
        println!("{} => {}", entry.key, entry.value);
    }
    println!("({} entries)", entries.len());
}
