//! Tables command implementation.

use super::{open_env, CommandResult};
use serde::Serialize;
use std::path::Path;

/// One named table.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// `map` or `multimap`.
    pub kind: String,
    /// Number of entries (pairs for a multimap).
    pub entries: usize,
}

/// Runs the tables command.
pub fn run(path: &Path, format: &str) -> CommandResult {
    let tables = list_tables(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&tables)?);
        }
        _ => {
            print_text_output(&tables);
        }
    }

    Ok(())
}

/// Collects every named table with its kind and size.
pub fn list_tables(path: &Path) -> CommandResult<Vec<TableInfo>> {
    let env = open_env(path)?;

    // Tables must be opened before this thread starts a read transaction.
    let handles = env
        .table_names()?
        .iter()
        .map(|name| env.open_table(name))
        .collect::<Result<Vec<_>, _>>()?;

    let txn = env.begin_read()?;
    let mut tables = Vec::with_capacity(handles.len());
    for table in &handles {
        tables.push(TableInfo {
            name: table.name().to_string(),
            kind: table.kind().to_string(),
            entries: table.stat(&txn)?.entries,
        });
    }
    Ok(tables)
}

fn print_text_output(tables: &[TableInfo]) {
    if tables.is_empty() {
        println!("(no tables)");
        return;
    }
    for table in tables {
        println!("{:<32} {:<9} {:>10}", table.name, table.kind, table.entries);
    }
}
