//! Stat command implementation.

use super::{open_env, CommandResult};
use lmdbmap_core::StorageStats;
use serde::Serialize;
use std::path::Path;

/// B-tree statistics for output.
#[derive(Debug, Serialize)]
pub struct StatInfo {
    /// What the statistics describe: `environment` or a table name.
    pub target: String,
    /// Page size in bytes.
    pub page_size: u32,
    /// B-tree depth.
    pub depth: u32,
    /// Internal pages.
    pub branch_pages: usize,
    /// Leaf pages.
    pub leaf_pages: usize,
    /// Overflow pages.
    pub overflow_pages: usize,
    /// Entries.
    pub entries: usize,
    /// Approximate bytes in use.
    pub used_bytes: u64,
}

impl StatInfo {
    fn new(target: impl Into<String>, stats: StorageStats) -> Self {
        Self {
            target: target.into(),
            page_size: stats.page_size,
            depth: stats.depth,
            branch_pages: stats.branch_pages,
            leaf_pages: stats.leaf_pages,
            overflow_pages: stats.overflow_pages,
            entries: stats.entries,
            used_bytes: stats.used_bytes(),
        }
    }
}

/// Runs the stat command.
pub fn run(path: &Path, table: Option<&str>, format: &str) -> CommandResult {
    let info = collect(path, table)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        _ => {
            print_text_output(&info);
        }
    }

    Ok(())
}

/// Reads statistics for the environment, or for `table` when given.
pub fn collect(path: &Path, table: Option<&str>) -> CommandResult<StatInfo> {
    let env = open_env(path)?;
    match table {
        Some(name) => {
            let handle = env.open_table(name)?;
            let txn = env.begin_read()?;
            let stats = handle.stat(&txn)?;
            Ok(StatInfo::new(name, stats))
        }
        None => Ok(StatInfo::new("environment", env.stat()?)),
    }
}

fn print_text_output(info: &StatInfo) {
    println!("Statistics for {}", info.target);
    println!("  Page size:      {} bytes", info.page_size);
    println!("  Depth:          {}", info.depth);
    println!("  Branch pages:   {}", info.branch_pages);
    println!("  Leaf pages:     {}", info.leaf_pages);
    println!("  Overflow pages: {}", info.overflow_pages);
    println!("  Entries:        {}", info.entries);
    println!("  Used:           {} bytes", info.used_bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::sample_env;

    #[test]
    fn table_stat_counts_pairs() {
        let dir = sample_env();
        let info = collect(dir.path(), Some("tags")).unwrap();
        assert_eq!(info.entries, 3);
        assert!(info.page_size > 0);
    }

    #[test]
    fn environment_stat_counts_tables() {
        let dir = sample_env();
        let info = collect(dir.path(), None).unwrap();
        assert_eq!(info.target, "environment");
        assert_eq!(info.entries, 2);
    }

    #[test]
    fn unknown_table_fails() {
        let dir = sample_env();
        assert!(collect(dir.path(), Some("missing")).is_err());
    }
}
