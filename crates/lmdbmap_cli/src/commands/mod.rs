//! CLI command implementations.

pub mod dump;
pub mod stat;
pub mod tables;

use lmdbmap_core::{EnvConfig, Environment};
use std::path::Path;
use thiserror::Error;

/// Errors raised by the CLI itself, as opposed to the storage layer.
#[derive(Debug, Error)]
pub enum CliError {
    /// No `--path` was given for a command that needs one.
    #[error("environment path required for {0}")]
    MissingPath(&'static str),

    /// The directory does not contain an LMDB environment.
    #[error("no environment found at {0}")]
    NotAnEnvironment(String),
}

/// Result type for command implementations.
pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Opens an existing environment read-only.
pub fn open_env(path: &Path) -> CommandResult<Environment> {
    if !path.join("data.mdb").exists() {
        return Err(CliError::NotAnEnvironment(path.display().to_string()).into());
    }
    let config = EnvConfig::new()
        .read_only(true)
        .create_if_missing(false)
        .max_tables(1024);
    Ok(Environment::open(path, config)?)
}

/// Hex-encodes bytes, two lowercase digits per byte.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use lmdbmap_core::{EnvConfig, Environment, Map, Multimap};
    use tempfile::TempDir;

    /// Writes a small map and multimap, then closes the environment.
    pub fn sample_env() -> TempDir {
        let dir = TempDir::new().unwrap();
        let env = Environment::open(dir.path(), EnvConfig::default()).unwrap();
        let users: Map<u32, String> = Map::open(&env, "users").unwrap();
        let tags: Multimap<u32, u32> = Multimap::open(&env, "tags").unwrap();

        let mut txn = env.begin_write().unwrap();
        users.put(&mut txn, &1, &"ada".to_string()).unwrap();
        users.put(&mut txn, &2, &"bob".to_string()).unwrap();
        tags.insert(&mut txn, &1, &10).unwrap();
        tags.insert(&mut txn, &1, &11).unwrap();
        tags.insert(&mut txn, &2, &10).unwrap();
        txn.commit().unwrap();
        dir
    }
}
