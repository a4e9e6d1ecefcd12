//! Environment lifecycle.
//!
//! An [`Environment`] is the process's handle to the LMDB instance stored in
//! one directory. Every transaction and table handle descends from it.
//!
//! LMDB must not be opened twice for the same directory in one process, so
//! open environments are registered by canonical path and a second open fails
//! until the first handle is dropped.

use crate::config::EnvConfig;
use crate::cursor::RawEntries;
use crate::error::{CoreError, CoreResult};
use crate::stats::StorageStats;
use crate::table::TableId;
use crate::transaction::Transaction;
use crate::types::TransactionId;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Canonical paths of environments currently open in this process.
static OPEN_PATHS: Mutex<Vec<PathBuf>> = parking_lot::const_mutex(Vec::new());

/// Registration of a path in [`OPEN_PATHS`], released on drop.
#[derive(Debug)]
struct PathGuard {
    path: PathBuf,
}

impl PathGuard {
    fn acquire(path: &Path) -> CoreResult<Self> {
        let mut open = OPEN_PATHS.lock();
        if open.iter().any(|p| p == path) {
            return Err(CoreError::storage_init(
                path.display().to_string(),
                "environment already open in this process",
            ));
        }
        open.push(path.to_path_buf());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        OPEN_PATHS.lock().retain(|p| p != &self.path);
    }
}

/// Handle to an LMDB environment.
///
/// `Environment` is `Send + Sync`; share it by reference (for example with
/// [`std::thread::scope`]) to run readers on several threads.
///
/// # Example
///
/// ```rust,no_run
/// use lmdbmap_core::{EnvConfig, Environment, Map};
///
/// let env = Environment::open("/tmp/lmdbmap-demo", EnvConfig::default())?;
/// let scores: Map<String, u32> = Map::open(&env, "scores")?;
///
/// let mut txn = env.begin_write()?;
/// scores.put(&mut txn, &"alice".to_string(), &10)?;
/// txn.commit()?;
///
/// let txn = env.begin_read()?;
/// assert_eq!(scores.get(&txn, &"alice".to_string())?, Some(10));
/// # Ok::<(), lmdbmap_core::CoreError>(())
/// ```
pub struct Environment {
    // Declared before `_guard` so the engine closes before the path is
    // released for reuse.
    inner: lmdb::Environment,
    path: PathBuf,
    config: EnvConfig,
    next_txn_id: AtomicU64,
    _guard: PathGuard,
}

impl Environment {
    /// Opens the environment stored in `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StorageInit`] if the directory cannot be created
    /// or opened, the engine rejects the configuration, or the directory is
    /// already open in this process.
    pub fn open(path: impl AsRef<Path>, config: EnvConfig) -> CoreResult<Self> {
        let path = path.as_ref();

        if config.create_if_missing && !config.read_only {
            fs::create_dir_all(path).map_err(|e| CoreError::storage_io(path, &e))?;
        }
        let path = path
            .canonicalize()
            .map_err(|e| CoreError::storage_io(path, &e))?;
        if !path.is_dir() {
            return Err(CoreError::storage_init(
                path.display().to_string(),
                "not a directory",
            ));
        }

        let guard = PathGuard::acquire(&path)?;

        let inner = lmdb::Environment::new()
            .set_flags(config.environment_flags())
            .set_map_size(config.map_size)
            .set_max_dbs(config.max_tables)
            .set_max_readers(config.max_readers)
            .open(&path)
            .map_err(|e| CoreError::storage_init(path.display().to_string(), e.to_string()))?;

        info!(
            path = %path.display(),
            map_size = config.map_size,
            max_tables = config.max_tables,
            read_only = config.read_only,
            "opened environment"
        );

        Ok(Self {
            inner,
            path,
            config,
            next_txn_id: AtomicU64::new(1),
            _guard: guard,
        })
    }

    /// Returns the canonical storage directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration the environment was opened with.
    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Begins a read-only transaction on a snapshot of the committed state.
    ///
    /// Unless the environment was opened with `no_tls`, a thread must not
    /// hold more than one transaction at a time.
    pub fn begin_read(&self) -> CoreResult<Transaction<'_>> {
        Transaction::begin(self, true)
    }

    /// Begins a read-write transaction.
    ///
    /// Blocks while another write transaction is active.
    pub fn begin_write(&self) -> CoreResult<Transaction<'_>> {
        Transaction::begin(self, false)
    }

    /// Flushes buffers to disk. With `force`, flushes even when the
    /// environment was opened with `no_sync`.
    pub fn sync(&self, force: bool) -> CoreResult<()> {
        self.inner.sync(force)?;
        Ok(())
    }

    /// Returns B-tree statistics for the environment's main table.
    pub fn stat(&self) -> CoreResult<StorageStats> {
        Ok(self.inner.stat()?.into())
    }

    /// Opens an existing table without knowing its kind.
    ///
    /// Used by tooling that inspects raw entries. Fails with
    /// [`CoreError::StorageInit`] if no table of that name exists.
    pub fn open_table(&self, name: &str) -> CoreResult<TableId> {
        TableId::open_existing(self, name)
    }

    /// Returns the names of all named tables, in byte order.
    ///
    /// Runs its own read transaction, so the calling thread must not hold
    /// one unless the environment was opened with `no_tls`.
    pub fn table_names(&self) -> CoreResult<Vec<String>> {
        let main = self.inner.open_db(None)?;
        let txn = self.begin_read()?;
        let names = RawEntries::open(&txn, main)?
            .map(|entry| entry.map(|(key, _)| String::from_utf8_lossy(key).into_owned()))
            .collect::<CoreResult<Vec<_>>>()?;
        txn.abort();
        Ok(names)
    }

    pub(crate) fn lmdb(&self) -> &lmdb::Environment {
        &self.inner
    }

    pub(crate) fn next_transaction_id(&self) -> TransactionId {
        TransactionId::new(self.next_txn_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        info!(
            path = %self.path.display(),
            transactions = self.next_txn_id.load(Ordering::Relaxed) - 1,
            "closing environment"
        );
    }
}
