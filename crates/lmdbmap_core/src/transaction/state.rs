//! Transaction handle.

use crate::environment::Environment;
use crate::error::{CoreError, CoreResult};
use crate::types::TransactionId;
use lmdb::{Database, RoCursor, RoTransaction, RwTransaction, Transaction as _};
use tracing::{debug, warn};

/// Engine transaction, by access mode.
enum TxnKind<'env> {
    ReadOnly(RoTransaction<'env>),
    ReadWrite(RwTransaction<'env>),
}

/// An active transaction.
///
/// Table handles take the transaction explicitly on every call: reads take
/// `&Transaction`, writes take `&mut Transaction`. Iterators borrow the
/// transaction, so no iterator survives a commit or abort, and no write can
/// happen while an iterator of the same transaction is alive.
pub struct Transaction<'env> {
    id: TransactionId,
    env: &'env Environment,
    kind: TxnKind<'env>,
}

impl<'env> Transaction<'env> {
    /// Begins a transaction.
    ///
    /// Read-write transactions block while another writer is active.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TransactionBegin`] if the engine cannot allocate a
    /// transaction, for example when the reader table is full.
    pub fn begin(env: &'env Environment, read_only: bool) -> CoreResult<Self> {
        let lmdb = env.lmdb();
        let kind = if read_only {
            lmdb.begin_ro_txn().map(TxnKind::ReadOnly)
        } else {
            lmdb.begin_rw_txn().map(TxnKind::ReadWrite)
        }
        .map_err(|source| CoreError::TransactionBegin { read_only, source })?;

        let id = env.next_transaction_id();
        debug!(txn = %id, read_only, "began transaction");
        Ok(Self { id, env, kind })
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns true if this is a read-only transaction.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self.kind, TxnKind::ReadOnly(_))
    }

    /// Returns the environment this transaction belongs to.
    #[must_use]
    pub fn environment(&self) -> &'env Environment {
        self.env
    }

    /// Commits the transaction.
    ///
    /// The handle is consumed whatever the outcome. Committing a read-only
    /// transaction releases its snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Commit`], classified as retryable or structural.
    pub fn commit(self) -> CoreResult<()> {
        let id = self.id;
        let result = match self.kind {
            TxnKind::ReadOnly(txn) => txn.commit(),
            TxnKind::ReadWrite(txn) => txn.commit(),
        };
        match result {
            Ok(()) => {
                debug!(txn = %id, "committed transaction");
                Ok(())
            }
            Err(source) => {
                let err = CoreError::commit(source);
                warn!(txn = %id, error = %err, "commit failed");
                Err(err)
            }
        }
    }

    /// Aborts the transaction, discarding its writes.
    pub fn abort(self) {
        debug!(txn = %self.id, "aborted transaction");
        match self.kind {
            TxnKind::ReadOnly(txn) => txn.abort(),
            TxnKind::ReadWrite(txn) => txn.abort(),
        }
    }

    /// Looks up the first value stored under `key`.
    pub(crate) fn get(&self, db: Database, key: &[u8]) -> CoreResult<Option<&[u8]>> {
        let result = match &self.kind {
            TxnKind::ReadOnly(txn) => txn.get(db, &key),
            TxnKind::ReadWrite(txn) => txn.get(db, &key),
        };
        match result {
            Ok(value) => Ok(Some(value)),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Opens a read cursor valid for the lifetime of this borrow.
    pub(crate) fn open_cursor(&self, db: Database) -> CoreResult<RoCursor<'_>> {
        let cursor = match &self.kind {
            TxnKind::ReadOnly(txn) => txn.open_ro_cursor(db),
            TxnKind::ReadWrite(txn) => txn.open_ro_cursor(db),
        }?;
        Ok(cursor)
    }

    /// Returns B-tree statistics for one table as seen by this transaction.
    pub(crate) fn stat(&self, db: Database) -> CoreResult<lmdb::Stat> {
        let stat = match &self.kind {
            TxnKind::ReadOnly(txn) => txn.stat(db),
            TxnKind::ReadWrite(txn) => txn.stat(db),
        }?;
        Ok(stat)
    }

    /// Returns the engine write transaction, or an error for readers.
    pub(crate) fn writer(&mut self) -> CoreResult<&mut RwTransaction<'env>> {
        match &mut self.kind {
            TxnKind::ReadWrite(txn) => Ok(txn),
            TxnKind::ReadOnly(_) => Err(CoreError::ReadOnlyTransaction),
        }
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("read_only", &self.is_read_only())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;
    use tempfile::tempdir;

    #[test]
    fn read_transaction_is_read_only() {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), EnvConfig::default()).unwrap();
        let txn = env.begin_read().unwrap();
        assert!(txn.is_read_only());
        txn.commit().unwrap();
    }

    #[test]
    fn writer_rejected_for_reader() {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), EnvConfig::default()).unwrap();
        let mut txn = env.begin_read().unwrap();
        assert!(matches!(txn.writer(), Err(CoreError::ReadOnlyTransaction)));
    }

    #[test]
    fn write_transaction_commit_and_abort() {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), EnvConfig::default()).unwrap();

        let mut txn = env.begin_write().unwrap();
        assert!(!txn.is_read_only());
        assert!(txn.writer().is_ok());
        txn.commit().unwrap();

        let txn = Transaction::begin(&env, false).unwrap();
        txn.abort();
    }

    #[test]
    fn write_in_read_only_environment_fails_to_begin() {
        let dir = tempdir().unwrap();
        drop(Environment::open(dir.path(), EnvConfig::default()).unwrap());

        let env = Environment::open(dir.path(), EnvConfig::new().read_only(true)).unwrap();
        let err = env.begin_write().unwrap_err();
        assert!(matches!(
            err,
            CoreError::TransactionBegin {
                read_only: false,
                ..
            }
        ));
    }
}
