//! Table identity and byte-level table operations.
//!
//! [`TableId`] names one LMDB database inside an environment together with
//! its kind. Whether a table allows duplicate keys is fixed when it is
//! created; reopening it as the other kind fails.

use crate::cursor::RawEntries;
use crate::environment::Environment;
use crate::error::{CoreError, CoreResult};
use crate::stats::StorageStats;
use crate::transaction::Transaction;
use crate::types::TableKind;
use lmdb::{Database, DatabaseFlags, WriteFlags};
use lmdbmap_codec::CodecError;
use tracing::debug;

/// Identifier of an open table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableId {
    name: String,
    kind: TableKind,
    db: Database,
}

impl TableId {
    /// Opens `name`, creating it as `kind` if it doesn't exist.
    ///
    /// Creation runs its own write transaction, so the calling thread must
    /// not hold a transaction.
    pub(crate) fn open(env: &Environment, name: &str, kind: TableKind) -> CoreResult<Self> {
        let lmdb = env.lmdb();
        let db = if env.config().read_only {
            lmdb.open_db(Some(name))
        } else {
            let flags = if kind.allows_duplicates() {
                DatabaseFlags::DUP_SORT
            } else {
                DatabaseFlags::empty()
            };
            lmdb.create_db(Some(name), flags)
        }
        .map_err(|e| open_error(name, e))?;

        let table = Self::from_db(env, name, db)?;
        if table.kind != kind {
            return Err(CoreError::storage_init(
                name,
                format!("table exists as a {}, not a {kind}", table.kind),
            ));
        }

        debug!(table = name, kind = %kind, "opened table");
        Ok(table)
    }

    /// Opens an existing table of either kind.
    pub(crate) fn open_existing(env: &Environment, name: &str) -> CoreResult<Self> {
        let db = env
            .lmdb()
            .open_db(Some(name))
            .map_err(|e| open_error(name, e))?;
        Self::from_db(env, name, db)
    }

    fn from_db(env: &Environment, name: &str, db: Database) -> CoreResult<Self> {
        let flags = env
            .lmdb()
            .get_db_flags(db)
            .map_err(|e| CoreError::storage_init(name, e.to_string()))?;
        let kind = if flags.contains(DatabaseFlags::DUP_SORT) {
            TableKind::Multimap
        } else {
            TableKind::Map
        };
        Ok(Self {
            name: name.to_string(),
            kind,
            db,
        })
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table kind.
    #[must_use]
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Returns B-tree statistics for this table as seen by `txn`.
    pub fn stat(&self, txn: &Transaction<'_>) -> CoreResult<StorageStats> {
        Ok(txn.stat(self.db)?.into())
    }

    /// Iterates over the raw (key, value) bytes of every entry in order.
    pub fn raw_entries<'txn>(&self, txn: &'txn Transaction<'_>) -> CoreResult<RawEntries<'txn>> {
        RawEntries::open(txn, self.db)
    }

    pub(crate) fn db(&self) -> Database {
        self.db
    }

    /// Number of entries; pairs for a multimap.
    pub(crate) fn entries(&self, txn: &Transaction<'_>) -> CoreResult<usize> {
        Ok(txn.stat(self.db)?.entries())
    }

    /// Stores an entry. Returns false when `flags` forbid the write because
    /// the key (or, for a multimap, the exact pair) already exists.
    ///
    /// LMDB cannot store an empty key, and loses empty duplicate values, so
    /// both are rejected as encoding errors.
    pub(crate) fn put(
        &self,
        txn: &mut Transaction<'_>,
        key: &[u8],
        value: &[u8],
        flags: WriteFlags,
    ) -> CoreResult<bool> {
        if key.is_empty() {
            return Err(CodecError::encoding_failed("key encodes to zero bytes").into());
        }
        if value.is_empty() && self.kind.allows_duplicates() {
            return Err(
                CodecError::encoding_failed("multimap value encodes to zero bytes").into(),
            );
        }
        match txn.writer()?.put(self.db, &key, &value, flags) {
            Ok(()) => Ok(true),
            Err(lmdb::Error::KeyExist) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes all values under `key`, or only `value` when given. Returns
    /// whether anything was removed.
    pub(crate) fn delete(
        &self,
        txn: &mut Transaction<'_>,
        key: &[u8],
        value: Option<&[u8]>,
    ) -> CoreResult<bool> {
        match txn.writer()?.del(self.db, &key, value) {
            Ok(()) => Ok(true),
            Err(lmdb::Error::NotFound) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every entry, keeping the table.
    pub(crate) fn clear(&self, txn: &mut Transaction<'_>) -> CoreResult<()> {
        txn.writer()?.clear_db(self.db)?;
        Ok(())
    }
}

fn open_error(name: &str, err: lmdb::Error) -> CoreError {
    let message = match err {
        lmdb::Error::NotFound => "table does not exist".to_string(),
        lmdb::Error::Incompatible => "table exists with incompatible flags".to_string(),
        lmdb::Error::DbsFull => "maximum number of tables reached".to_string(),
        other => other.to_string(),
    };
    CoreError::storage_init(name, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;
    use tempfile::tempdir;

    fn env() -> (tempfile::TempDir, Environment) {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), EnvConfig::default()).unwrap();
        (dir, env)
    }

    #[test]
    fn open_creates_table_of_requested_kind() {
        let (_dir, env) = env();
        let table = TableId::open(&env, "pairs", TableKind::Multimap).unwrap();
        assert_eq!(table.name(), "pairs");
        assert_eq!(table.kind(), TableKind::Multimap);
    }

    #[test]
    fn reopen_with_other_kind_fails() {
        let (_dir, env) = env();
        TableId::open(&env, "users", TableKind::Map).unwrap();
        let err = TableId::open(&env, "users", TableKind::Multimap).unwrap_err();
        assert!(matches!(err, CoreError::StorageInit { .. }));
    }

    #[test]
    fn open_existing_missing_table_fails() {
        let (_dir, env) = env();
        let err = env.open_table("nope").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn too_many_tables() {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), EnvConfig::new().max_tables(1)).unwrap();
        TableId::open(&env, "one", TableKind::Map).unwrap();
        assert!(TableId::open(&env, "two", TableKind::Map).is_err());
    }

    #[test]
    fn put_delete_and_clear_bytes() {
        let (_dir, env) = env();
        let table = TableId::open(&env, "raw", TableKind::Map).unwrap();

        let mut txn = env.begin_write().unwrap();
        assert!(table.put(&mut txn, b"a", b"1", WriteFlags::NO_OVERWRITE).unwrap());
        assert!(!table.put(&mut txn, b"a", b"2", WriteFlags::NO_OVERWRITE).unwrap());
        assert!(table.put(&mut txn, b"b", b"2", WriteFlags::empty()).unwrap());
        assert_eq!(table.entries(&txn).unwrap(), 2);
        assert_eq!(txn.get(table.db(), b"a").unwrap(), Some(&b"1"[..]));

        assert!(table.delete(&mut txn, b"a", None).unwrap());
        assert!(!table.delete(&mut txn, b"a", None).unwrap());

        table.clear(&mut txn).unwrap();
        assert_eq!(table.stat(&txn).unwrap().entries, 0);
        txn.commit().unwrap();
    }

    #[test]
    fn empty_encodings_are_rejected_before_the_engine() {
        let (_dir, env) = env();
        let map = TableId::open(&env, "raw", TableKind::Map).unwrap();
        let multimap = TableId::open(&env, "dups", TableKind::Multimap).unwrap();

        let mut txn = env.begin_write().unwrap();
        let err = map.put(&mut txn, b"", b"v", WriteFlags::empty()).unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::EncodingFailed { .. })));
        assert!(map.put(&mut txn, b"k", b"", WriteFlags::empty()).unwrap());

        let err = multimap.put(&mut txn, b"k", b"", WriteFlags::NO_DUP_DATA).unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::EncodingFailed { .. })));
        assert_eq!(multimap.entries(&txn).unwrap(), 0);
        txn.commit().unwrap();
    }

    #[test]
    fn raw_entries_in_order() {
        let (_dir, env) = env();
        let table = TableId::open(&env, "raw", TableKind::Map).unwrap();
        let mut txn = env.begin_write().unwrap();
        for key in [b"c", b"a", b"b"] {
            table.put(&mut txn, key, b"v", WriteFlags::empty()).unwrap();
        }
        txn.commit().unwrap();

        let txn = env.begin_read().unwrap();
        let keys: Vec<_> = table
            .raw_entries(&txn)
            .unwrap()
            .map(|entry| entry.unwrap().0.to_vec())
            .collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }
}
