//! Ordered map with one value per key.

use crate::cursor::{RawCursor, RawEntry, Seek, Step};
use crate::environment::Environment;
use crate::error::CoreResult;
use crate::table::TableId;
use crate::transaction::Transaction;
use crate::types::TableKind;
use lmdb::{Database, WriteFlags};
use lmdbmap_codec::{Decode, Encode, OrderedKey};
use std::fmt;
use std::marker::PhantomData;

/// A typed, ordered map stored in one LMDB table.
///
/// The handle holds only the table identity; every operation takes the
/// [`Transaction`] to run in. Keys are ordered by their encoded bytes, which
/// for [`OrderedKey`] types matches `K`'s own order.
///
/// # Example
///
/// ```rust,no_run
/// use lmdbmap_core::{EnvConfig, Environment, Map};
///
/// let env = Environment::open("/tmp/lmdbmap-map", EnvConfig::default())?;
/// let map: Map<u32, String> = Map::open(&env, "numbers")?;
///
/// let mut txn = env.begin_write()?;
/// map.put(&mut txn, &10, &"ten".to_string())?;
/// map.put(&mut txn, &20, &"twenty".to_string())?;
/// txn.commit()?;
///
/// let txn = env.begin_read()?;
/// let it = map.lower_bound(&txn, &15)?;
/// assert_eq!(it.key()?, Some(20));
/// # Ok::<(), lmdbmap_core::CoreError>(())
/// ```
pub struct Map<K, V> {
    table: TableId,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Map<K, V>
where
    K: OrderedKey,
    V: Encode + Decode,
{
    /// Opens the map table `name`, creating it if it doesn't exist.
    ///
    /// Performs a short write transaction of its own, so the calling thread
    /// must not hold a transaction. Fails with
    /// [`CoreError::StorageInit`](crate::CoreError::StorageInit) if `name`
    /// exists as a multimap.
    pub fn open(env: &Environment, name: &str) -> CoreResult<Self> {
        Ok(Self {
            table: TableId::open(env, name, TableKind::Map)?,
            _types: PhantomData,
        })
    }

    /// Returns the table identity.
    #[must_use]
    pub fn table(&self) -> &TableId {
        &self.table
    }

    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns false and leaves the stored value untouched if it is.
    pub fn insert(&self, txn: &mut Transaction<'_>, key: &K, value: &V) -> CoreResult<bool> {
        let key = key.encode()?;
        let value = value.encode()?;
        self.table.put(txn, &key, &value, WriteFlags::NO_OVERWRITE)
    }

    /// Stores `value` under `key`, replacing any existing value.
    pub fn put(&self, txn: &mut Transaction<'_>, key: &K, value: &V) -> CoreResult<()> {
        let key = key.encode()?;
        let value = value.encode()?;
        self.table.put(txn, &key, &value, WriteFlags::empty())?;
        Ok(())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, txn: &Transaction<'_>, key: &K) -> CoreResult<Option<V>> {
        let key = key.encode()?;
        match txn.get(self.table.db(), &key)? {
            Some(bytes) => Ok(Some(V::decode(bytes)?)),
            None => Ok(None),
        }
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, txn: &Transaction<'_>, key: &K) -> CoreResult<bool> {
        let key = key.encode()?;
        Ok(txn.get(self.table.db(), &key)?.is_some())
    }

    /// Removes `key`. Returns whether an entry was removed.
    pub fn erase(&self, txn: &mut Transaction<'_>, key: &K) -> CoreResult<bool> {
        let key = key.encode()?;
        self.table.delete(txn, &key, None)
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self, txn: &Transaction<'_>) -> CoreResult<bool> {
        let cursor = RawCursor::open(txn, self.table.db())?;
        Ok(cursor.seek(Seek::First)?.is_none())
    }

    /// Returns the number of entries.
    pub fn len(&self, txn: &Transaction<'_>) -> CoreResult<usize> {
        self.table.entries(txn)
    }

    /// Removes every entry.
    pub fn clear(&self, txn: &mut Transaction<'_>) -> CoreResult<()> {
        self.table.clear(txn)
    }

    /// Iterator at the smallest key, or the end if the map is empty.
    pub fn begin<'txn>(&self, txn: &'txn Transaction<'txn>) -> CoreResult<MapIter<'txn, K, V>> {
        MapIter::seek(txn, self.table.db(), Seek::First)
    }

    /// The end iterator.
    #[must_use]
    pub fn end<'txn>(&self, txn: &'txn Transaction<'txn>) -> MapIter<'txn, K, V> {
        MapIter::end(txn, self.table.db())
    }

    /// Iterator at exactly `key`, or the end if it is absent.
    pub fn find<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
        key: &K,
    ) -> CoreResult<MapIter<'txn, K, V>> {
        let key = key.encode()?;
        MapIter::seek(txn, self.table.db(), Seek::Exact(&key))
    }

    /// Iterator at the smallest key not less than `key`.
    pub fn lower_bound<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
        key: &K,
    ) -> CoreResult<MapIter<'txn, K, V>> {
        let key = key.encode()?;
        MapIter::seek(txn, self.table.db(), Seek::AtLeast(&key))
    }

    /// Iterator at the smallest key greater than `key`.
    pub fn upper_bound<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
        key: &K,
    ) -> CoreResult<MapIter<'txn, K, V>> {
        let key = key.encode()?;
        let mut it = MapIter::seek(txn, self.table.db(), Seek::AtLeast(&key))?;
        if it.raw_key() == Some(key.as_slice()) {
            it.advance()?;
        }
        Ok(it)
    }

    /// The range of entries equal to `key`: `(lower_bound, upper_bound)`.
    ///
    /// Both iterators sit on the successor of `key` when it is absent.
    pub fn equal_range<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
        key: &K,
    ) -> CoreResult<(MapIter<'txn, K, V>, MapIter<'txn, K, V>)> {
        Ok((self.lower_bound(txn, key)?, self.upper_bound(txn, key)?))
    }
}

impl<K, V> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            _types: PhantomData,
        }
    }
}

impl<K, V> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("table", &self.table).finish()
    }
}

/// A position in a [`Map`], scoped to one transaction.
///
/// Each iterator owns its own cursor. Two iterators compare equal when both
/// are at the end or both sit on the same key.
///
/// `MapIter` is also a standard [`Iterator`] that yields the current entry and
/// then advances.
pub struct MapIter<'txn, K, V> {
    txn: &'txn Transaction<'txn>,
    db: Database,
    cursor: Option<RawCursor<'txn>>,
    current: Option<RawEntry<'txn>>,
    deferred: Option<crate::CoreError>,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<'txn, K, V> MapIter<'txn, K, V>
where
    K: Decode,
    V: Decode,
{
    fn seek(txn: &'txn Transaction<'txn>, db: Database, seek: Seek<'_>) -> CoreResult<Self> {
        let cursor = RawCursor::open(txn, db)?;
        let current = cursor.seek(seek)?;
        Ok(Self {
            txn,
            db,
            cursor: Some(cursor),
            current,
            deferred: None,
            _types: PhantomData,
        })
    }

    fn end(txn: &'txn Transaction<'txn>, db: Database) -> Self {
        Self {
            txn,
            db,
            cursor: None,
            current: None,
            deferred: None,
            _types: PhantomData,
        }
    }

    /// Returns true if the iterator is past the last entry.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the encoded key at the current position.
    #[must_use]
    pub fn raw_key(&self) -> Option<&'txn [u8]> {
        self.current.map(|(key, _)| key)
    }

    /// Decodes the key at the current position.
    pub fn key(&self) -> CoreResult<Option<K>> {
        match self.current {
            Some((key, _)) => Ok(Some(K::decode(key)?)),
            None => Ok(None),
        }
    }

    /// Decodes the value at the current position.
    pub fn value(&self) -> CoreResult<Option<V>> {
        match self.current {
            Some((_, value)) => Ok(Some(V::decode(value)?)),
            None => Ok(None),
        }
    }

    /// Decodes the entry at the current position.
    pub fn get(&self) -> CoreResult<Option<(K, V)>> {
        match self.current {
            Some((key, value)) => Ok(Some((K::decode(key)?, V::decode(value)?))),
            None => Ok(None),
        }
    }

    /// Moves to the next key. Does nothing at the end.
    pub fn advance(&mut self) -> CoreResult<()> {
        if self.current.is_none() {
            return Ok(());
        }
        if let Some(cursor) = &self.cursor {
            self.current = cursor.step(Step::Next)?;
        }
        Ok(())
    }

    /// Returns an independent iterator at the same position.
    ///
    /// Opens a new cursor and seeks it to the current key.
    pub fn try_clone(&self) -> CoreResult<Self> {
        match self.current {
            Some((key, _)) => Self::seek(self.txn, self.db, Seek::Exact(key)),
            None => Ok(Self::end(self.txn, self.db)),
        }
    }
}

impl<K, V> PartialEq for MapIter<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.db == other.db && self.current.map(|(k, _)| k) == other.current.map(|(k, _)| k)
    }
}

impl<K, V> fmt::Debug for MapIter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapIter")
            .field("txn", &self.txn.id())
            .field("key", &self.current.map(|(k, _)| k))
            .finish_non_exhaustive()
    }
}

impl<K, V> Iterator for MapIter<'_, K, V>
where
    K: Decode,
    V: Decode,
{
    type Item = CoreResult<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.deferred.take() {
            return Some(Err(err));
        }
        let item = self.get().transpose()?;
        if let Err(err) = self.advance() {
            self.current = None;
            self.deferred = Some(err);
        }
        Some(item)
    }
}
