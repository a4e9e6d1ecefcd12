//! Ordered multimap with a sorted set of values per key.

use crate::cursor::{RawCursor, RawEntry, Seek, Step};
use crate::environment::Environment;
use crate::error::{CoreError, CoreResult};
use crate::table::TableId;
use crate::transaction::Transaction;
use crate::types::TableKind;
use lmdb::{Database, WriteFlags};
use lmdbmap_codec::{Decode, Encode, OrderedKey};
use std::fmt;
use std::marker::PhantomData;

/// A typed, ordered multimap stored in one duplicate-sorted LMDB table.
///
/// Each key maps to a set of distinct values, kept in the order of their
/// encoded bytes. Iteration visits every (key, value) pair in (key, value)
/// order; bound queries work at key granularity.
///
/// LMDB limits duplicate values to the maximum key size (511 encoded bytes
/// by default, so 510 bytes of a `String` or `Vec<u8>`); larger values fail
/// with [`CoreError::Engine`].
pub struct Multimap<K, V> {
    table: TableId,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Multimap<K, V>
where
    K: OrderedKey,
    V: Encode + Decode,
{
    /// Opens the multimap table `name`, creating it if it doesn't exist.
    ///
    /// Performs a short write transaction of its own, so the calling thread
    /// must not hold a transaction. Fails with [`CoreError::StorageInit`] if
    /// `name` exists as a map.
    pub fn open(env: &Environment, name: &str) -> CoreResult<Self> {
        Ok(Self {
            table: TableId::open(env, name, TableKind::Multimap)?,
            _types: PhantomData,
        })
    }

    /// Returns the table identity.
    #[must_use]
    pub fn table(&self) -> &TableId {
        &self.table
    }

    /// Adds the pair (`key`, `value`).
    ///
    /// Returns false if that exact pair is already present; the table is
    /// unchanged in that case.
    pub fn insert(&self, txn: &mut Transaction<'_>, key: &K, value: &V) -> CoreResult<bool> {
        let key = key.encode()?;
        let value = value.encode()?;
        self.table.put(txn, &key, &value, WriteFlags::NO_DUP_DATA)
    }

    /// Returns every value stored under `key`, in value order.
    pub fn get(&self, txn: &Transaction<'_>, key: &K) -> CoreResult<Vec<V>> {
        let key = key.encode()?;
        let cursor = RawCursor::open(txn, self.table.db())?;
        let mut values = Vec::new();
        let mut entry = cursor.seek(Seek::Exact(&key))?;
        while let Some((_, value)) = entry {
            values.push(V::decode(value)?);
            entry = cursor.step(Step::NextDup)?;
        }
        Ok(values)
    }

    /// Returns the number of values stored under `key`.
    pub fn count(&self, txn: &Transaction<'_>, key: &K) -> CoreResult<usize> {
        let key = key.encode()?;
        let cursor = RawCursor::open(txn, self.table.db())?;
        let mut count = 0;
        let mut entry = cursor.seek(Seek::Exact(&key))?;
        while entry.is_some() {
            count += 1;
            entry = cursor.step(Step::NextDup)?;
        }
        Ok(count)
    }

    /// Returns true if `key` has at least one value.
    pub fn contains(&self, txn: &Transaction<'_>, key: &K) -> CoreResult<bool> {
        let key = key.encode()?;
        Ok(txn.get(self.table.db(), &key)?.is_some())
    }

    /// Returns true if the exact pair (`key`, `value`) is present.
    pub fn contains_pair(&self, txn: &Transaction<'_>, key: &K, value: &V) -> CoreResult<bool> {
        let key = key.encode()?;
        let value = value.encode()?;
        let cursor = RawCursor::open(txn, self.table.db())?;
        Ok(cursor.seek(Seek::Pair(&key, &value))?.is_some())
    }

    /// Removes every value of `key`. Returns whether anything was removed.
    pub fn erase(&self, txn: &mut Transaction<'_>, key: &K) -> CoreResult<bool> {
        let key = key.encode()?;
        self.table.delete(txn, &key, None)
    }

    /// Removes the pair (`key`, `value`). Returns whether it was present.
    pub fn erase_pair(&self, txn: &mut Transaction<'_>, key: &K, value: &V) -> CoreResult<bool> {
        let key = key.encode()?;
        let value = value.encode()?;
        self.table.delete(txn, &key, Some(&value))
    }

    /// Returns true if the multimap has no pairs.
    pub fn is_empty(&self, txn: &Transaction<'_>) -> CoreResult<bool> {
        let cursor = RawCursor::open(txn, self.table.db())?;
        Ok(cursor.seek(Seek::First)?.is_none())
    }

    /// Returns the number of (key, value) pairs.
    pub fn len(&self, txn: &Transaction<'_>) -> CoreResult<usize> {
        self.table.entries(txn)
    }

    /// Removes every pair.
    pub fn clear(&self, txn: &mut Transaction<'_>) -> CoreResult<()> {
        self.table.clear(txn)
    }

    /// Iterator at the first pair, or the end if the multimap is empty.
    pub fn begin<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
    ) -> CoreResult<MultimapIter<'txn, K, V>> {
        MultimapIter::seek(txn, self.table.db(), Seek::First)
    }

    /// The end iterator.
    #[must_use]
    pub fn end<'txn>(&self, txn: &'txn Transaction<'txn>) -> MultimapIter<'txn, K, V> {
        MultimapIter::end(txn, self.table.db())
    }

    /// Iterator at the first value of `key`, or the end if it is absent.
    pub fn find<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
        key: &K,
    ) -> CoreResult<MultimapIter<'txn, K, V>> {
        let key = key.encode()?;
        MultimapIter::seek(txn, self.table.db(), Seek::Exact(&key))
    }

    /// Iterator at the first value of the smallest key not less than `key`.
    pub fn lower_bound<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
        key: &K,
    ) -> CoreResult<MultimapIter<'txn, K, V>> {
        let key = key.encode()?;
        MultimapIter::seek(txn, self.table.db(), Seek::AtLeast(&key))
    }

    /// Iterator at the first value of the smallest key greater than `key`.
    ///
    /// Skips every value of `key` in one move.
    pub fn upper_bound<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
        key: &K,
    ) -> CoreResult<MultimapIter<'txn, K, V>> {
        let key = key.encode()?;
        let mut it = MultimapIter::seek(txn, self.table.db(), Seek::AtLeast(&key))?;
        if it.raw_key() == Some(key.as_slice()) {
            it.advance_key()?;
        }
        Ok(it)
    }

    /// The pairs with key `key`: `(lower_bound, upper_bound)`.
    pub fn equal_range<'txn>(
        &self,
        txn: &'txn Transaction<'txn>,
        key: &K,
    ) -> CoreResult<(MultimapIter<'txn, K, V>, MultimapIter<'txn, K, V>)> {
        Ok((self.lower_bound(txn, key)?, self.upper_bound(txn, key)?))
    }
}

impl<K, V> Clone for Multimap<K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            _types: PhantomData,
        }
    }
}

impl<K, V> fmt::Debug for Multimap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multimap")
            .field("table", &self.table)
            .finish()
    }
}

/// A position in a [`Multimap`], scoped to one transaction.
///
/// Two iterators compare equal when both are at the end or both sit on the
/// same (key, value) pair.
pub struct MultimapIter<'txn, K, V> {
    txn: &'txn Transaction<'txn>,
    db: Database,
    cursor: Option<RawCursor<'txn>>,
    current: Option<RawEntry<'txn>>,
    deferred: Option<CoreError>,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<'txn, K, V> MultimapIter<'txn, K, V>
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

    /// Returns true if the iterator is past the last pair.
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

    /// Decodes the pair at the current position.
    pub fn get(&self) -> CoreResult<Option<(K, V)>> {
        match self.current {
            Some((key, value)) => Ok(Some((K::decode(key)?, V::decode(value)?))),
            None => Ok(None),
        }
    }

    /// Moves to the next pair. Does nothing at the end.
    pub fn advance(&mut self) -> CoreResult<()> {
        self.step(Step::Next)
    }

    /// Moves to the first value of the next distinct key.
    pub fn advance_key(&mut self) -> CoreResult<()> {
        self.step(Step::NextKey)
    }

    fn step(&mut self, step: Step) -> CoreResult<()> {
        if self.current.is_none() {
            return Ok(());
        }
        if let Some(cursor) = &self.cursor {
            self.current = cursor.step(step)?;
        }
        Ok(())
    }

    /// Returns an independent iterator at the same pair.
    pub fn try_clone(&self) -> CoreResult<Self> {
        match self.current {
            Some((key, value)) => Self::seek(self.txn, self.db, Seek::Pair(key, value)),
            None => Ok(Self::end(self.txn, self.db)),
        }
    }
}

impl<K, V> PartialEq for MultimapIter<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.db == other.db && self.current == other.current
    }
}

impl<K, V> fmt::Debug for MultimapIter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultimapIter")
            .field("txn", &self.txn.id())
            .field("entry", &self.current)
            .finish_non_exhaustive()
    }
}

impl<K, V> Iterator for MultimapIter<'_, K, V>
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
