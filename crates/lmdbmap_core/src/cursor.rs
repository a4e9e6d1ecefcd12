//! Byte-level cursor positioning.
//!
//! All engine cursor interaction is in this module. Every positioning
//! operation is followed by a `GET_CURRENT` read so callers always receive
//! the full (key, value) pair of the new position, or `None` once the cursor
//! has run off the end of the table.

use crate::error::{CoreError, CoreResult};
use crate::transaction::Transaction;
use lmdb::{Cursor as _, Database, RoCursor};
use lmdb_sys::{
    MDB_FIRST, MDB_GET_BOTH, MDB_GET_CURRENT, MDB_NEXT, MDB_NEXT_DUP, MDB_NEXT_NODUP, MDB_SET,
    MDB_SET_RANGE,
};
use std::os::raw::c_uint;

/// Raw key and value bytes, borrowed from the transaction's snapshot.
pub type RawEntry<'txn> = (&'txn [u8], &'txn [u8]);

/// Absolute cursor positions.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Seek<'a> {
    /// Smallest key; first value of it in a multimap.
    First,
    /// Exactly this key.
    Exact(&'a [u8]),
    /// Smallest key greater than or equal to this one.
    AtLeast(&'a [u8]),
    /// Exactly this (key, value) pair. Multimap only.
    Pair(&'a [u8], &'a [u8]),
}

/// Relative cursor moves.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    /// Next entry in (key, value) order.
    Next,
    /// Next value of the current key.
    NextDup,
    /// First value of the next distinct key.
    NextKey,
}

/// Cursor over one table, scoped to a transaction.
pub(crate) struct RawCursor<'txn> {
    inner: RoCursor<'txn>,
}

impl<'txn> RawCursor<'txn> {
    pub(crate) fn open(txn: &'txn Transaction<'_>, db: Database) -> CoreResult<Self> {
        Ok(Self {
            inner: txn.open_cursor(db)?,
        })
    }

    /// Positions the cursor. Returns `None` if no entry matches.
    pub(crate) fn seek(&self, seek: Seek<'_>) -> CoreResult<Option<RawEntry<'txn>>> {
        match seek {
            Seek::First => self.position(None, None, MDB_FIRST),
            Seek::Exact(key) => self.position(Some(key), None, MDB_SET),
            Seek::AtLeast(key) => self.position(Some(key), None, MDB_SET_RANGE),
            Seek::Pair(key, value) => self.position(Some(key), Some(value), MDB_GET_BOTH),
        }
    }

    /// Moves relative to the current position. Returns `None` at the end.
    pub(crate) fn step(&self, step: Step) -> CoreResult<Option<RawEntry<'txn>>> {
        let op = match step {
            Step::Next => MDB_NEXT,
            Step::NextDup => MDB_NEXT_DUP,
            Step::NextKey => MDB_NEXT_NODUP,
        };
        self.position(None, None, op)
    }

    fn position(
        &self,
        key: Option<&[u8]>,
        value: Option<&[u8]>,
        op: c_uint,
    ) -> CoreResult<Option<RawEntry<'txn>>> {
        match self.inner.get(key, value, op) {
            Ok(_) => self.current(),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn current(&self) -> CoreResult<Option<RawEntry<'txn>>> {
        match self.inner.get(None, None, MDB_GET_CURRENT) {
            Ok((Some(key), value)) => Ok(Some((key, value))),
            Ok((None, _)) => Err(CoreError::Engine(lmdb::Error::Invalid)),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Iterator over the raw entries of one table, in (key, value) order.
///
/// Created by [`TableId::raw_entries`](crate::TableId::raw_entries).
pub struct RawEntries<'txn> {
    cursor: RawCursor<'txn>,
    started: bool,
    done: bool,
}

impl<'txn> RawEntries<'txn> {
    pub(crate) fn open(txn: &'txn Transaction<'_>, db: Database) -> CoreResult<Self> {
        Ok(Self {
            cursor: RawCursor::open(txn, db)?,
            started: false,
            done: false,
        })
    }
}

impl<'txn> Iterator for RawEntries<'txn> {
    type Item = CoreResult<RawEntry<'txn>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = if self.started {
            self.cursor.step(Step::Next)
        } else {
            self.started = true;
            self.cursor.seek(Seek::First)
        };
        match result {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
