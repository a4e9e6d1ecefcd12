//! Error types for lmdbmap core.
//!
//! Engine return codes are translated into this taxonomy at the boundary
//! where they occur (environment open, transaction begin, commit) and are
//! otherwise surfaced as [`CoreError::Engine`]. A missing key is never an
//! error; lookups return `Option`, an empty `Vec` or an end iterator.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Whether a failed commit is worth retrying as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitErrorKind {
    /// Transient resource exhaustion; the work may succeed if retried.
    Retryable,
    /// The environment cannot accept the commit without reconfiguration
    /// (map full, corruption, version mismatch).
    Structural,
}

/// Errors that can occur in lmdbmap core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The environment or a table could not be opened.
    #[error("cannot open {target}: {message}")]
    StorageInit {
        /// What was being opened (a path or a table name).
        target: String,
        /// Description of the failure.
        message: String,
    },

    /// A transaction could not be started.
    #[error("cannot begin {} transaction: {source}", if *read_only { "read-only" } else { "read-write" })]
    TransactionBegin {
        /// Whether a read-only transaction was requested.
        read_only: bool,
        /// Engine error.
        #[source]
        source: lmdb::Error,
    },

    /// Commit failed. The transaction is gone either way.
    #[error("commit failed ({kind:?}): {source}")]
    Commit {
        /// Retry classification.
        kind: CommitErrorKind,
        /// Engine error.
        #[source]
        source: lmdb::Error,
    },

    /// A write was attempted through a read-only transaction.
    #[error("write operation in read-only transaction")]
    ReadOnlyTransaction,

    /// Unexpected engine failure.
    #[error("engine error: {0}")]
    Engine(#[from] lmdb::Error),

    /// Encoding failed, or stored bytes do not decode as the expected type.
    #[error("codec error: {0}")]
    Codec(#[from] lmdbmap_codec::CodecError),
}

impl CoreError {
    /// Creates a storage initialization error.
    pub fn storage_init(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageInit {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Creates a storage initialization error for a filesystem failure.
    pub(crate) fn storage_io(path: &Path, err: &io::Error) -> Self {
        Self::storage_init(path.display().to_string(), err.to_string())
    }

    /// Creates a commit error, classifying the engine failure.
    pub(crate) fn commit(source: lmdb::Error) -> Self {
        Self::Commit {
            kind: classify_commit(source),
            source,
        }
    }

    /// Returns true if retrying the failed operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransactionBegin { .. } => true,
            Self::Commit { kind, .. } => *kind == CommitErrorKind::Retryable,
            _ => false,
        }
    }

    /// Returns true if stored bytes failed to decode.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Codec(err) if err.is_decode())
    }
}

fn classify_commit(err: lmdb::Error) -> CommitErrorKind {
    use lmdb::Error as E;
    match err {
        E::ReadersFull | E::TxnFull | E::CursorFull | E::PageFull | E::TlsFull => {
            CommitErrorKind::Retryable
        }
        E::Other(code) => match io::Error::from_raw_os_error(code).kind() {
            io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory => {
                CommitErrorKind::Retryable
            }
            _ => CommitErrorKind::Structural,
        },
        _ => CommitErrorKind::Structural,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_full_is_structural() {
        let err = CoreError::commit(lmdb::Error::MapFull);
        assert!(matches!(
            err,
            CoreError::Commit {
                kind: CommitErrorKind::Structural,
                ..
            }
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn txn_full_is_retryable() {
        let err = CoreError::commit(lmdb::Error::TxnFull);
        assert!(err.is_retryable());
    }

    #[test]
    fn interrupted_os_error_is_retryable() {
        let code = io::Error::from(io::ErrorKind::Interrupted)
            .raw_os_error()
            .unwrap_or(4);
        let err = CoreError::commit(lmdb::Error::Other(code));
        assert!(err.is_retryable());
    }

    #[test]
    fn begin_failure_is_retryable() {
        let err = CoreError::TransactionBegin {
            read_only: true,
            source: lmdb::Error::ReadersFull,
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn codec_decode_error_is_flagged() {
        let err: CoreError = lmdbmap_codec::CodecError::InvalidUtf8.into();
        assert!(err.is_decode());
        assert!(!CoreError::ReadOnlyTransaction.is_decode());
    }
}
