//! Error kinds for the store.
//!
//! Mirrors the error taxonomy of spec §7: `OpenFailure` and
//! `WalIoFailure` are surfaced to callers, `TransactionStateError` is
//! handled silently by the caller of `begin`/`commit`/`abort` (they get
//! `Ok(())` and a logged diagnostic — see [`crate::Operation`] callers
//! in `durakv-engine`), and `SnapshotFailure` is logged-and-ignored on
//! close. `ReplayMalformed` never escapes recovery; it exists here only
//! so recovery can log a structured reason.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The WAL or index file could not be opened/created.
    #[error("failed to open {path}: {source}")]
    OpenFailure {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A write or fsync failed after the WAL was successfully opened.
    /// Fatal for the remainder of the session: the store moves to a
    /// read-only state and subsequent writes fail with this variant.
    #[error("WAL I/O failure, store is now read-only: {0}")]
    WalIoFailure(#[source] io::Error),

    /// `Commit`/`Abort` called with no active transaction, or nested
    /// `Begin`. Per spec this is handled silently by the caller; the
    /// variant exists so engine code has something to log.
    #[error("invalid transaction state: {0}")]
    TransactionStateError(&'static str),

    /// A WAL line failed to parse during recovery. Logged and skipped,
    /// never returned from a public API.
    #[error("malformed WAL record at byte offset {offset}: {reason}")]
    ReplayMalformed {
        /// Byte offset of the offending line.
        offset: u64,
        /// Human-readable reason.
        reason: &'static str,
    },

    /// The index snapshot could not be written on close. Non-fatal:
    /// recovery never reads the snapshot, so durability is unaffected.
    #[error("failed to write snapshot to {path}: {source}")]
    SnapshotFailure {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A key or value violated the contract in spec §3 (e.g. a value
    /// containing a newline, which would corrupt WAL framing).
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Which of "key"/"value" was invalid.
        field: &'static str,
        /// Human-readable reason.
        reason: &'static str,
    },
}

impl StoreError {
    /// Stable reason code, useful for callers that want to match on
    /// error kind without a full `matches!` on the enum.
    pub fn reason_code(&self) -> &'static str {
        match self {
            StoreError::OpenFailure { .. } => "open_failure",
            StoreError::WalIoFailure(_) => "wal_io_failure",
            StoreError::TransactionStateError(_) => "transaction_state_error",
            StoreError::ReplayMalformed { .. } => "replay_malformed",
            StoreError::SnapshotFailure { .. } => "snapshot_failure",
            StoreError::InvalidInput { .. } => "invalid_input",
        }
    }

    /// True once this error has latched the store into the read-only
    /// error state described in spec §4.2.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::WalIoFailure(_))
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(
            StoreError::TransactionStateError("no active transaction").reason_code(),
            "transaction_state_error"
        );
        assert_eq!(
            StoreError::WalIoFailure(io::Error::new(io::ErrorKind::Other, "disk full"))
                .reason_code(),
            "wal_io_failure"
        );
    }

    #[test]
    fn wal_io_failure_is_fatal() {
        let err = StoreError::WalIoFailure(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(err.is_fatal());
        let err = StoreError::TransactionStateError("nested begin");
        assert!(!err.is_fatal());
    }
}
