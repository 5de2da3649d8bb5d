//! Uniform object-level error set and the canonical codes the backend
//! façade translates them into for asynchronous completions.

use thiserror::Error;

/// Deterministic, non-retried error set returned by the object state machine
/// and view store.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ObjclassError {
    #[error("invalid argument")]
    InvalidArgument,

    #[error("I/O error: missing or corrupt metadata")]
    IOError,

    #[error("object not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("wrong object for this position")]
    WrongObject,

    #[error("entry too large for slot")]
    TooLarge,

    #[error("read-only: slot already taken")]
    ReadOnly,

    #[error("position not yet written")]
    Unwritten,

    #[error("position invalidated")]
    Invalidated,
}

pub type ObjclassResult<T> = std::result::Result<T, ObjclassError>;

/// Canonical result codes exposed by the backend façade, decoupled
/// from the internal `ObjclassError` so that callers of async completions
/// see a small, stable surface regardless of how storage failures occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalResult {
    Ok,
    StaleEpoch,
    ReadOnly,
    NotWritten,
    Invalidated,
    InvalidEpoch,
}

impl From<ObjclassError> for CanonicalResult {
    fn from(e: ObjclassError) -> Self {
        match e {
            ObjclassError::Unwritten => CanonicalResult::NotWritten,
            ObjclassError::Invalidated => CanonicalResult::Invalidated,
            ObjclassError::AlreadyExists => CanonicalResult::ReadOnly,
            ObjclassError::WrongObject => CanonicalResult::StaleEpoch,
            // InvalidArgument/IOError/NotFound/TooLarge/ReadOnly(non-write) pass
            // through as the nearest canonical analogue; none of these arise
            // on the read/write hot path once init has succeeded.
            _ => CanonicalResult::InvalidEpoch,
        }
    }
}

/// Outcome of a `read` on a single position, carried alongside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Ok,
    Unwritten,
    Invalidated,
}
