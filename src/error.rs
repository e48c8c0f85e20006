// src/error.rs
use std::fmt;

/// Failure taxonomy for ledger operations.
///
/// Every variant carries the key (or key range) it failed on; nothing is
/// retried here. The transaction layer that submitted the operation decides
/// whether to abort, surface, or resubmit.
#[derive(Debug)]
pub enum LedgerError {
    /// No record stored under the key.
    NotFound(String),
    /// Stored bytes did not parse as a dealer record.
    Decode { key: String, reason: String },
    /// The record could not be serialized.
    Encode(String),
    /// The backing store failed while reading or scanning.
    Read { key: String, reason: String },
    /// The backing store failed while writing.
    Write { key: String, reason: String },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "dealer {} does not exist", key),
            Self::Decode { key, reason } => {
                write!(f, "failed to decode record at {}: {}", key, reason)
            }
            Self::Encode(reason) => write!(f, "failed to encode record: {}", reason),
            Self::Read { key, reason } => write!(f, "read failed at {}: {}", key, reason),
            Self::Write { key, reason } => write!(f, "write failed at {}: {}", key, reason),
        }
    }
}

impl std::error::Error for LedgerError {}
