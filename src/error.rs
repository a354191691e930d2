//! Centralized error types for amf-scale
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Top-level error type for scale operations
#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("DN error: {0}")]
    Dn(#[from] DnError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Change bundle error: {0}")]
    Bundle(#[from] BundleError),
}

/// Distinguished name errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnError {
    #[error("Malformed DN '{dn}': {reason}")]
    Malformed { dn: String, reason: String },
}

impl DnError {
    pub fn malformed(dn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            dn: dn.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object not found: {dn}")]
    NotFound { dn: String },

    #[error("Could not find IMM object for hostname [{hostname}]")]
    NodeNotFound { hostname: String },

    #[error("Lookup of {dn} failed: {reason}")]
    LookupFailure { dn: String, reason: String },

    #[error("Commit rejected: {reason}")]
    CommitRejected { reason: String },

    #[error("Snapshot I/O failed for {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse snapshot {path}: {message}")]
    Parse { path: String, message: String },
}

impl StoreError {
    /// Wrap a failed dependent read, keeping not-found lookups distinguishable
    pub fn lookup(dn: impl Into<String>, source: StoreError) -> Self {
        Self::LookupFailure {
            dn: dn.into(),
            reason: source.to_string(),
        }
    }
}

/// Change bundle lifecycle errors
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Bundle is {state}, no further operations may be queued")]
    InvalidState { state: String },

    #[error(transparent)]
    Commit(#[from] StoreError),
}

/// Administrative action errors
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Failed to run {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("`{command}` exited with status {code}")]
    NonZeroExit { command: String, code: i32 },
}
