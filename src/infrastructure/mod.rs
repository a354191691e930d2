//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - The IMM configuration store (file-backed snapshot)
//! - AMF / IMM administrative command line tools

pub mod admin;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use admin::{AdminAction, AdminCommand, AdminInvoker, AmfAdmClient, DryRunInvoker};
pub use snapshot::{SnapshotStore, StoredObject};
pub use store::{ConfigStore, Scope};
