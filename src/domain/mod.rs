//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod amf;
pub mod bundle;
pub mod dn;
pub mod object;
pub mod rewrite;

// Re-export commonly used types
pub use amf::{AdminOperation, AdminState, RedundancyModel};
pub use bundle::{BundleOp, BundleState, BundleTarget, ChangeBundle};
pub use dn::{split_rdn_and_parent, Dn};
pub use object::{ConfigObject, EntityClass};
pub use rewrite::{default_nonce, into_create, prepare_for_write, IdentityRewriter};
