//! Scale-in / scale-out of service-availability cluster nodes
//!
//! A node's footprint in the IMM configuration tree (AMF and CLM node
//! identities, scalable service units and everything under them) is either
//! cloned for a new node or removed, in one atomic change bundle, with the
//! middleware's admin actions issued around it.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod services;
pub mod tools;
pub mod ui;

pub use error::ScaleError;
