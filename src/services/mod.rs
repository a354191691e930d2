//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services read the store through the resolver and collector, queue every
//! change in one bundle and issue admin actions through an invoker.

pub mod collector;
pub mod scale_in;
pub mod scale_out;
pub mod scale_service;
pub mod topology;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use collector::{Footprint, FootprintCollector, RemovalSet};
pub use scale_in::ScaleInReport;
pub use scale_out::{ScaleOutOutcome, ScaleOutReport};
pub use scale_service::{ScaleOptions, ScaleService};
pub use topology::{NodeIdentity, TopologyResolver};
