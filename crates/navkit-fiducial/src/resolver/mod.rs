//! Fiducial resolution pipeline.
//!
//! This module wires together candidate extraction, fingerprint screening,
//! correspondence assignment and the final reference-to-scan registration.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::ResolveError;
pub use params::FiducialResolverParams;
pub use pipeline::FiducialResolver;
pub use result::ResolvedMarkers;
