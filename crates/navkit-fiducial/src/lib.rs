//! Fiducial marker correspondence resolution.
//!
//! Given segmented clusters from an intra-operative scan and the known
//! layout of the fiducial markers, the resolver
//! - fits a sphere to each plausibly sized cluster and keeps the centers,
//! - screens candidates by how well their mutual distances reproduce each
//!   reference marker's distance fingerprint,
//! - searches labelings and keeps the one with the lowest registration
//!   residual,
//! - reports the reference-to-scan rigid transform.
//!
//! Segmentation and the surrounding intensity sweep stay outside this
//! crate; inputs are plain point clusters.

mod assign;
mod dedup;
mod extract;
mod fingerprint;
mod reference;
mod resolver;

pub use assign::{
    assign_correspondence, AssignError, AssignParams, Assignment, MAX_ASSIGNMENT_CANDIDATES,
    MIN_ASSIGNMENT_PAIRS,
};
pub use dedup::{dedup_points, DEFAULT_DEDUP_EPSILON};
pub use extract::{
    extract_candidates, radial_sort, CandidateExtraction, ExtractionParams, PointCluster,
};
pub use fingerprint::{
    match_fingerprints, pairwise_distances, refine_candidates, supported_distances,
    FingerprintMatch, FingerprintParams, Refinement,
};
pub use reference::{
    FingerprintTable, ReferenceError, ReferenceLayout, MAX_REFERENCE_MARKERS,
    MIN_REFERENCE_MARKERS,
};
pub use resolver::{FiducialResolver, FiducialResolverParams, ResolveError, ResolvedMarkers};

pub use navkit_core::{KabschRegistration, Registration, RigidRegistration};
