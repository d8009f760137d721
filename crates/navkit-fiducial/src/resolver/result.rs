use nalgebra::Point3;
use navkit_core::{PointSet, Registration, RigidTransform};
use serde::{Deserialize, Serialize};

/// Output of a resolver run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMarkers {
    /// Scan-space marker position per reference index.
    pub markers: Vec<Option<Point3<f64>>>,
    /// Reference indices that could not be labeled.
    pub unresolved: Vec<usize>,
    /// Reference-to-scan registration over the labeled markers.
    pub registration: Registration,

    /// Candidates produced by extraction.
    pub extracted: usize,
    /// Candidates left after screening and deduplication.
    pub screened: usize,
    /// Screening passes over both stages.
    pub screening_passes: usize,
    /// Labelings registered by the assigner.
    pub labelings_evaluated: usize,

    pub refinement_exhausted: bool,
    /// Strict screening removed every candidate; the coarse set was used.
    pub strict_fallback: bool,
    pub search_exhausted: bool,
    /// At least one reference marker is unresolved.
    pub incomplete: bool,
    /// Mean residual exceeded `max_avg_error`.
    pub high_residual: bool,
}

impl ResolvedMarkers {
    /// Maps reference (model) coordinates into scan coordinates.
    pub fn transform(&self) -> RigidTransform {
        self.registration.transform
    }

    pub fn max_error(&self) -> f64 {
        self.registration.max_error
    }

    pub fn avg_error(&self) -> f64 {
        self.registration.avg_error
    }

    /// Resolved markers in reference order, unresolved ones skipped.
    pub fn ordered_points(&self) -> PointSet {
        self.markers.iter().flatten().copied().collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.markers.iter().filter(|m| m.is_some()).count()
    }

    /// No warning flag is raised.
    pub fn is_clean(&self) -> bool {
        !(self.refinement_exhausted
            || self.strict_fallback
            || self.search_exhausted
            || self.incomplete
            || self.high_residual)
    }
}
