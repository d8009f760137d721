//! Candidate marker extraction from segmented point clusters.

use nalgebra::Point3;
use navkit_core::{centroid, fit_sphere, PointSet};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One connected cluster from the external segmentation stage.
///
/// `points` holds one sample point per facet of the cluster surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointCluster {
    pub points: Vec<Point3<f64>>,
    pub cell_count: usize,
}

impl PointCluster {
    /// Cluster whose cell count equals its number of sample points.
    pub fn from_points(points: Vec<Point3<f64>>) -> Self {
        let cell_count = points.len();
        Self { points, cell_count }
    }
}

/// Plausibility limits for marker clusters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionParams {
    /// Smallest accepted cluster (inclusive).
    pub min_cells: usize,
    /// Largest accepted cluster (inclusive).
    pub max_cells: usize,
    /// Above this total cell count extraction is skipped entirely.
    pub max_total_cells: usize,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            min_cells: 150,
            max_cells: 2000,
            max_total_cells: 300_000,
        }
    }
}

impl ExtractionParams {
    pub fn accepts(&self, cell_count: usize) -> bool {
        (self.min_cells..=self.max_cells).contains(&cell_count)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateExtraction {
    /// Fitted sphere centers, radially sorted.
    pub candidates: PointSet,
    pub rejected_by_size: usize,
    pub rejected_by_fit: usize,
    /// The combined mesh was too large and no cluster was processed.
    pub scale_guard_tripped: bool,
}

/// Fit a sphere to every plausible cluster and return the centers.
///
/// Pure function of the input clusters. Exceeding the total-size guard is a
/// deliberate short-circuit that yields an empty set, not an error.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(clusters, params), fields(clusters = clusters.len()))
)]
pub fn extract_candidates(
    clusters: &[PointCluster],
    params: &ExtractionParams,
) -> CandidateExtraction {
    let total_cells: usize = clusters.iter().map(|c| c.cell_count).sum();
    if total_cells > params.max_total_cells {
        log::warn!(
            "combined mesh has {total_cells} cells (> {}), skipping extraction",
            params.max_total_cells
        );
        return CandidateExtraction {
            scale_guard_tripped: true,
            ..CandidateExtraction::default()
        };
    }

    let mut out = CandidateExtraction::default();
    for cluster in clusters {
        if !params.accepts(cluster.cell_count) {
            out.rejected_by_size += 1;
            continue;
        }
        match fit_sphere(&cluster.points) {
            Ok(sphere) => out.candidates.push(sphere.center),
            Err(err) => {
                log::debug!("dropping cluster ({} cells): {err}", cluster.cell_count);
                out.rejected_by_fit += 1;
            }
        }
    }

    radial_sort(&mut out.candidates);
    log::debug!(
        "extracted {} candidates ({} rejected by size, {} by fit)",
        out.candidates.len(),
        out.rejected_by_size,
        out.rejected_by_fit
    );
    out
}

/// Order points by distance to their common centroid (stable).
///
/// The order carries no meaning; it only makes downstream passes
/// reproducible.
pub fn radial_sort(points: &mut [Point3<f64>]) {
    let Some(center) = centroid(points) else {
        return;
    };
    points.sort_by(|a, b| {
        nalgebra::distance(a, &center).total_cmp(&nalgebra::distance(b, &center))
    });
}
