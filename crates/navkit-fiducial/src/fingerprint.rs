//! Distance-fingerprint screening of candidate markers.
//!
//! A candidate is a plausible instance of reference marker `q` when enough
//! of `q`'s fingerprint distances are reproduced by distances from the
//! candidate to other candidates. Screening is repeated on its own output
//! until the candidate count stops changing.

use nalgebra::Point3;
use navkit_core::PointSet;
use serde::{Deserialize, Serialize};

use crate::dedup::{dedup_points, DEFAULT_DEDUP_EPSILON};
use crate::reference::FingerprintTable;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintParams {
    /// Absolute distance tolerance when comparing against a fingerprint.
    pub tolerance: f64,
    /// Minimum number of fingerprint distances that must be reproduced.
    pub required_neighbors: usize,
    /// Hard cap on screening passes in [`refine_candidates`].
    pub max_iterations: usize,
    /// Merge radius applied to the screened output.
    pub dedup_epsilon: f64,
}

impl Default for FingerprintParams {
    fn default() -> Self {
        Self {
            tolerance: 0.4,
            required_neighbors: 4,
            max_iterations: 20,
            dedup_epsilon: DEFAULT_DEDUP_EPSILON,
        }
    }
}

impl FingerprintParams {
    pub fn with_required_neighbors(mut self, required_neighbors: usize) -> Self {
        self.required_neighbors = required_neighbors;
        self
    }
}

/// Output of one screening pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FingerprintMatch {
    /// Retained candidates, deduplicated, grouped by the first reference
    /// index they satisfied.
    pub candidates: PointSet,
    /// `found[q]` is true when at least one candidate satisfied marker `q`.
    pub found: Vec<bool>,
}

impl FingerprintMatch {
    pub fn found_indices(&self) -> Vec<usize> {
        found_indices(&self.found)
    }
}

pub(crate) fn found_indices(found: &[bool]) -> Vec<usize> {
    found
        .iter()
        .enumerate()
        .filter_map(|(i, &f)| f.then_some(i))
        .collect()
}

/// Row-major `n x n` table of pairwise distances.
pub fn pairwise_distances(points: &[Point3<f64>]) -> Vec<f64> {
    let n = points.len();
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        for k in (i + 1)..n {
            let d = nalgebra::distance(&points[i], &points[k]);
            out[i * n + k] = d;
            out[k * n + i] = d;
        }
    }
    out
}

/// How many entries of `fingerprint` are reproduced by some distance in
/// `row` within `tolerance`. `row[skip]` (the candidate itself) is ignored.
pub fn supported_distances(row: &[f64], skip: usize, fingerprint: &[f64], tolerance: f64) -> usize {
    fingerprint
        .iter()
        .filter(|&&expected| {
            row.iter()
                .enumerate()
                .any(|(k, &d)| k != skip && (d - expected).abs() < tolerance)
        })
        .count()
}

/// Run one screening pass over all reference indices.
///
/// A candidate satisfying several reference markers is kept once; which
/// marker it really is gets decided by correspondence assignment.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(candidates, table, params), fields(candidates = candidates.len()))
)]
pub fn match_fingerprints(
    candidates: &[Point3<f64>],
    table: &FingerprintTable,
    params: &FingerprintParams,
) -> FingerprintMatch {
    let n = candidates.len();
    let distances = pairwise_distances(candidates);
    let mut found = vec![false; table.len()];
    let mut kept = Vec::new();

    for (q, fingerprint) in table.rows().enumerate() {
        for (i, candidate) in candidates.iter().enumerate() {
            let row = &distances[i * n..(i + 1) * n];
            if supported_distances(row, i, fingerprint, params.tolerance)
                >= params.required_neighbors
            {
                kept.push(*candidate);
                found[q] = true;
            }
        }
    }

    FingerprintMatch {
        candidates: dedup_points(&kept, params.dedup_epsilon),
        found,
    }
}

/// Result of the iterative screening loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    pub candidates: PointSet,
    pub found: Vec<bool>,
    /// Screening passes executed.
    pub iterations: usize,
    /// The pass cap was hit before the candidate count settled.
    pub exhausted: bool,
}

impl Refinement {
    pub fn found_indices(&self) -> Vec<usize> {
        found_indices(&self.found)
    }
}

/// Screen repeatedly, feeding each pass its predecessor's output, until the
/// candidate count is stable or `params.max_iterations` passes have run.
///
/// Hitting the cap is logged and the current set is returned.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(candidates, table, params), fields(candidates = candidates.len(), required = params.required_neighbors))
)]
pub fn refine_candidates(
    candidates: PointSet,
    table: &FingerprintTable,
    params: &FingerprintParams,
) -> Refinement {
    let max_iterations = params.max_iterations.max(1);
    let mut previous_len = candidates.len();
    let mut current = match_fingerprints(&candidates, table, params);
    let mut iterations = 1;
    let mut exhausted = false;

    while current.candidates.len() != previous_len {
        if iterations >= max_iterations {
            log::warn!(
                "fingerprint screening hit the {max_iterations}-pass cap with {} candidates",
                current.candidates.len()
            );
            exhausted = true;
            break;
        }
        previous_len = current.candidates.len();
        current = match_fingerprints(&current.candidates, table, params);
        iterations += 1;
    }

    log::debug!(
        "screening settled on {} candidates after {iterations} passes (found {:?})",
        current.candidates.len(),
        found_indices(&current.found)
    );

    Refinement {
        candidates: current.candidates,
        found: current.found,
        iterations,
        exhausted,
    }
}
