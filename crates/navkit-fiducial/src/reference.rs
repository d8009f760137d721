use nalgebra::Point3;
use navkit_core::points_from_flat;
use serde::{Deserialize, Serialize};

/// Largest reference layout the resolver supports.
///
/// Correspondence assignment is a permutation search, so the marker count
/// is bounded structurally instead of generalized.
pub const MAX_REFERENCE_MARKERS: usize = 8;

/// Smallest layout that still defines a rigid registration.
pub const MIN_REFERENCE_MARKERS: usize = 3;

const COINCIDENT_EPS: f64 = 1e-9;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("flat coordinate array length {0} is not a multiple of 3")]
    NotFlatTriples(usize),
    #[error("reference layout has {count} markers, at least {min} required")]
    TooFewMarkers { count: usize, min: usize },
    #[error("reference layout has {count} markers, at most {max} supported")]
    TooManyMarkers { count: usize, max: usize },
    #[error("reference markers {a} and {b} coincide")]
    CoincidentMarkers { a: usize, b: usize },
}

/// Known marker positions in the canonical (model) frame, index = marker id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point3<f64>>", into = "Vec<Point3<f64>>")]
pub struct ReferenceLayout {
    markers: Vec<Point3<f64>>,
}

impl ReferenceLayout {
    pub fn new(markers: Vec<Point3<f64>>) -> Result<Self, ReferenceError> {
        let count = markers.len();
        if count < MIN_REFERENCE_MARKERS {
            return Err(ReferenceError::TooFewMarkers {
                count,
                min: MIN_REFERENCE_MARKERS,
            });
        }
        if count > MAX_REFERENCE_MARKERS {
            return Err(ReferenceError::TooManyMarkers {
                count,
                max: MAX_REFERENCE_MARKERS,
            });
        }
        for a in 0..count {
            for b in (a + 1)..count {
                if nalgebra::distance(&markers[a], &markers[b]) < COINCIDENT_EPS {
                    return Err(ReferenceError::CoincidentMarkers { a, b });
                }
            }
        }
        Ok(Self { markers })
    }

    /// Build from `[x0, y0, z0, x1, ...]`.
    pub fn from_flat(flat: &[f64]) -> Result<Self, ReferenceError> {
        let markers = points_from_flat(flat).ok_or(ReferenceError::NotFlatTriples(flat.len()))?;
        Self::new(markers)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &[Point3<f64>] {
        &self.markers
    }

    pub fn marker(&self, index: usize) -> Option<Point3<f64>> {
        self.markers.get(index).copied()
    }

    /// Markers at `indices`, in that order. Out-of-range indices are skipped.
    pub fn subset(&self, indices: &[usize]) -> Vec<Point3<f64>> {
        indices.iter().filter_map(|&i| self.marker(i)).collect()
    }

    pub fn fingerprints(&self) -> FingerprintTable {
        FingerprintTable::from_layout(self)
    }
}

impl TryFrom<Vec<Point3<f64>>> for ReferenceLayout {
    type Error = ReferenceError;

    fn try_from(markers: Vec<Point3<f64>>) -> Result<Self, Self::Error> {
        Self::new(markers)
    }
}

impl From<ReferenceLayout> for Vec<Point3<f64>> {
    fn from(layout: ReferenceLayout) -> Self {
        layout.markers
    }
}

/// Per-marker distance signatures of a reference layout.
///
/// Row `q` holds the `N - 1` distances from marker `q` to every other
/// marker, in increasing marker order. Computed once per session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FingerprintTable {
    rows: Vec<Vec<f64>>,
}

impl FingerprintTable {
    pub fn from_layout(layout: &ReferenceLayout) -> Self {
        let markers = layout.markers();
        let rows = markers
            .iter()
            .enumerate()
            .map(|(i, p)| {
                markers
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, q)| nalgebra::distance(p, q))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Number of reference markers (targets).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of each fingerprint (`N - 1`).
    pub fn fingerprint_len(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
