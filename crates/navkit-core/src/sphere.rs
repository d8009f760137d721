use nalgebra::{DMatrix, DVector, Point3};
use serde::{Deserialize, Serialize};

use crate::centroid;

/// Relative singular-value floor below which the fit is rank deficient.
const RANK_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SphereFitError {
    #[error("sphere fit needs at least 4 points, got {0}")]
    TooFewPoints(usize),
    #[error("sample points are coplanar or otherwise degenerate")]
    Degenerate,
}

/// Linear least-squares sphere fit.
///
/// Solves `x² + y² + z² = 2ax + 2by + 2cz + d` for the center `(a, b, c)`
/// and `d = r² - a² - b² - c²`. Points are centered on their centroid first
/// so the system stays well conditioned for clusters far from the origin.
pub fn fit_sphere(points: &[Point3<f64>]) -> Result<Sphere, SphereFitError> {
    if points.len() < 4 {
        return Err(SphereFitError::TooFewPoints(points.len()));
    }
    let origin = centroid(points).ok_or(SphereFitError::TooFewPoints(0))?;

    let n = points.len();
    let mut a = DMatrix::<f64>::zeros(n, 4);
    let mut b = DVector::<f64>::zeros(n);
    for (row, p) in points.iter().enumerate() {
        let v = p - origin;
        a[(row, 0)] = 2.0 * v.x;
        a[(row, 1)] = 2.0 * v.y;
        a[(row, 2)] = 2.0 * v.z;
        a[(row, 3)] = 1.0;
        b[row] = v.norm_squared();
    }

    let svd = a.svd(true, true);
    let max_sv = svd.singular_values.max();
    let min_sv = svd.singular_values.min();
    if !max_sv.is_finite() || max_sv <= 0.0 || min_sv <= RANK_TOLERANCE * max_sv {
        return Err(SphereFitError::Degenerate);
    }
    let x = svd
        .solve(&b, RANK_TOLERANCE * max_sv)
        .map_err(|_| SphereFitError::Degenerate)?;

    let c = nalgebra::Vector3::new(x[0], x[1], x[2]);
    let r2 = x[3] + c.norm_squared();
    if !r2.is_finite() || r2 <= 0.0 {
        return Err(SphereFitError::Degenerate);
    }

    Ok(Sphere {
        center: origin + c,
        radius: r2.sqrt(),
    })
}
