//! Paired-point rigid registration.
//!
//! The resolver consumes registration through [`RigidRegistration`], so a
//! host application can plug in its own landmark registration. The default
//! [`KabschRegistration`] is an SVD-based least-squares fit.

use nalgebra::{Matrix3, Point3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::RigidTransform;

/// Best-fit transform mapping `source` onto `target` plus residuals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub transform: RigidTransform,
    /// Largest Euclidean residual over all pairs.
    pub max_error: f64,
    /// Mean Euclidean residual.
    pub avg_error: f64,
}

impl Registration {
    /// Score used to rank candidate labelings: `max_error + avg_error`.
    pub fn score(&self) -> f64 {
        self.max_error + self.avg_error
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("point set lengths differ (source={source_len}, target={target_len})")]
    LengthMismatch {
        source_len: usize,
        target_len: usize,
    },
    #[error("registration needs at least 3 pairs, got {0}")]
    TooFewPairs(usize),
    #[error("SVD did not converge")]
    SvdFailed,
}

pub trait RigidRegistration {
    /// Compute the transform `T` minimizing `sum |T * source[i] - target[i]|²`.
    fn register(
        &self,
        source: &[Point3<f64>],
        target: &[Point3<f64>],
    ) -> Result<Registration, RegistrationError>;
}

impl<R: RigidRegistration + ?Sized> RigidRegistration for &R {
    fn register(
        &self,
        source: &[Point3<f64>],
        target: &[Point3<f64>],
    ) -> Result<Registration, RegistrationError> {
        (**self).register(source, target)
    }
}

/// Kabsch / Umeyama fit without scale; reflections are corrected.
#[derive(Clone, Copy, Debug, Default)]
pub struct KabschRegistration;

impl RigidRegistration for KabschRegistration {
    fn register(
        &self,
        source: &[Point3<f64>],
        target: &[Point3<f64>],
    ) -> Result<Registration, RegistrationError> {
        if source.len() != target.len() {
            return Err(RegistrationError::LengthMismatch {
                source_len: source.len(),
                target_len: target.len(),
            });
        }
        if source.len() < 3 {
            return Err(RegistrationError::TooFewPairs(source.len()));
        }

        let n = source.len() as f64;
        let mut c_src = Vector3::zeros();
        let mut c_dst = Vector3::zeros();
        for (s, t) in source.iter().zip(target) {
            c_src += s.coords;
            c_dst += t.coords;
        }
        c_src /= n;
        c_dst /= n;

        let mut h = Matrix3::zeros();
        for (s, t) in source.iter().zip(target) {
            h += (t.coords - c_dst) * (s.coords - c_src).transpose();
        }

        let svd = h.svd(true, true);
        let u = svd.u.ok_or(RegistrationError::SvdFailed)?;
        let v_t = svd.v_t.ok_or(RegistrationError::SvdFailed)?;
        let mut r = u * v_t;
        if r.determinant() < 0.0 {
            let mut u_fix = u;
            u_fix.column_mut(2).neg_mut();
            r = u_fix * v_t;
        }

        let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r));
        let translation = c_dst - rotation * c_src;
        let transform = RigidTransform::from_parts(rotation, translation);

        let (max_error, sum) = source
            .iter()
            .zip(target)
            .map(|(s, t)| (transform.transform_point(s) - t).norm())
            .fold((0.0_f64, 0.0_f64), |(mx, sum), e| (mx.max(e), sum + e));

        Ok(Registration {
            transform,
            max_error,
            avg_error: sum / n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Axis;
    use approx::assert_relative_eq;

    fn layout() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(12.5, 3.1, 0.8),
            Point3::new(25.7, -1.9, 2.2),
            Point3::new(6.1, 18.4, -3.5),
            Point3::new(19.3, 21.7, 4.9),
        ]
    }

    #[test]
    fn recovers_known_transform() {
        let truth = RigidTransform::from_axis_angle_deg(Axis::Z, 33.0)
            .pre_rotate(Axis::X, -21.0)
            .pre_translate(Vector3::new(40.0, -12.0, 7.0));
        let src = layout();
        let dst: Vec<_> = src.iter().map(|p| truth.transform_point(p)).collect();

        let reg = KabschRegistration.register(&src, &dst).expect("register");
        assert_relative_eq!(reg.transform.to_matrix(), truth.to_matrix(), epsilon = 1e-9);
        assert!(reg.max_error < 1e-9);
        assert!(reg.avg_error < 1e-9);
    }

    #[test]
    fn mirrored_targets_do_not_yield_a_reflection() {
        let src = layout();
        let dst: Vec<_> = src.iter().map(|p| Point3::new(-p.x, p.y, p.z)).collect();
        let reg = KabschRegistration.register(&src, &dst).expect("register");
        assert_relative_eq!(reg.transform.rotation_matrix().determinant(), 1.0, epsilon = 1e-9);
        assert!(reg.max_error > 1.0);
    }

    #[test]
    fn residuals_report_max_and_mean() {
        let src = layout();
        let mut dst = src.clone();
        dst[4].z += 2.0;
        let reg = KabschRegistration.register(&src, &dst).expect("register");
        assert!(reg.max_error > reg.avg_error);
        assert_relative_eq!(reg.score(), reg.max_error + reg.avg_error);
    }

    #[test]
    fn rejects_bad_inputs() {
        let src = layout();
        assert_eq!(
            KabschRegistration.register(&src, &src[..4]),
            Err(RegistrationError::LengthMismatch {
                source_len: 5,
                target_len: 4
            })
        );
        assert_eq!(
            KabschRegistration.register(&src[..2], &src[..2]),
            Err(RegistrationError::TooFewPairs(2))
        );
    }
}
