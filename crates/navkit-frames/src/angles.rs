//! Clinical cup angles and pivot offsets.
//!
//! Both are evaluated in a posture-specific world frame: the relationship
//! is rotated about world X by that posture's pelvic tilt.

use nalgebra::{Point3, Vector3};
use navkit_core::{Axis, RigidTransform};
use serde::{Deserialize, Serialize};

use crate::{FrameCouple, FrameError, OperationSide, Posture};

/// Squared-norm floor for the projected cup axis.
const MIN_PROJECTION_NORM: f64 = 1e-12;

/// Version and inclination in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CupAngles {
    /// Positive when anteverted.
    pub version: f64,
    /// Signed by the operation side's mirroring convention.
    pub inclination: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalAngles {
    pub supine: CupAngles,
    pub stand: CupAngles,
    pub sit: CupAngles,
}

impl ClinicalAngles {
    pub fn get(&self, posture: Posture) -> CupAngles {
        match posture {
            Posture::Supine => self.supine,
            Posture::Stand => self.stand,
            Posture::Sit => self.sit,
        }
    }
}

/// Offsets of frame B's origin from the pivot, signed so that superior,
/// medial and anterior are positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameOffsets {
    pub superior_inferior: f64,
    pub medial_lateral: f64,
    pub anterior_posterior: f64,
}

fn tilted(relationship: &RigidTransform, tilt_deg: f64) -> RigidTransform {
    relationship.pre_rotate(Axis::X, tilt_deg)
}

/// Decompose `relationship` into cup angles under `tilt_deg` of pelvic tilt.
///
/// `posture` is only used to label a degenerate result.
pub fn cup_angles(
    relationship: &RigidTransform,
    side: OperationSide,
    tilt_deg: f64,
    posture: Posture,
) -> Result<CupAngles, FrameError> {
    let axis = -tilted(relationship, tilt_deg).axis_in_parent(Axis::Z);
    let version = (-axis.y).clamp(-1.0, 1.0).asin().to_degrees();

    let projected = Vector3::new(axis.x, 0.0, axis.z);
    let norm_sq = projected.norm_squared();
    if norm_sq < MIN_PROJECTION_NORM {
        return Err(FrameError::DegenerateAxis(posture));
    }
    let cos = projected.dot(&Vector3::new(0.0, 0.0, -1.0)) / norm_sq.sqrt();
    let mut inclination = cos.clamp(-1.0, 1.0).acos().to_degrees();

    let flip = match side {
        OperationSide::Right => projected.x > 0.0,
        OperationSide::Left => projected.x < 0.0,
    };
    if flip {
        inclination = -inclination;
    }

    Ok(CupAngles {
        version,
        inclination,
    })
}

/// Offsets of frame B's origin from `pivot` under `tilt_deg`.
pub fn frame_offsets(
    relationship: &RigidTransform,
    pivot: &Point3<f64>,
    tilt_deg: f64,
) -> FrameOffsets {
    let tilt = RigidTransform::from_axis_angle_deg(Axis::X, tilt_deg);
    let pivot = tilt.transform_point(pivot);
    let origin = tilted(relationship, tilt_deg).translation();

    FrameOffsets {
        superior_inferior: origin.z - pivot.z,
        medial_lateral: pivot.x.abs() - origin.x.abs(),
        anterior_posterior: pivot.y - origin.y,
    }
}

impl FrameCouple {
    /// Cup angles in every posture.
    pub fn clinical_angles(&self) -> Result<ClinicalAngles, FrameError> {
        Ok(ClinicalAngles {
            supine: self.cup_angles(Posture::Supine)?,
            stand: self.cup_angles(Posture::Stand)?,
            sit: self.cup_angles(Posture::Sit)?,
        })
    }

    pub fn cup_angles(&self, posture: Posture) -> Result<CupAngles, FrameError> {
        self.ensure_initialized()?;
        let tilt = self.params().pelvic_tilt.get(posture);
        cup_angles(&self.relationship(), self.side(), tilt, posture)
    }

    /// Pivot offsets in the supine posture.
    pub fn offsets(&self) -> Result<FrameOffsets, FrameError> {
        self.offsets_in(Posture::Supine)
    }

    pub fn offsets_in(&self, posture: Posture) -> Result<FrameOffsets, FrameError> {
        self.ensure_initialized()?;
        let tilt = self.params().pelvic_tilt.get(posture);
        Ok(frame_offsets(&self.relationship(), &self.params().pivot(), tilt))
    }
}
