use nalgebra::Vector3;
use navkit_core::{Axis, RigidTransform};
use serde::{Deserialize, Serialize};

use crate::{CoupleParams, FrameError, OperationSide};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Incremental edit applied through [`FrameCouple::adjust`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustKind {
    Translate,
    Rotate,
}

/// Two rigidly linked frames.
///
/// Frame A (the pelvis) is placed in the world by the caller; frame B (the
/// cup) follows through a stored A-to-B relationship. The relationship is
/// set once from the nominal plan and then edited only through the
/// operators below, which keep it rigid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameCouple {
    params: CoupleParams,
    relationship: RigidTransform,
    initialized: bool,
    frame_a_world: RigidTransform,
    frame_b_world: RigidTransform,
}

impl FrameCouple {
    pub fn new(params: CoupleParams) -> Self {
        Self {
            params,
            relationship: RigidTransform::identity(),
            initialized: false,
            frame_a_world: RigidTransform::identity(),
            frame_b_world: RigidTransform::identity(),
        }
    }

    #[inline]
    pub fn params(&self) -> &CoupleParams {
        &self.params
    }

    #[inline]
    pub fn side(&self) -> OperationSide {
        self.params.side
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Pose of frame B relative to frame A.
    #[inline]
    pub fn relationship(&self) -> RigidTransform {
        self.relationship
    }

    /// Last world placement passed to [`set_geometry`](Self::set_geometry).
    #[inline]
    pub fn frame_a_world(&self) -> RigidTransform {
        self.frame_a_world
    }

    #[inline]
    pub fn frame_b_world(&self) -> RigidTransform {
        self.frame_b_world
    }

    /// Install the nominal relationship and place frame B.
    ///
    /// The nominal orientation is the planned inclination and version under
    /// the standing pelvic tilt, centered on the operated side's pivot.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self), fields(side = ?self.params.side))
    )]
    pub fn initialize(&mut self) -> Result<(), FrameError> {
        if self.initialized {
            return Err(FrameError::AlreadyInitialized);
        }
        self.install_nominal();
        self.set_geometry(self.frame_a_world);
        Ok(())
    }

    fn install_nominal(&mut self) {
        self.relationship = nominal_relationship(&self.params);
        self.initialized = true;
        log::debug!(
            "{:?} relationship initialized, origin at {:?}",
            self.params.side,
            self.relationship.translation()
        );
    }

    /// Move frame A to `frame_a_world` and carry frame B along.
    ///
    /// An uninitialized couple is initialized first.
    pub fn set_geometry(&mut self, frame_a_world: RigidTransform) {
        if !self.initialized {
            log::info!("set_geometry on an uninitialized couple, installing the nominal plan");
            self.install_nominal();
        }
        self.frame_b_world = frame_a_world * self.relationship;
        self.frame_a_world = frame_a_world;
    }

    /// Shift frame B along frame A's `axis`.
    pub fn translate(&mut self, axis: Axis, length: f64) -> Result<(), FrameError> {
        self.ensure_initialized()?;
        let mut offset = Vector3::zeros();
        offset[axis.index()] = length;
        self.relationship = self.relationship.pre_translate(offset);
        Ok(())
    }

    /// Turn frame B about frame A's `axis` while keeping its origin fixed.
    pub fn rotate(&mut self, axis: Axis, angle_deg: f64) -> Result<(), FrameError> {
        self.ensure_initialized()?;
        let origin = self.relationship.translation();
        self.relationship = self
            .relationship
            .pre_rotate(axis, angle_deg)
            .with_translation(origin);
        Ok(())
    }

    pub fn translate_x(&mut self, length: f64) -> Result<(), FrameError> {
        self.translate(Axis::X, length)
    }

    pub fn translate_y(&mut self, length: f64) -> Result<(), FrameError> {
        self.translate(Axis::Y, length)
    }

    pub fn translate_z(&mut self, length: f64) -> Result<(), FrameError> {
        self.translate(Axis::Z, length)
    }

    pub fn rotate_x(&mut self, angle_deg: f64) -> Result<(), FrameError> {
        self.rotate(Axis::X, angle_deg)
    }

    pub fn rotate_y(&mut self, angle_deg: f64) -> Result<(), FrameError> {
        self.rotate(Axis::Y, angle_deg)
    }

    pub fn rotate_z(&mut self, angle_deg: f64) -> Result<(), FrameError> {
        self.rotate(Axis::Z, angle_deg)
    }

    /// Apply one edit and refresh frame B's world placement.
    pub fn adjust(&mut self, kind: AdjustKind, axis: Axis, step: f64) -> Result<(), FrameError> {
        match kind {
            AdjustKind::Translate => self.translate(axis, step)?,
            AdjustKind::Rotate => self.rotate(axis, step)?,
        }
        self.set_geometry(self.frame_a_world);
        Ok(())
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), FrameError> {
        if self.initialized {
            Ok(())
        } else {
            Err(FrameError::NotInitialized)
        }
    }
}

/// Nominal A-to-B relationship for `params`.
///
/// Built as the B-to-A placement and inverted. The right side carries an
/// extra half turn about Z and the mirrored rotation signs.
pub fn nominal_relationship(params: &CoupleParams) -> RigidTransform {
    let tilt = params.pelvic_tilt.stand;
    let inclination = params.nominal_inclination;
    let version = params.nominal_version;
    let pivot = params.pivot();

    let b_to_a = match params.side {
        OperationSide::Right => RigidTransform::from_axis_angle_deg(Axis::X, -version)
            .pre_rotate(Axis::Y, inclination)
            .pre_rotate(Axis::X, -tilt)
            .pre_rotate(Axis::Z, 180.0),
        OperationSide::Left => RigidTransform::from_axis_angle_deg(Axis::X, version)
            .pre_rotate(Axis::Y, inclination)
            .pre_rotate(Axis::X, tilt),
    }
    .pre_translate(-pivot.coords);

    b_to_a.inverse()
}
