use nalgebra::{
    Isometry3, Matrix3, Matrix4, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3,
};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Principal axis of a frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

/// Rotation + translation, no scale or shear.
///
/// Backed by an isometry, so the rotation block stays orthonormal after any
/// edit. `a * b` is the matrix product: `b` is applied first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub iso: Isometry3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    pub fn new(iso: Isometry3<f64>) -> Self {
        Self { iso }
    }

    pub fn identity() -> Self {
        Self::new(Isometry3::identity())
    }

    pub fn from_parts(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self::new(Isometry3::from_parts(Translation3::from(translation), rotation))
    }

    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::from_parts(UnitQuaternion::identity(), translation)
    }

    /// Pure rotation of `angle_deg` degrees about `axis` (right-handed).
    pub fn from_axis_angle_deg(axis: Axis, angle_deg: f64) -> Self {
        Self::from_parts(
            UnitQuaternion::from_axis_angle(&axis.unit(), angle_deg.to_radians()),
            Vector3::zeros(),
        )
    }

    /// Build from a homogeneous 4x4 matrix.
    ///
    /// The upper-left block is projected onto the nearest rotation; a matrix
    /// with scale or shear is a caller error and is not reported.
    pub fn from_matrix(m: &Matrix4<f64>) -> Self {
        let block: Matrix3<f64> = m.fixed_view::<3, 3>(0, 0).into_owned();
        let rotation = Rotation3::from_matrix(&block);
        let translation = Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
        Self::from_parts(UnitQuaternion::from_rotation_matrix(&rotation), translation)
    }

    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self::from_matrix(&Matrix4::from_fn(|r, c| rows[r][c]))
    }

    pub fn to_matrix(&self) -> Matrix4<f64> {
        self.iso.to_homogeneous()
    }

    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        let m = self.to_matrix();
        std::array::from_fn(|r| std::array::from_fn(|c| m[(r, c)]))
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.iso.translation.vector
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.iso.rotation
    }

    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.iso.rotation.to_rotation_matrix().into_inner()
    }

    /// Same orientation, translation replaced by `translation`.
    pub fn with_translation(self, translation: Vector3<f64>) -> Self {
        Self::from_parts(self.iso.rotation, translation)
    }

    /// Local `axis` of this frame expressed in the parent frame.
    pub fn axis_in_parent(&self, axis: Axis) -> Vector3<f64> {
        self.iso.rotation * axis.unit().into_inner()
    }

    /// Rotate about the parent frame's `axis`: `R * self`.
    ///
    /// The translation is rotated as well.
    pub fn pre_rotate(self, axis: Axis, angle_deg: f64) -> Self {
        Self::from_axis_angle_deg(axis, angle_deg) * self
    }

    /// Translate in the parent frame: `T * self`.
    pub fn pre_translate(self, offset: Vector3<f64>) -> Self {
        Self::from_translation(offset) * self
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.iso.inverse())
    }

    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.iso.transform_point(p)
    }

    pub fn is_identity(&self, eps: f64) -> bool {
        (self.to_matrix() - Matrix4::identity()).amax() <= eps
    }
}

impl Mul for RigidTransform {
    type Output = RigidTransform;

    fn mul(self, rhs: RigidTransform) -> RigidTransform {
        RigidTransform::new(self.iso * rhs.iso)
    }
}
