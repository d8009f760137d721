use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Operated hip.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationSide {
    #[default]
    Right,
    Left,
}

/// Patient posture used to evaluate clinical angles.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    Supine,
    Stand,
    Sit,
}

impl Posture {
    pub const ALL: [Posture; 3] = [Posture::Supine, Posture::Stand, Posture::Sit];
}

/// Pelvic tilt per posture in degrees, anterior positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PelvicTilt {
    pub supine: f64,
    pub stand: f64,
    pub sit: f64,
}

impl PelvicTilt {
    pub fn uniform(tilt_deg: f64) -> Self {
        Self {
            supine: tilt_deg,
            stand: tilt_deg,
            sit: tilt_deg,
        }
    }

    pub fn get(&self, posture: Posture) -> f64 {
        match posture {
            Posture::Supine => self.supine,
            Posture::Stand => self.stand,
            Posture::Sit => self.sit,
        }
    }
}

/// Hip centers of rotation, expressed in frame A.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterOfRotation {
    pub right: Point3<f64>,
    pub left: Point3<f64>,
}

impl Default for CenterOfRotation {
    fn default() -> Self {
        Self {
            right: Point3::origin(),
            left: Point3::origin(),
        }
    }
}

impl CenterOfRotation {
    pub fn pivot(&self, side: OperationSide) -> Point3<f64> {
        match side {
            OperationSide::Right => self.right,
            OperationSide::Left => self.left,
        }
    }
}

/// Configuration for a [`FrameCouple`](crate::FrameCouple).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoupleParams {
    pub side: OperationSide,
    /// Planned inclination in degrees, evaluated standing.
    pub nominal_inclination: f64,
    /// Planned version (anteversion) in degrees, evaluated standing.
    pub nominal_version: f64,
    pub pelvic_tilt: PelvicTilt,
    pub pivots: CenterOfRotation,
}

impl Default for CoupleParams {
    fn default() -> Self {
        Self {
            side: OperationSide::Right,
            nominal_inclination: 40.0,
            nominal_version: 20.0,
            pelvic_tilt: PelvicTilt::default(),
            pivots: CenterOfRotation::default(),
        }
    }
}

impl CoupleParams {
    pub fn for_side(side: OperationSide) -> Self {
        Self {
            side,
            ..Self::default()
        }
    }

    /// Pivot of the operated side.
    pub fn pivot(&self) -> Point3<f64> {
        self.pivots.pivot(self.side)
    }
}
