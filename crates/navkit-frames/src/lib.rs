//! Rigidly coupled frame pairs for implant planning.
//!
//! A [`FrameCouple`] links an implant frame (B) to an anatomical frame (A)
//! through a stored relationship. The relationship starts from a nominal
//! inclination/version plan, follows frame A whenever it is moved, and is
//! edited with pivot-preserving translate/rotate operators. Clinical cup
//! angles and pivot offsets are derived from it on demand.

mod angles;
mod couple;
mod error;
mod params;

pub use angles::{cup_angles, frame_offsets, ClinicalAngles, CupAngles, FrameOffsets};
pub use couple::{nominal_relationship, AdjustKind, FrameCouple};
pub use error::FrameError;
pub use params::{CenterOfRotation, CoupleParams, OperationSide, PelvicTilt, Posture};

pub use navkit_core::{Axis, RigidTransform};
