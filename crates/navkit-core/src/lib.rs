//! Core types and primitives for fiducial-based navigation.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any image, mesh or tracking-device type: point sets are plain
//! `nalgebra` points and rigid transforms are isometries.

mod logger;
mod points;
mod registration;
mod rigid;
mod sphere;

pub use points::{centroid, points_from_flat, PointSet};
pub use registration::{KabschRegistration, Registration, RegistrationError, RigidRegistration};
pub use rigid::{Axis, RigidTransform};
pub use sphere::{fit_sphere, Sphere, SphereFitError};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
