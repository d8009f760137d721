//! High-level facade crate for the `navkit-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the underlying crates
//! - JSON configuration and report helpers tying fiducial resolution to
//!   implant frame planning
//!
//! ## Quickstart
//!
//! ```no_run
//! use navkit::{NavkitConfig, PointCluster};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = NavkitConfig::load_json("navkit.json")?;
//! let resolver = cfg.build_resolver()?;
//! let clusters: Vec<PointCluster> = Vec::new(); // from the segmentation stage
//! match resolver.resolve(&clusters) {
//!     Ok(res) => println!("resolved {} markers", res.resolved_count()),
//!     Err(err) => println!("resolution failed: {err}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `navkit::core`: points, rigid transforms, sphere fitting, registration, logging.
//! - `navkit::fiducial`: candidate extraction, fingerprint screening, labeling.
//! - `navkit::frames`: frame couples, clinical angles and offsets.

mod io;

pub use navkit_core as core;
pub use navkit_fiducial as fiducial;
pub use navkit_frames as frames;

pub use io::{NavkitConfig, NavkitConfigError, NavkitIoError, ResolveReport};
pub use navkit_core::{Axis, RigidTransform};
pub use navkit_fiducial::{
    FiducialResolver, FiducialResolverParams, PointCluster, ReferenceLayout, ResolveError,
    ResolvedMarkers,
};
pub use navkit_frames::{
    AdjustKind, ClinicalAngles, CoupleParams, FrameCouple, FrameError, FrameOffsets,
    OperationSide, PelvicTilt, Posture,
};
