//! JSON configuration and report helpers.

use crate::{
    ClinicalAngles, CoupleParams, FiducialResolver, FiducialResolverParams, FrameCouple,
    FrameError, FrameOffsets, ReferenceLayout, ResolveError, ResolvedMarkers,
};
use nalgebra::Point3;
use navkit_fiducial::ReferenceError;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum NavkitIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NavkitConfigError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavkitConfig {
    /// Reference marker positions in model coordinates, index = marker id.
    pub reference: Vec<Point3<f64>>,
    #[serde(default)]
    pub resolver: FiducialResolverParams,
    /// Planning setup; without it no angles are reported.
    #[serde(default)]
    pub couple: Option<CoupleParams>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl NavkitConfig {
    pub fn new(reference: Vec<Point3<f64>>) -> Self {
        Self {
            reference,
            resolver: FiducialResolverParams::default(),
            couple: None,
            output_path: None,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, NavkitIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), NavkitIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("navkit_resolve_report.json"))
    }

    pub fn build_layout(&self) -> Result<ReferenceLayout, NavkitConfigError> {
        Ok(ReferenceLayout::new(self.reference.clone())?)
    }

    pub fn build_resolver(&self) -> Result<FiducialResolver, NavkitConfigError> {
        Ok(FiducialResolver::new(
            self.build_layout()?,
            self.resolver.clone(),
        ))
    }

    pub fn build_couple(&self) -> Option<FrameCouple> {
        self.couple.clone().map(FrameCouple::new)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveReport {
    pub config_path: String,
    pub num_reference_markers: usize,
    pub num_clusters: usize,
    #[serde(default)]
    pub resolved: Option<ResolvedMarkers>,
    #[serde(default)]
    pub clinical_angles: Option<ClinicalAngles>,
    #[serde(default)]
    pub offsets: Option<FrameOffsets>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ResolveReport {
    /// Build a base report from the input config.
    pub fn new(cfg: &NavkitConfig, config_path: &Path, num_clusters: usize) -> Self {
        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            num_reference_markers: cfg.reference.len(),
            num_clusters,
            resolved: None,
            clinical_angles: None,
            offsets: None,
            error: None,
        }
    }

    pub fn set_resolution(&mut self, res: ResolvedMarkers) {
        self.resolved = Some(res);
        self.error = None;
    }

    /// Record planning values derived from an initialized couple.
    pub fn set_planning(&mut self, couple: &FrameCouple) -> Result<(), FrameError> {
        self.clinical_angles = Some(couple.clinical_angles()?);
        self.offsets = Some(couple.offsets()?);
        Ok(())
    }

    /// Record a resolution error.
    pub fn set_error(&mut self, err: ResolveError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, NavkitIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), NavkitIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
