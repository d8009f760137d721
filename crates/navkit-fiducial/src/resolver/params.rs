use crate::assign::AssignParams;
use crate::extract::ExtractionParams;
use crate::fingerprint::FingerprintParams;
use serde::{Deserialize, Serialize};

/// Configuration for [`FiducialResolver`](super::FiducialResolver).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiducialResolverParams {
    pub extraction: ExtractionParams,
    /// Shared screening settings. `required_neighbors` is overridden per
    /// stage by the two fields below.
    pub fingerprint: FingerprintParams,
    /// Required fingerprint support for the first screening stage.
    pub coarse_required_neighbors: usize,
    /// Required support for the second stage, run only while more
    /// candidates than reference markers remain. `None` means `N - 1`.
    pub strict_required_neighbors: Option<usize>,
    pub assign: AssignParams,
    /// Mean residual above which the result is flagged `high_residual`.
    pub max_avg_error: f64,
}

impl Default for FiducialResolverParams {
    fn default() -> Self {
        Self {
            extraction: ExtractionParams::default(),
            fingerprint: FingerprintParams::default(),
            coarse_required_neighbors: 4,
            strict_required_neighbors: None,
            assign: AssignParams::default(),
            max_avg_error: 1.0,
        }
    }
}

impl FiducialResolverParams {
    pub(crate) fn coarse_fingerprint(&self) -> FingerprintParams {
        self.fingerprint
            .clone()
            .with_required_neighbors(self.coarse_required_neighbors)
    }

    pub(crate) fn strict_fingerprint(&self, reference_len: usize) -> FingerprintParams {
        let required = self
            .strict_required_neighbors
            .unwrap_or(reference_len.saturating_sub(1));
        self.fingerprint.clone().with_required_neighbors(required)
    }
}
