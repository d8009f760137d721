use super::{FiducialResolverParams, ResolveError, ResolvedMarkers};
use crate::assign::assign_correspondence;
use crate::dedup::dedup_points;
use crate::extract::{extract_candidates, PointCluster};
use crate::fingerprint::{refine_candidates, Refinement};
use crate::reference::{FingerprintTable, ReferenceLayout};
use navkit_core::{KabschRegistration, PointSet, RigidRegistration};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Resolves scan-space fiducial markers against a known reference layout.
///
/// The fingerprint table is computed once at construction and reused by
/// every call. Registration is pluggable through [`RigidRegistration`].
pub struct FiducialResolver<R = KabschRegistration> {
    layout: ReferenceLayout,
    fingerprints: FingerprintTable,
    params: FiducialResolverParams,
    registration: R,
}

impl FiducialResolver<KabschRegistration> {
    pub fn new(layout: ReferenceLayout, params: FiducialResolverParams) -> Self {
        Self::with_registration(layout, params, KabschRegistration)
    }
}

impl<R: RigidRegistration> FiducialResolver<R> {
    pub fn with_registration(
        layout: ReferenceLayout,
        params: FiducialResolverParams,
        registration: R,
    ) -> Self {
        let fingerprints = layout.fingerprints();
        Self {
            layout,
            fingerprints,
            params,
            registration,
        }
    }

    #[inline]
    pub fn layout(&self) -> &ReferenceLayout {
        &self.layout
    }

    #[inline]
    pub fn params(&self) -> &FiducialResolverParams {
        &self.params
    }

    #[inline]
    pub fn fingerprints(&self) -> &FingerprintTable {
        &self.fingerprints
    }

    /// Run a full detection attempt on segmented clusters.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, clusters), fields(clusters = clusters.len()))
    )]
    pub fn resolve(&self, clusters: &[PointCluster]) -> Result<ResolvedMarkers, ResolveError> {
        let extraction = extract_candidates(clusters, &self.params.extraction);
        if extraction.candidates.is_empty() {
            return Err(ResolveError::NoCandidates {
                scale_guard_tripped: extraction.scale_guard_tripped,
            });
        }
        self.resolve_candidates(extraction.candidates)
    }

    /// Run screening, assignment and registration on already extracted
    /// candidate centers.
    ///
    /// More candidates than the labeling search supports surface as
    /// [`AssignError::TooManyCandidates`](crate::AssignError::TooManyCandidates),
    /// not as a best-effort result.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, candidates), fields(candidates = candidates.len()))
    )]
    pub fn resolve_candidates(
        &self,
        candidates: PointSet,
    ) -> Result<ResolvedMarkers, ResolveError> {
        if candidates.is_empty() {
            return Err(ResolveError::NoCandidates {
                scale_guard_tripped: false,
            });
        }
        let extracted = candidates.len();
        let reference_len = self.layout.len();

        let mut refined = refine_candidates(
            candidates,
            &self.fingerprints,
            &self.params.coarse_fingerprint(),
        );
        let mut screening_passes = refined.iterations;
        let mut refinement_exhausted = refined.exhausted;
        let mut strict_fallback = false;

        if refined.candidates.len() > reference_len {
            log::debug!(
                "{} candidates for {reference_len} markers, tightening screening",
                refined.candidates.len()
            );
            let strict = refine_candidates(
                refined.candidates.clone(),
                &self.fingerprints,
                &self.params.strict_fingerprint(reference_len),
            );
            screening_passes += strict.iterations;
            refinement_exhausted |= strict.exhausted;
            if strict.candidates.is_empty() {
                log::warn!(
                    "strict screening removed all {} candidates, keeping the coarse set",
                    refined.candidates.len()
                );
                strict_fallback = true;
            } else {
                refined = strict;
            }
        }

        let Refinement {
            candidates, found, ..
        } = refined;
        let candidates = dedup_points(&candidates, self.params.fingerprint.dedup_epsilon);
        let screened = candidates.len();

        let assignment = assign_correspondence(
            &candidates,
            &self.layout,
            &found,
            &self.registration,
            &self.params.assign,
        )?;

        let resolved = assignment.resolved_indices();
        let registration = self
            .registration
            .register(&self.layout.subset(&resolved), &assignment.ordered_points())?;

        let incomplete = !assignment.unresolved.is_empty();
        let high_residual = registration.avg_error > self.params.max_avg_error;
        if incomplete {
            log::warn!("unresolved reference markers: {:?}", assignment.unresolved);
        }
        if high_residual {
            log::warn!(
                "mean registration residual {:.3} exceeds {:.3}",
                registration.avg_error,
                self.params.max_avg_error
            );
        }
        log::info!(
            "resolved {}/{reference_len} markers (max {:.3}, avg {:.3})",
            resolved.len(),
            registration.max_error,
            registration.avg_error
        );

        Ok(ResolvedMarkers {
            markers: assignment.markers,
            unresolved: assignment.unresolved,
            registration,
            extracted,
            screened,
            screening_passes,
            labelings_evaluated: assignment.evaluated,
            refinement_exhausted,
            strict_fallback,
            search_exhausted: assignment.search_exhausted,
            incomplete,
            high_residual,
        })
    }
}
