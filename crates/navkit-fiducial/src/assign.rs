//! Correspondence assignment by exhaustive labeling search.
//!
//! Every injective labeling between the screened candidates and the found
//! reference markers is registered and scored with `max_error + avg_error`.
//! The search is factorial by construction and is bounded by
//! [`MAX_ASSIGNMENT_CANDIDATES`] and [`MAX_REFERENCE_MARKERS`].
//!
//! [`MAX_REFERENCE_MARKERS`]: crate::MAX_REFERENCE_MARKERS

use nalgebra::Point3;
use navkit_core::{PointSet, Registration, RegistrationError, RigidRegistration};
use serde::{Deserialize, Serialize};

use crate::fingerprint::found_indices;
use crate::reference::ReferenceLayout;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Largest candidate set accepted by the labeling search (9P8 labelings).
pub const MAX_ASSIGNMENT_CANDIDATES: usize = 9;

/// Fewest labeled pairs that pin down a rigid transform.
pub const MIN_ASSIGNMENT_PAIRS: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignParams {
    /// Stop searching once a labeling scores below this value.
    pub good_enough_score: f64,
}

impl Default for AssignParams {
    fn default() -> Self {
        Self {
            good_enough_score: 1.0,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AssignError {
    #[error("no reference marker was found by screening")]
    NoReferenceFound,
    #[error("only {pairs} labeled pairs available, at least {MIN_ASSIGNMENT_PAIRS} required")]
    UnderDetermined { pairs: usize },
    #[error("{count} candidates exceed the supported maximum of {max}")]
    TooManyCandidates { count: usize, max: usize },
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Best labeling found by the search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// `markers[q]` is the candidate labeled as reference marker `q`.
    pub markers: Vec<Option<Point3<f64>>>,
    /// Reference indices without a candidate.
    pub unresolved: Vec<usize>,
    /// Registration of the labeled reference markers onto their candidates.
    pub registration: Registration,
    /// Labelings registered before the search stopped.
    pub evaluated: usize,
    /// No labeling reached `good_enough_score`.
    pub search_exhausted: bool,
}

impl Assignment {
    pub fn score(&self) -> f64 {
        self.registration.score()
    }

    /// Resolved reference indices, ascending.
    pub fn resolved_indices(&self) -> Vec<usize> {
        self.markers
            .iter()
            .enumerate()
            .filter_map(|(q, m)| m.map(|_| q))
            .collect()
    }

    /// Resolved candidates in reference order.
    pub fn ordered_points(&self) -> PointSet {
        self.markers.iter().flatten().copied().collect()
    }
}

/// Advance `a` to its lexicographic successor; `false` once wrapped.
fn next_permutation(a: &mut [usize]) -> bool {
    let n = a.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && a[i - 1] >= a[i] {
        i -= 1;
    }
    if i == 0 {
        a.reverse();
        return false;
    }
    let mut j = n - 1;
    while a[j] <= a[i - 1] {
        j -= 1;
    }
    a.swap(i - 1, j);
    a[i..].reverse();
    true
}

/// Advance to the next distinct prefix `a[..k]` in lexicographic order.
///
/// Reversing the (ascending) tail makes the current arrangement the last one
/// sharing its prefix, so the following permutation changes the prefix.
fn next_k_permutation(a: &mut [usize], k: usize) -> bool {
    a[k..].reverse();
    next_permutation(a)
}

/// Pair found reference markers with candidates, `(reference, candidate)`.
fn labeling(
    perm: &[usize],
    k: usize,
    found: &[usize],
    permute_candidates: bool,
) -> Vec<(usize, usize)> {
    if permute_candidates {
        (0..k).map(|j| (found[j], perm[j])).collect()
    } else {
        (0..k).map(|j| (found[perm[j]], j)).collect()
    }
}

/// Label `candidates` with reference indices.
///
/// Only reference indices flagged in `found` take part. When there are at
/// least as many candidates as found markers, candidate orderings are
/// searched; otherwise each candidate is given a distinct found marker and
/// the leftovers end up in [`Assignment::unresolved`]. The search keeps the
/// lowest score seen and stops early below `params.good_enough_score`, so
/// the result is deterministic for a given candidate order but not always
/// the global optimum.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(candidates = candidates.len()))
)]
pub fn assign_correspondence<R: RigidRegistration>(
    candidates: &[Point3<f64>],
    layout: &ReferenceLayout,
    found: &[bool],
    registration: &R,
    params: &AssignParams,
) -> Result<Assignment, AssignError> {
    let found: Vec<usize> = found_indices(found)
        .into_iter()
        .filter(|&q| q < layout.len())
        .collect();
    if found.is_empty() {
        return Err(AssignError::NoReferenceFound);
    }
    if candidates.len() > MAX_ASSIGNMENT_CANDIDATES {
        log::warn!(
            "{} candidates exceed the labeling search limit of {}",
            candidates.len(),
            MAX_ASSIGNMENT_CANDIDATES
        );
        return Err(AssignError::TooManyCandidates {
            count: candidates.len(),
            max: MAX_ASSIGNMENT_CANDIDATES,
        });
    }

    let k = candidates.len().min(found.len());
    if k < MIN_ASSIGNMENT_PAIRS {
        return Err(AssignError::UnderDetermined { pairs: k });
    }

    let permute_candidates = candidates.len() >= found.len();
    let mut perm: Vec<usize> = if permute_candidates {
        (0..candidates.len()).collect()
    } else {
        (0..found.len()).collect()
    };

    let mut best: Option<(Registration, Vec<(usize, usize)>)> = None;
    let mut evaluated = 0usize;
    let mut reached_good = false;
    let mut source = Vec::with_capacity(k);
    let mut target = Vec::with_capacity(k);

    loop {
        let pairs = labeling(&perm, k, &found, permute_candidates);
        source.clear();
        target.clear();
        for &(q, c) in &pairs {
            source.push(layout.markers()[q]);
            target.push(candidates[c]);
        }

        let reg = registration.register(&source, &target)?;
        evaluated += 1;
        let score = reg.score();
        if best.as_ref().is_none_or(|(b, _)| score < b.score()) {
            best = Some((reg, pairs));
        }
        if score < params.good_enough_score {
            reached_good = true;
            break;
        }
        if !next_k_permutation(&mut perm, k) {
            break;
        }
    }

    let (registration, pairs) = best.ok_or(AssignError::UnderDetermined { pairs: 0 })?;
    let mut markers = vec![None; layout.len()];
    for (q, c) in pairs {
        markers[q] = Some(candidates[c]);
    }
    let unresolved: Vec<usize> = markers
        .iter()
        .enumerate()
        .filter_map(|(q, m)| m.is_none().then_some(q))
        .collect();

    if reached_good {
        log::debug!(
            "labeling accepted after {evaluated} evaluations (score {:.3})",
            registration.score()
        );
    } else {
        log::warn!(
            "labeling search exhausted after {evaluated} evaluations, best score {:.3}",
            registration.score()
        );
    }

    Ok(Assignment {
        markers,
        unresolved,
        registration,
        evaluated,
        search_exhausted: !reached_good,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use navkit_core::{Axis, KabschRegistration, RigidTransform};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn layout() -> ReferenceLayout {
        ReferenceLayout::from_flat(&[
            0.0, 0.0, 0.0, //
            12.5, 3.1, 0.8, //
            25.7, -1.9, 2.2, //
            6.1, 18.4, -3.5, //
            19.3, 21.7, 4.9, //
            -8.2, 11.6, 6.3, //
            31.4, 14.2, -5.1,
        ])
        .expect("layout")
    }

    #[test]
    fn k_permutations_visit_each_prefix_once() {
        let mut a = vec![0, 1, 2, 3];
        let mut prefixes = vec![a[..2].to_vec()];
        while next_k_permutation(&mut a, 2) {
            prefixes.push(a[..2].to_vec());
        }
        assert_eq!(prefixes.len(), 12);
        let mut dedup = prefixes.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), 12);
        assert_eq!(prefixes, dedup, "prefixes come in lexicographic order");
    }

    #[test]
    fn full_permutations_when_k_equals_n() {
        let mut a = vec![0, 1, 2];
        let mut count = 1;
        while next_k_permutation(&mut a, 3) {
            count += 1;
        }
        assert_eq!(count, 6);
    }

    #[test]
    fn shuffled_reference_is_relabeled_exactly() {
        let layout = layout();
        let pose = RigidTransform::from_axis_angle_deg(Axis::Y, 71.0)
            .pre_translate(Vector3::new(-5.0, 3.0, 120.0));
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..5 {
            let mut order: Vec<usize> = (0..layout.len()).collect();
            order.shuffle(&mut rng);
            let candidates: Vec<_> = order
                .iter()
                .map(|&q| pose.transform_point(&layout.markers()[q]))
                .collect();

            let out = assign_correspondence(
                &candidates,
                &layout,
                &[true; 7],
                &KabschRegistration,
                &AssignParams::default(),
            )
            .expect("assign");

            assert!(out.score() < 1e-6);
            assert!(!out.search_exhausted);
            let reversed: Vec<usize> = (0..layout.len()).rev().collect();
            if order != reversed {
                assert!(out.evaluated < 5040, "{order:?} took {}", out.evaluated);
            }
            assert!(out.unresolved.is_empty());
            for (q, m) in out.markers.iter().enumerate() {
                let expected = pose.transform_point(&layout.markers()[q]);
                assert!((m.expect("resolved") - expected).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn early_exit_skips_remaining_labelings() {
        let layout = layout();
        let in_order = assign_correspondence(
            layout.markers(),
            &layout,
            &[true; 7],
            &KabschRegistration,
            &AssignParams::default(),
        )
        .expect("assign");
        assert_eq!(in_order.evaluated, 1);
        assert!(!in_order.search_exhausted);
    }

    #[test]
    fn last_labeling_in_order_is_still_accepted() {
        let layout = layout();
        // reversed order puts the correct labeling last in lexicographic order
        let candidates: Vec<_> = layout.markers().iter().rev().copied().collect();
        let out = assign_correspondence(
            &candidates,
            &layout,
            &[true; 7],
            &KabschRegistration,
            &AssignParams::default(),
        )
        .expect("assign");
        assert!(out.score() < 1e-6);
        assert_eq!(out.evaluated, 5040);
        assert!(!out.search_exhausted);
    }

    #[test]
    fn fewer_candidates_than_found_leaves_markers_unresolved() {
        let layout = layout();
        let candidates: Vec<_> = [0usize, 2, 4, 6]
            .iter()
            .map(|&q| layout.markers()[q])
            .collect();
        let out = assign_correspondence(
            &candidates,
            &layout,
            &[true; 7],
            &KabschRegistration,
            &AssignParams::default(),
        )
        .expect("assign");
        assert_eq!(out.resolved_indices(), vec![0, 2, 4, 6]);
        assert_eq!(out.unresolved, vec![1, 3, 5]);
        assert_eq!(out.ordered_points(), candidates);
    }

    #[test]
    fn rejects_unsupported_inputs() {
        let layout = layout();
        let two = &layout.markers()[..2];
        assert_eq!(
            assign_correspondence(
                two,
                &layout,
                &[true; 7],
                &KabschRegistration,
                &AssignParams::default()
            ),
            Err(AssignError::UnderDetermined { pairs: 2 })
        );
        assert_eq!(
            assign_correspondence(
                layout.markers(),
                &layout,
                &[false; 7],
                &KabschRegistration,
                &AssignParams::default()
            ),
            Err(AssignError::NoReferenceFound)
        );
        let many = vec![Point3::origin(); 10];
        assert!(matches!(
            assign_correspondence(
                &many,
                &layout,
                &[true; 7],
                &KabschRegistration,
                &AssignParams::default()
            ),
            Err(AssignError::TooManyCandidates { count: 10, .. })
        ));
    }
}
