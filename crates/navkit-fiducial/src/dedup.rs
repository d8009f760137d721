use nalgebra::Point3;
use navkit_core::PointSet;

/// Default merge radius for duplicate detections.
pub const DEFAULT_DEDUP_EPSILON: f64 = 0.05;

/// First-seen-wins deduplication.
///
/// Points are scanned in order and a point is kept only when it is at least
/// `epsilon` away from every point kept so far. No averaging is done, so the
/// result depends on input order.
pub fn dedup_points(points: &[Point3<f64>], epsilon: f64) -> PointSet {
    let mut kept: PointSet = Vec::with_capacity(points.len());
    for p in points {
        if kept.iter().all(|k| nalgebra::distance(k, p) >= epsilon) {
            kept.push(*p);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn near_duplicates_collapse_to_first() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.01, 2.0, 3.0);
        assert_eq!(dedup_points(&[a, b], DEFAULT_DEDUP_EPSILON), vec![a]);
        assert_eq!(dedup_points(&[b, a], DEFAULT_DEDUP_EPSILON), vec![b]);
    }

    #[test]
    fn well_separated_points_are_unchanged() {
        let pts: Vec<_> = (0..6)
            .map(|i| Point3::new(i as f64 * 0.06, 0.0, 0.0))
            .collect();
        assert_eq!(dedup_points(&pts, DEFAULT_DEDUP_EPSILON), pts);
    }

    #[test]
    fn dedup_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let pts: Vec<_> = (0..30)
                .map(|_| {
                    Point3::new(
                        rng.random_range(0.0..0.3),
                        rng.random_range(0.0..0.3),
                        rng.random_range(0.0..0.3),
                    )
                })
                .collect();
            let once = dedup_points(&pts, DEFAULT_DEDUP_EPSILON);
            let twice = dedup_points(&once, DEFAULT_DEDUP_EPSILON);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(dedup_points(&[], DEFAULT_DEDUP_EPSILON).is_empty());
    }
}
