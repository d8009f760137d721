use nalgebra::{Point3, Vector3};

/// Ordered sequence of points in one coordinate frame.
///
/// The frame is implicit: callers track which frame a set belongs to.
pub type PointSet = Vec<Point3<f64>>;

/// Arithmetic mean of `points`, `None` for an empty slice.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Build points from a flat `[x0, y0, z0, x1, ...]` array.
///
/// Returns `None` when the length is not a multiple of three.
pub fn points_from_flat(flat: &[f64]) -> Option<PointSet> {
    if flat.len() % 3 != 0 {
        return None;
    }
    Some(
        flat.chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_empty_set_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn centroid_averages_coordinates() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 6.0),
        ];
        let c = centroid(&pts).expect("centroid");
        assert_eq!(c, Point3::new(2.0 / 3.0, 4.0 / 3.0, 2.0));
    }

    #[test]
    fn flat_arrays_must_hold_whole_points() {
        assert!(points_from_flat(&[1.0, 2.0]).is_none());
        let pts = points_from_flat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("points");
        assert_eq!(pts, vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]);
    }
}
