//! Segment generation for linear moves

use levelkit_core::{distance_squared_3d, Point3};

/// Points closer than this (squared) to the previous one are dropped
pub const DUPLICATE_EPSILON_SQUARED: f64 = 1e-10;

/// Split `p0 -> p1` into pieces no longer than `max_length`
///
/// The start point is emitted first, then intermediate points, then the end
/// point. A zero-length move yields just the end point. A non-positive
/// `max_length` disables subdivision.
pub fn split_linear(p0: Point3, p1: Point3, max_length: f64) -> Vec<Point3> {
    let distance = distance_squared_3d(p0, p1).sqrt();
    if distance < 1e-10 || max_length <= 0.0 || !max_length.is_finite() {
        return vec![p1];
    }

    let direction = Point3::new(
        (p1.x - p0.x) / distance,
        (p1.y - p0.y) / distance,
        (p1.z - p0.z) / distance,
    );

    let mut points = vec![p0];
    let mut d = max_length;
    while d < distance {
        push_distinct(
            &mut points,
            Point3::new(
                p0.x + direction.x * d,
                p0.y + direction.y * d,
                p0.z + direction.z * d,
            ),
        );
        d += max_length;
    }
    push_distinct(&mut points, p1);
    points
}

/// Append `point` unless it coincides with the last one
pub fn push_distinct(points: &mut Vec<Point3>, point: Point3) {
    match points.last() {
        Some(last) if distance_squared_3d(*last, point) <= DUPLICATE_EPSILON_SQUARED => {}
        _ => points.push(point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_includes_start_and_end() {
        let points = split_linear(Point3::default(), Point3::new(10.0, 0.0, 0.0), 5.0);
        assert_eq!(
            points,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_split_uneven_remainder() {
        let points = split_linear(Point3::default(), Point3::new(7.0, 0.0, 0.0), 3.0);
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 6.0, 7.0]);
    }

    #[test]
    fn test_zero_length_emits_endpoint_once() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(split_linear(p, p, 5.0), vec![p]);
    }

    #[test]
    fn test_no_subdivision_without_spacing() {
        let end = Point3::new(50.0, 0.0, 0.0);
        assert_eq!(split_linear(Point3::default(), end, 0.0), vec![end]);
    }

    #[test]
    fn test_push_distinct_skips_duplicates() {
        let mut points = vec![Point3::new(1.0, 1.0, 1.0)];
        push_distinct(&mut points, Point3::new(1.0, 1.0, 1.0 + 1e-6));
        assert_eq!(points.len(), 1);
        push_distinct(&mut points, Point3::new(1.0, 1.0, 1.1));
        assert_eq!(points.len(), 2);
    }
}
