use nalgebra::{Point2, Vector2};

/// Slack added to the contact distance when checking a configuration for overlaps.
pub const OVERLAP_TOLERANCE: f64 = 1e-10;

/// Wraps a coordinate into the centred periodic interval [-L/2, L/2).
#[inline]
pub fn wrap_coordinate(x: f64, length: f64) -> f64 {
    let half = length / 2.0;
    let w = (x + half).rem_euclid(length) - half;
    // rem_euclid can round up to `length` itself for tiny negative inputs.
    if w >= half {
        w - length
    } else {
        w
    }
}

/// Moves a point into the centred primary box. Modifies in place.
pub fn wrap_point(p: &mut Point2<f64>, box_size: &[f64; 2]) {
    p.x = wrap_coordinate(p.x, box_size[0]);
    p.y = wrap_coordinate(p.y, box_size[1]);
}

/// Minimum Image Convention separation vector from `p1` to `p2`.
#[inline]
pub fn separation(p1: &Point2<f64>, p2: &Point2<f64>, box_size: &[f64; 2]) -> Vector2<f64> {
    let d = p2 - p1;
    Vector2::new(
        d.x - box_size[0] * (d.x / box_size[0]).round(),
        d.y - box_size[1] * (d.y / box_size[1]).round(),
    )
}

/// Squared periodic distance between two points.
#[inline]
pub fn distance_sq(p1: &Point2<f64>, p2: &Point2<f64>, box_size: &[f64; 2]) -> f64 {
    separation(p1, p2, box_size).norm_squared()
}

/// Searches all pairs for two disks closer than contact.
///
/// Returns the first offending pair `(i, j)` with `j < i`, or `None` when the
/// configuration is valid. O(N²); meant for startup only.
pub fn find_overlap(
    positions: &[Point2<f64>],
    box_size: &[f64; 2],
    sigma: f64,
) -> Option<(usize, usize)> {
    let threshold_sq = 4.0 * sigma * sigma + OVERLAP_TOLERANCE;
    for i in 0..positions.len() {
        for j in 0..i {
            if distance_sq(&positions[i], &positions[j], box_size) < threshold_sq {
                return Some((i, j));
            }
        }
    }
    None
}

/// Smallest periodic pair distance in a configuration (infinite for fewer than two disks).
pub fn min_pair_distance(positions: &[Point2<f64>], box_size: &[f64; 2]) -> f64 {
    let mut best = f64::INFINITY;
    for i in 0..positions.len() {
        for j in 0..i {
            best = best.min(distance_sq(&positions[i], &positions[j], box_size));
        }
    }
    best.sqrt()
}
