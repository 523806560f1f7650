//! Geometric primitives for 2D keypoint analysis.
//!
//! All functions are pure and work in whatever unit the keypoints carry
//! (pixels or normalized coordinates), as long as one sequence is consistent.

use nalgebra::Point2;
use std::f64::consts::PI;

/// Interior angle at `p2` formed by the segments to `p1` and `p3`, in degrees [0, 180]
pub fn joint_angle(p1: &Point2<f64>, p2: &Point2<f64>, p3: &Point2<f64>) -> f64 {
    let radians = (p1.y - p2.y).atan2(p1.x - p2.x) - (p3.y - p2.y).atan2(p3.x - p2.x);
    let degrees = radians.to_degrees().abs();

    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

pub fn distance(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    nalgebra::distance(a, b)
}

pub fn midpoint(a: &Point2<f64>, b: &Point2<f64>) -> Point2<f64> {
    nalgebra::center(a, b)
}

/// Straightness of an arm: shoulder-wrist distance over the summed segment lengths.
///
/// Lies in (0, 1]; 1.0 means the three joints are collinear. Returns `None`
/// when both segments are degenerate.
pub fn extension_ratio(
    shoulder: &Point2<f64>,
    elbow: &Point2<f64>,
    wrist: &Point2<f64>,
) -> Option<f64> {
    let segments = distance(shoulder, elbow) + distance(elbow, wrist);
    if segments < 1e-9 {
        return None;
    }
    Some((distance(shoulder, wrist) / segments).min(1.0))
}

/// Orientation of the line from `a` to `b`, in radians
pub fn line_angle(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Difference between two angles wrapped into [-π, π]
pub fn angular_difference(angle1: f64, angle2: f64) -> f64 {
    let diff = angle1 - angle2;

    if diff > PI {
        diff - 2.0 * PI
    } else if diff < -PI {
        diff + 2.0 * PI
    } else {
        diff
    }
}

/// Absolute angle between the hip line and the shoulder line, in degrees [0, 180]
pub fn line_separation_deg(
    hip_a: &Point2<f64>,
    hip_b: &Point2<f64>,
    shoulder_a: &Point2<f64>,
    shoulder_b: &Point2<f64>,
) -> f64 {
    let hips = line_angle(hip_a, hip_b);
    let shoulders = line_angle(shoulder_a, shoulder_b);
    angular_difference(hips, shoulders).abs().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_joint_angle_straight_and_right() {
        assert!((joint_angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((joint_angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0)) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_joint_angle_reflects_over_180() {
        // atan2 difference of 270° must come back as the 90° interior angle
        let angle = joint_angle(&p(0.0, -1.0), &p(0.0, 0.0), &p(-1.0, 0.0));
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_extension_ratio() {
        let straight = extension_ratio(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)).unwrap();
        assert!((straight - 1.0).abs() < 1e-9);

        let bent = extension_ratio(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0)).unwrap();
        assert!((bent - 2f64.sqrt() / 2.0).abs() < 1e-9);

        assert!(extension_ratio(&p(1.0, 1.0), &p(1.0, 1.0), &p(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_line_separation() {
        let sep = line_separation_deg(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 0.0), &p(1.0, 1.0));
        assert!((sep - 45.0).abs() < 1e-9);

        let parallel = line_separation_deg(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 5.0), &p(3.0, 5.0));
        assert!(parallel.abs() < 1e-9);
    }

    #[test]
    fn test_angular_difference_wraps() {
        assert!((angular_difference(0.5, 0.0) - 0.5).abs() < 1e-9);
        assert!((angular_difference(PI - 0.1, -PI + 0.1).abs() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_distance_and_midpoint() {
        assert!((distance(&p(0.0, 0.0), &p(3.0, 4.0)) - 5.0).abs() < 1e-12);
        assert_eq!(midpoint(&p(0.0, 0.0), &p(2.0, 4.0)), p(1.0, 2.0));
    }
}
