//! Heading and elevation math on the ground plane.
//!
//! One convention everywhere: a heading is a unit vector in the X-Z plane,
//! and its angle is measured so that 0° = +Z, 90° = +X, 180° = −Z,
//! 270° = −X. Turning right increases the angle. Elevation tilts the nose
//! off the ground plane and is clamped to [−90°, 90°]; +90° points straight
//! up.

use cgmath::{Deg, InnerSpace, Quaternion, Rotation, Rotation3, Vector3};

use crate::point::Point;

/// The world's up axis.
pub const UP: Vector3<f64> = Vector3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

/// Headings whose cross product with [`UP`] is shorter than this are
/// treated as degenerate and fall back to the +X arm axis.
const DEGENERATE: f64 = 1e-12;

/// The unit heading vector for a heading angle in degrees.
pub fn heading_vector(angle: f64) -> Vector3<f64> {
    let rad = angle.to_radians();
    Vector3::new(rad.sin(), 0.0, rad.cos())
}

/// The heading angle in degrees, in [0, 360), for a heading vector.
///
/// Inverse of [`heading_vector`]: the unsigned angle to +Z, with the sign
/// of the cross product's vertical component deciding which half of the
/// circle the heading is in.
pub fn heading_angle(heading: Vector3<f64>) -> f64 {
    let unsigned = Deg::from(heading.angle(Vector3::unit_z())).0;
    let signed = if heading.cross(Vector3::unit_z()).y > 0.0 {
        360.0 - unsigned
    } else {
        unsigned
    };
    signed.rem_euclid(360.0)
}

/// Rotate `v` by `angle` degrees about `axis` (right-hand rule).
pub fn rotate_about(v: Vector3<f64>, axis: Vector3<f64>, angle: f64) -> Vector3<f64> {
    Quaternion::from_axis_angle(axis.normalize(), Deg(angle)).rotate_vector(v)
}

/// The agent's arm axis: perpendicular to both the heading and [`UP`].
///
/// Falls back to +X when the heading is parallel to the up axis and the
/// cross product degenerates.
pub fn arm_axis(heading: Vector3<f64>) -> Vector3<f64> {
    let arm = heading.cross(UP);
    if arm.magnitude2() < DEGENERATE {
        Vector3::unit_x()
    } else {
        arm.normalize()
    }
}

/// The direction the agent's nose points: the heading tilted by
/// `elevation` degrees about the arm axis.
pub fn head_vector(heading: Vector3<f64>, elevation: f64) -> Vector3<f64> {
    rotate_about(heading, arm_axis(heading), elevation)
}

/// The heading angle, in degrees in [0, 360), that would face an agent at
/// `from` toward `to` within the ground plane (the vertical delta is
/// ignored).
pub fn bearing(from: Point, to: Point) -> f64 {
    let d = to - from;
    (d.x as f64)
        .atan2(d.z as f64)
        .to_degrees()
        .rem_euclid(360.0)
}

/// Clamp an elevation angle to the legal [−90°, 90°] range.
pub fn clamp_elevation(angle: f64) -> f64 {
    angle.clamp(-90.0, 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn assert_vec_close(a: Vector3<f64>, b: Vector3<f64>) {
        assert!((a - b).magnitude2() < 1e-18, "{a:?} != {b:?}");
    }

    #[test]
    fn test_heading_compass_points() {
        assert_vec_close(heading_vector(0.0), Vector3::unit_z());
        assert_vec_close(heading_vector(90.0), Vector3::unit_x());
        assert_vec_close(heading_vector(180.0), -Vector3::unit_z());
        assert_vec_close(heading_vector(270.0), -Vector3::unit_x());
    }

    #[test]
    fn test_heading_angle_round_trip() {
        for angle in [0.0, 30.0, 90.0, 135.0, 180.0, 225.0, 270.0, 359.0] {
            assert_close(heading_angle(heading_vector(angle)), angle);
        }
    }

    #[test]
    fn test_rotate_about_up_increases_heading() {
        let turned = rotate_about(heading_vector(15.0), UP, 30.0);
        assert_close(heading_angle(turned), 45.0);
    }

    #[test]
    fn test_arm_axis_perpendicular() {
        // heading +Z: arm is −X, so position + arm is the left arm
        assert_vec_close(arm_axis(Vector3::unit_z()), -Vector3::unit_x());
        // degenerate heading falls back to +X
        assert_vec_close(arm_axis(UP), Vector3::unit_x());
    }

    #[test]
    fn test_head_vector_elevation() {
        // level flight: the nose is the heading
        assert_vec_close(head_vector(Vector3::unit_z(), 0.0), Vector3::unit_z());
        // full elevation points straight up, regardless of heading
        assert_vec_close(head_vector(Vector3::unit_z(), 90.0), UP);
        assert_vec_close(head_vector(Vector3::unit_x(), -90.0), -UP);
    }

    #[test]
    fn test_bearing() {
        assert_close(bearing(Point::ZERO, Point::new(0, 0, 5)), 0.0);
        assert_close(bearing(Point::ZERO, Point::new(5, 0, 0)), 90.0);
        assert_close(bearing(Point::new(0, 0, 5), Point::ZERO), 180.0);
        // vertical delta is ignored
        assert_close(bearing(Point::ZERO, Point::new(-4, 9, 0)), 270.0);
    }

    #[test]
    fn test_clamp_elevation() {
        assert_close(clamp_elevation(120.0), 90.0);
        assert_close(clamp_elevation(-95.0), -90.0);
        assert_close(clamp_elevation(45.0), 45.0);
    }
}
