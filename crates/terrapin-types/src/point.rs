//! Integer grid coordinates and the line walk between them.
//!
//! A [`Point`] addresses one cell of the world grid. Points are the map key
//! everywhere — cache entries, batch overlays, reverse diffs — so they are
//! `Copy + Eq + Hash + Ord`. Float math (headings, rotations) happens on
//! `cgmath::Vector3<f64>` and comes back to the grid through
//! [`Point::round_from`].

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use cgmath::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed coordinate input at the API boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointError {
    /// A coordinate sequence had the wrong number of components.
    #[error("expected 3 coordinate components, got {got}")]
    BadArity {
        /// How many components the caller supplied.
        got: usize,
    },
}

/// A block coordinate in the world grid.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct Point {
    /// East/west axis.
    pub x: i64,
    /// Vertical axis (up is positive).
    pub y: i64,
    /// North/south axis. Heading 0° points along +Z.
    pub z: i64,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point::new(0, 0, 0);
    /// Unit step along +X.
    pub const X: Point = Point::new(1, 0, 0);
    /// Unit step along +Y.
    pub const Y: Point = Point::new(0, 1, 0);
    /// Unit step along +Z.
    pub const Z: Point = Point::new(0, 0, 1);

    /// Create a point from its components.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// The float-side view of this point, for heading/rotation math.
    pub fn to_vec(self) -> Vector3<f64> {
        Vector3::new(self.x as f64, self.y as f64, self.z as f64)
    }

    /// Snap a float vector back onto the grid, rounding each component
    /// half away from zero.
    pub fn round_from(v: Vector3<f64>) -> Self {
        Self::new(v.x.round() as i64, v.y.round() as i64, v.z.round() as i64)
    }

    /// Euclidean distance to another point, in blocks.
    pub fn distance_to(self, other: Point) -> f64 {
        let d = other - self;
        ((d.x * d.x + d.y * d.y + d.z * d.z) as f64).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        *self = *self - rhs;
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y, -self.z)
    }
}

impl From<(i64, i64, i64)> for Point {
    fn from((x, y, z): (i64, i64, i64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point> for (i64, i64, i64) {
    fn from(p: Point) -> Self {
        (p.x, p.y, p.z)
    }
}

impl TryFrom<&[i64]> for Point {
    type Error = PointError;

    /// Validate arity before any world interaction: exactly 3 components.
    fn try_from(components: &[i64]) -> Result<Self, PointError> {
        match components {
            [x, y, z] => Ok(Self::new(*x, *y, *z)),
            _ => Err(PointError::BadArity {
                got: components.len(),
            }),
        }
    }
}

/// The inclusive sequence of grid cells on the straight path from `from`
/// to `to`, in travel order.
///
/// Classic driving-axis Bresenham generalized to three axes: the axis with
/// the largest absolute delta advances every step, the other two carry
/// error terms. Both endpoints are always present; `from == to` yields a
/// single cell.
pub fn line(from: Point, to: Point) -> Vec<Point> {
    let d = to - from;
    let (ax, ay, az) = (d.x.abs(), d.y.abs(), d.z.abs());
    let (sx, sy, sz) = (d.x.signum(), d.y.signum(), d.z.signum());

    let mut points = Vec::with_capacity(ax.max(ay).max(az) as usize + 1);
    let Point {
        mut x,
        mut y,
        mut z,
    } = from;
    points.push(from);

    if ax >= ay && ax >= az {
        let (mut ey, mut ez) = (2 * ay - ax, 2 * az - ax);
        while x != to.x {
            x += sx;
            if ey >= 0 {
                y += sy;
                ey -= 2 * ax;
            }
            if ez >= 0 {
                z += sz;
                ez -= 2 * ax;
            }
            ey += 2 * ay;
            ez += 2 * az;
            points.push(Point::new(x, y, z));
        }
    } else if ay >= ax && ay >= az {
        let (mut ex, mut ez) = (2 * ax - ay, 2 * az - ay);
        while y != to.y {
            y += sy;
            if ex >= 0 {
                x += sx;
                ex -= 2 * ay;
            }
            if ez >= 0 {
                z += sz;
                ez -= 2 * ay;
            }
            ex += 2 * ax;
            ez += 2 * az;
            points.push(Point::new(x, y, z));
        }
    } else {
        let (mut ex, mut ey) = (2 * ax - az, 2 * ay - az);
        while z != to.z {
            z += sz;
            if ex >= 0 {
                x += sx;
                ex -= 2 * az;
            }
            if ey >= 0 {
                y += sy;
                ey -= 2 * az;
            }
            ex += 2 * ax;
            ey += 2 * ay;
            points.push(Point::new(x, y, z));
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let p = Point::new(1, 2, 3);
        assert_eq!(p + Point::X, Point::new(2, 2, 3));
        assert_eq!(p - Point::Y, Point::new(1, 1, 3));
        assert_eq!(-p, Point::new(-1, -2, -3));
    }

    #[test]
    fn test_round_from_half_away_from_zero() {
        assert_eq!(
            Point::round_from(Vector3::new(0.5, -0.5, 1.49)),
            Point::new(1, -1, 1)
        );
        assert_eq!(
            Point::round_from(Vector3::new(-1.5, 2.5, 0.0)),
            Point::new(-2, 3, 0)
        );
    }

    #[test]
    fn test_distance() {
        assert_eq!(Point::ZERO.distance_to(Point::new(0, -1, 5)), 26f64.sqrt());
        assert_eq!(Point::ZERO.distance_to(Point::new(3, 4, 0)), 5.0);
    }

    #[test]
    fn test_try_from_slice_arity() {
        assert_eq!(
            Point::try_from(&[1, 2, 3][..]),
            Ok(Point::new(1, 2, 3))
        );
        assert_eq!(
            Point::try_from(&[1, 2][..]),
            Err(PointError::BadArity { got: 2 })
        );
        assert_eq!(
            Point::try_from(&[1, 2, 3, 4][..]),
            Err(PointError::BadArity { got: 4 })
        );
    }

    #[test]
    fn test_line_single_cell() {
        assert_eq!(line(Point::ZERO, Point::ZERO), vec![Point::ZERO]);
    }

    #[test]
    fn test_line_axis_aligned() {
        let cells = line(Point::ZERO, Point::new(0, 0, 5));
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Point::ZERO);
        assert_eq!(cells[5], Point::new(0, 0, 5));
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(*cell, Point::new(0, 0, i as i64));
        }
    }

    #[test]
    fn test_line_negative_direction() {
        let cells = line(Point::new(0, 4, 0), Point::new(0, 0, 0));
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[0], Point::new(0, 4, 0));
        assert_eq!(cells[4], Point::ZERO);
    }

    #[test]
    fn test_line_diagonal() {
        let cells = line(Point::ZERO, Point::new(3, 3, 3));
        assert_eq!(
            cells,
            vec![
                Point::ZERO,
                Point::new(1, 1, 1),
                Point::new(2, 2, 2),
                Point::new(3, 3, 3),
            ]
        );
    }

    #[test]
    fn test_line_includes_both_endpoints() {
        let from = Point::new(-2, 1, 7);
        let to = Point::new(5, -3, 2);
        let cells = line(from, to);
        assert_eq!(cells.first(), Some(&from));
        assert_eq!(cells.last(), Some(&to));
        // dominant axis (x, delta 7) drives: one cell per step
        assert_eq!(cells.len(), 8);
    }
}
