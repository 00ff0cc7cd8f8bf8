//! Points in pixel space and the heading convention shared by the player,
//! the camera plane and the ray caster.
//!
//! A heading of `0` looks "down" the screen (+y) and grows counter-clockwise,
//! so heading `a` has direction vector `(sin a, cos a)`.

use std::f64::consts::TAU;
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector for a heading.
    #[inline]
    pub fn from_heading(heading: f64) -> Self {
        Self::new(heading.sin(), heading.cos())
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Rigidly rotate around `center` by `angle` radians.
    #[inline]
    pub fn rotated_about(self, center: Point, angle: f64) -> Point {
        let d = self - center;
        let (s, c) = angle.sin_cos();
        center + Point::new(d.x * c + d.y * s, -d.x * s + d.y * c)
    }

    /// Heading from `self` towards `target`, in `[0, 2π)`.
    #[inline]
    pub fn angle_to(self, target: Point) -> f64 {
        let d = target - self;
        wrap_angle(d.x.atan2(d.y))
    }

    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        self + (other - self) * t
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn wrap_angle(rad: f64) -> f64 {
    let wrapped = rad.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < EPS
    }

    #[test]
    fn heading_zero_points_down() {
        assert!(close(Point::from_heading(0.0), Point::new(0.0, 1.0)));
        assert!(close(Point::from_heading(FRAC_PI_2), Point::new(1.0, 0.0)));
        assert!(close(Point::from_heading(PI), Point::new(0.0, -1.0)));
    }

    #[test]
    fn rotation_matches_heading_convention() {
        let center = Point::new(10.0, 10.0);
        let below = center + Point::new(0.0, 5.0);
        let rotated = below.rotated_about(center, FRAC_PI_2);
        assert!(close(rotated, center + Point::new(5.0, 0.0)));
        assert!((center.angle_to(rotated) - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        assert!((wrap_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < EPS);
        assert!((wrap_angle(5.0 * PI) - PI).abs() < EPS);
        assert_eq!(wrap_angle(0.0), 0.0);
        let tiny = wrap_angle(-1e-18);
        assert!((0.0..TAU).contains(&tiny));
    }
}
