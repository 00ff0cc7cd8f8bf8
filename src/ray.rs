//! Grid ray casting by digital differential analysis.
//!
//! Each cast runs two one-dimensional searches: one that only visits
//! horizontal grid lines and one that only visits vertical grid lines. Both
//! are bounded by `max_steps` line crossings and the nearer wall wins.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::geometry::{Point, wrap_angle};
use crate::grid::{CellPos, Grid};

/// Nudge applied when snapping to the grid line behind the origin, so the
/// cursor lands inside the next cell instead of on its boundary.
const SNAP_EPSILON: f64 = 1e-7;

/// Which family of grid lines the ray crossed when it struck a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitAxis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point,
    /// Heading in `[0, 2π)`.
    pub angle: f64,
    pub hit_point: Option<Point>,
    /// Distance to the hit, or [`miss_distance`] when nothing was struck.
    pub distance: f64,
    pub axis: HitAxis,
}

impl Ray {
    #[inline]
    pub fn hit(&self) -> bool {
        self.hit_point.is_some()
    }

    /// Where the ray stops: the hit point, or a point at the miss distance.
    pub fn end(&self) -> Point {
        self.hit_point
            .unwrap_or_else(|| self.origin + Point::from_heading(self.angle) * self.distance)
    }
}

/// Distance reported for rays that exhaust their step budget.
#[inline]
pub fn miss_distance(cell_size: f64, max_steps: u32) -> f64 {
    cell_size * max_steps as f64 + 1.0
}

struct AxisHit {
    point: Point,
    distance: f64,
}

/// Cast a ray from `origin` at heading `angle` through `grid`.
///
/// Pure: it neither mutates the grid nor allocates.
pub fn cast(origin: Point, angle: f64, grid: &Grid, cell_size: f64, max_steps: u32) -> Ray {
    let angle = wrap_angle(angle);
    let horizontal = horizontal_search(origin, angle, grid, cell_size, max_steps);
    let vertical = vertical_search(origin, angle, grid, cell_size, max_steps);
    let miss = miss_distance(cell_size, max_steps);

    let h_dist = horizontal.as_ref().map_or(miss, |h| h.distance);
    let v_dist = vertical.as_ref().map_or(miss, |v| v.distance);

    let axis = nearer_axis(h_dist, v_dist);
    let winner = match axis {
        HitAxis::Horizontal => horizontal,
        HitAxis::Vertical => vertical,
    };

    Ray {
        origin,
        angle,
        hit_point: winner.as_ref().map(|w| w.point),
        distance: winner.map_or(miss, |w| w.distance),
        axis,
    }
}

/// Vertical must be strictly nearer to win; equal distances, including two
/// misses, count as horizontal.
#[inline]
fn nearer_axis(h_dist: f64, v_dist: f64) -> HitAxis {
    if v_dist < h_dist {
        HitAxis::Vertical
    } else {
        HitAxis::Horizontal
    }
}

/// Walk horizontal grid lines, one cell height at a time.
fn horizontal_search(
    origin: Point,
    angle: f64,
    grid: &Grid,
    cell_size: f64,
    max_steps: u32,
) -> Option<AxisHit> {
    // straight left or right never crosses a horizontal line
    if angle == FRAC_PI_2 || angle == 3.0 * FRAC_PI_2 {
        return None;
    }
    let tan = angle.tan();
    let row_top = (origin.y / cell_size).floor() * cell_size;
    let looking_up = angle > FRAC_PI_2 && angle < 3.0 * FRAC_PI_2;

    let (y, step_y) = if looking_up {
        (row_top - SNAP_EPSILON, -cell_size)
    } else {
        (row_top + cell_size, cell_size)
    };
    let start = Point::new(origin.x + (y - origin.y) * tan, y);
    let step = Point::new(step_y * tan, step_y);

    march(origin, start, step, grid, cell_size, max_steps)
}

/// Walk vertical grid lines, one cell width at a time.
fn vertical_search(
    origin: Point,
    angle: f64,
    grid: &Grid,
    cell_size: f64,
    max_steps: u32,
) -> Option<AxisHit> {
    // straight up or down never crosses a vertical line
    if angle == 0.0 || angle == PI {
        return None;
    }
    let cot = 1.0 / angle.tan();
    let col_left = (origin.x / cell_size).floor() * cell_size;
    let looking_left = angle > PI;

    let (x, step_x) = if looking_left {
        (col_left - SNAP_EPSILON, -cell_size)
    } else {
        (col_left + cell_size, cell_size)
    };
    let start = Point::new(x, origin.y + (x - origin.x) * cot);
    let step = Point::new(step_x, step_x * cot);

    march(origin, start, step, grid, cell_size, max_steps)
}

fn march(
    origin: Point,
    mut cursor: Point,
    step: Point,
    grid: &Grid,
    cell_size: f64,
    max_steps: u32,
) -> Option<AxisHit> {
    for _ in 0..max_steps {
        if !cursor.x.is_finite() || !cursor.y.is_finite() {
            return None;
        }
        if grid.is_wall(cell_of(cursor, cell_size)) {
            return Some(AxisHit {
                point: cursor,
                distance: origin.distance(cursor),
            });
        }
        cursor += step;
    }
    None
}

#[inline]
fn cell_of(p: Point, cell_size: f64) -> CellPos {
    Grid::cell_at_pixel(p, cell_size)
}
