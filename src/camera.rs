use crate::geometry::Point;

/// Virtual segment in front of the player. One view ray is cast through each
/// evenly spaced point of the segment, which keeps outer columns free of the
/// distortion uniform angular steps would cause.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPlane {
    pub left: Point,  // maps to screen column 0
    pub right: Point, // maps to the last screen column
}

impl CameraPlane {
    /// Plane `distance` ahead of `position` along `heading`, `width` wide.
    pub fn around(position: Point, heading: f64, width: f64, distance: f64) -> Self {
        // built facing heading 0 (down), then turned into place
        let left = position + Point::new(0.5 * width, distance);
        let right = position + Point::new(-0.5 * width, distance);
        Self { left, right }.rotated_about(position, heading)
    }

    #[inline]
    pub fn translated(self, offset: Point) -> Self {
        Self {
            left: self.left + offset,
            right: self.right + offset,
        }
    }

    #[inline]
    pub fn rotated_about(self, center: Point, angle: f64) -> Self {
        Self {
            left: self.left.rotated_about(center, angle),
            right: self.right.rotated_about(center, angle),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.left.distance(self.right)
    }

    /// Point on the plane for `column` out of `columns`, moving from left to
    /// right in equal steps.
    #[inline]
    pub fn sample(&self, column: usize, columns: usize) -> Point {
        if columns == 0 {
            return self.left;
        }
        self.left.lerp(self.right, column as f64 / columns as f64)
    }

    /// Horizontal field of view seen from `eye`, in radians.
    pub fn field_of_view(&self, eye: Point) -> f64 {
        let mid = self.left.lerp(self.right, 0.5);
        2.0 * (0.5 * self.width()).atan2(eye.distance(mid))
    }
}
