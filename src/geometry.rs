//! Small 2D helpers shared by the arrow layout and the renderers.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// A position on the drawing plane. The y axis grows downwards, as on a canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point translated by `offset`.
    pub fn offset(self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }

    /// Returns the point `distance` units away from `self` in direction `angle`.
    pub fn polar(self, distance: f64, angle: f64) -> Self {
        Self::new(
            self.x + distance * angle.cos(),
            self.y + distance * angle.sin(),
        )
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Angle of the vector pointing from `other` to `self`.
    pub fn angle_from(self, other: Point) -> f64 {
        (self.y - other.y).atan2(self.x - other.x)
    }
}

/// Keeps an angle between 0 and 2π.
///
/// Only a single turn is corrected: inputs are expected to lie within one
/// full turn of the valid range.
pub fn normalize_angle(angle: f64) -> f64 {
    if angle >= TAU {
        return angle - TAU;
    }

    if angle < 0.0 {
        return TAU + angle;
    }

    angle
}

/// Rotation to apply to a label laid along `angle` so the text never reads
/// upside-down.
pub fn upright_angle(angle: f64) -> f64 {
    let angle = normalize_angle(angle);
    if angle > PI / 2.0 && angle < PI * 3.0 / 2.0 {
        angle + PI
    } else {
        angle
    }
}

#[cfg(test)]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
