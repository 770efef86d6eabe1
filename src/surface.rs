//! The drawing surface contract consumed by the renderer, plus a [`Recorder`]
//! implementation that captures the primitive operations instead of painting them.

use crate::geometry::Point;
use serde::Serialize;

/// A single segment of a stroked path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PathSegment {
    MoveTo { to: Point },
    LineTo { to: Point },
    /// Cubic Bézier from the current point through two control points.
    CubicTo { c1: Point, c2: Point, to: Point },
}

/// An open path built from move/line/curve segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, to: Point) -> Self {
        self.segments.push(PathSegment::MoveTo { to });
        self
    }

    pub fn line_to(mut self, to: Point) -> Self {
        self.segments.push(PathSegment::LineTo { to });
        self
    }

    pub fn cubic_to(mut self, c1: Point, c2: Point, to: Point) -> Self {
        self.segments.push(PathSegment::CubicTo { c1, c2, to });
        self
    }
}

/// Outline settings for a circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
        }
    }
}

/// Horizontally centred text, drawn after translating to `anchor` and rotating
/// by `rotation` radians. `baseline_shift` moves the text down in the rotated frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub content: String,
    pub anchor: Point,
    pub rotation: f64,
    pub baseline_shift: f64,
    pub font: String,
    pub color: String,
}

/// An immediate-mode 2D drawing target.
pub trait Surface {
    /// Width of the visible area, used for centring.
    fn width(&self) -> f64;
    /// Height of the visible area, used for centring.
    fn height(&self) -> f64;

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: &str);

    /// Draws a full circle, filled and/or outlined.
    fn circle(&mut self, center: Point, radius: f64, fill: Option<&str>, stroke: Option<&Stroke>);

    fn stroke_path(&mut self, path: &Path, color: &str, width: f64);

    fn text(&mut self, text: &Text);
}

/// A primitive drawing operation, as captured by [`Recorder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DrawCommand {
    FillRect {
        origin: Point,
        width: f64,
        height: f64,
        color: String,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Option<String>,
        stroke: Option<Stroke>,
    },
    StrokePath {
        path: Path,
        color: String,
        width: f64,
    },
    Text(Text),
}

/// A [`Surface`] that records every operation in order.
#[derive(Debug, Clone)]
pub struct Recorder {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Drops everything recorded so far, keeping the surface size.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for Recorder {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: &str) {
        self.commands.push(DrawCommand::FillRect {
            origin,
            width,
            height,
            color: color.to_string(),
        });
    }

    fn circle(&mut self, center: Point, radius: f64, fill: Option<&str>, stroke: Option<&Stroke>) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill: fill.map(str::to_string),
            stroke: stroke.cloned(),
        });
    }

    fn stroke_path(&mut self, path: &Path, color: &str, width: f64) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            color: color.to_string(),
            width,
        });
    }

    fn text(&mut self, text: &Text) {
        self.commands.push(DrawCommand::Text(text.clone()));
    }
}
