//! Transition arrows and their render geometry.
//!
//! An [`Arrow`] is built once from two anchor points and a label. Its
//! [`ArrowKind`] selects one of three geometries: a straight chord, a curve
//! bowed to one side (used when the reverse transition also exists), or a loop
//! above a state for self-transitions.

use crate::geometry::{upright_angle, Point};
use crate::surface::{Path, Surface, Text};
use crate::types::LABEL_FONT;
use serde::Serialize;
use std::f64::consts::PI;

/// Angle between the shaft and each barb of the arrowhead.
const HEAD_ANGLE: f64 = 7.0 / 8.0 * PI;
const HEAD_LENGTH: f64 = 20.0;
const LINE_WIDTH: f64 = 3.0;
/// Moves rotated labels down to cancel the text baseline.
const LABEL_BASELINE_SHIFT: f64 = 5.0;

const STRAIGHT_LABEL_DISTANCE: f64 = 20.0;
const STRAIGHT_LABEL_BIAS: f64 = 5.0;

const CURVE_LABEL_DISTANCE_X: f64 = 45.0;
const CURVE_LABEL_DISTANCE_Y: f64 = 50.0;
/// How far the control points are pushed back along the chord.
const CURVE_HEIGHT: f64 = 100.0;
/// How far the control points are pushed sideways from the chord.
const CURVE_WIDTH: f64 = 30.0;
/// Aligns the head with the curve's tangent rather than the chord.
const CURVE_HEAD_OFFSET: f64 = -1.0 / 8.0 * PI;

const LOOP_LABEL_HEIGHT: f64 = 110.0;
const LOOP_CONTROL_OFFSET: f64 = 120.0;
/// Direction the loop enters the state at its end point.
const LOOP_HEAD_ANGLE: f64 = 1.725 * PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArrowKind {
    Straight,
    Curved,
    Looped,
}

/// A rendered edge between two anchor points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrow {
    kind: ArrowKind,
    start: Point,
    end: Point,
    label: String,
    /// Direction from `end` back to `start`.
    angle: f64,
    midpoint: Point,
    label_position: Point,
}

impl Arrow {
    pub fn new(kind: ArrowKind, start: Point, end: Point, label: impl Into<String>) -> Self {
        let angle = start.angle_from(end);
        let midpoint = start.midpoint(end);
        let normal = angle - PI / 2.0;

        let label_position = match kind {
            ArrowKind::Straight => {
                let p = midpoint.polar(STRAIGHT_LABEL_DISTANCE, normal);
                Point::new(p.x, p.y + STRAIGHT_LABEL_BIAS)
            }
            ArrowKind::Curved => Point::new(
                midpoint.x + CURVE_LABEL_DISTANCE_X * normal.cos(),
                midpoint.y + CURVE_LABEL_DISTANCE_Y * normal.sin(),
            ),
            ArrowKind::Looped => Point::new(midpoint.x, midpoint.y - LOOP_LABEL_HEIGHT),
        };

        Self {
            kind,
            start,
            end,
            label: label.into(),
            angle,
            midpoint,
            label_position,
        }
    }

    pub fn straight(start: Point, end: Point, label: impl Into<String>) -> Self {
        Self::new(ArrowKind::Straight, start, end, label)
    }

    pub fn curved(start: Point, end: Point, label: impl Into<String>) -> Self {
        Self::new(ArrowKind::Curved, start, end, label)
    }

    pub fn looped(start: Point, end: Point, label: impl Into<String>) -> Self {
        Self::new(ArrowKind::Looped, start, end, label)
    }

    pub fn kind(&self) -> ArrowKind {
        self.kind
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn midpoint(&self) -> Point {
        self.midpoint
    }

    pub fn label_position(&self) -> Point {
        self.label_position
    }

    /// Appends another symbol to the label of a merged arrow.
    pub(crate) fn push_symbol(&mut self, symbol: char) {
        if !self.label.is_empty() {
            self.label.push_str(", ");
        }
        self.label.push(symbol);
    }

    /// Bézier control points for curved and looped arrows, before translation.
    pub fn control_points(&self) -> Option<(Point, Point)> {
        match self.kind {
            ArrowKind::Straight => None,
            ArrowKind::Curved => {
                let normal = self.angle - PI / 2.0;
                let c1 = self
                    .start
                    .polar(-CURVE_HEIGHT, self.angle)
                    .polar(CURVE_WIDTH, normal);
                let c2 = self
                    .end
                    .polar(CURVE_HEIGHT, self.angle)
                    .polar(CURVE_WIDTH, normal);
                Some((c1, c2))
            }
            ArrowKind::Looped => Some((
                Point::new(
                    self.midpoint.x - LOOP_CONTROL_OFFSET,
                    self.midpoint.y - LOOP_CONTROL_OFFSET,
                ),
                Point::new(
                    self.midpoint.x + LOOP_CONTROL_OFFSET,
                    self.midpoint.y - LOOP_CONTROL_OFFSET,
                ),
            )),
        }
    }

    /// Direction of the shaft at the end point, used to orient the head.
    pub fn head_direction(&self) -> f64 {
        match self.kind {
            ArrowKind::Straight => self.angle,
            ArrowKind::Curved => self.angle + CURVE_HEAD_OFFSET,
            ArrowKind::Looped => LOOP_HEAD_ANGLE,
        }
    }

    /// End points of the two barbs of the arrowhead, before translation.
    pub fn head_barbs(&self) -> (Point, Point) {
        let direction = self.head_direction();
        (
            self.end.polar(-HEAD_LENGTH, direction - HEAD_ANGLE),
            self.end.polar(-HEAD_LENGTH, direction + HEAD_ANGLE),
        )
    }

    /// Draws the shaft, the label and the head, translated by `offset`.
    pub fn render(&self, surface: &mut dyn Surface, color: &str, offset: Point) {
        let start = self.start.offset(offset);
        let end = self.end.offset(offset);

        let shaft = match self.control_points() {
            Some((c1, c2)) => Path::new()
                .move_to(start)
                .cubic_to(c1.offset(offset), c2.offset(offset), end),
            None => Path::new().move_to(start).line_to(end),
        };
        surface.stroke_path(&shaft, color, LINE_WIDTH);

        if !self.label.is_empty() {
            let (rotation, baseline_shift) = match self.kind {
                ArrowKind::Looped => (0.0, 0.0),
                _ => (upright_angle(self.angle), LABEL_BASELINE_SHIFT),
            };

            surface.text(&Text {
                content: self.label.clone(),
                anchor: self.label_position.offset(offset),
                rotation,
                baseline_shift,
                font: LABEL_FONT.to_string(),
                color: color.to_string(),
            });
        }

        let (left, right) = self.head_barbs();
        let head = Path::new()
            .move_to(end)
            .line_to(left.offset(offset))
            .move_to(end)
            .line_to(right.offset(offset));
        surface.stroke_path(&head, color, LINE_WIDTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::approx_eq;
    use crate::surface::{DrawCommand, PathSegment, Recorder};

    fn points_eq(a: Point, b: Point) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    #[test]
    fn test_straight_geometry() {
        let arrow = Arrow::straight(Point::new(0.0, 0.0), Point::new(100.0, 0.0), "a");

        assert!(approx_eq(arrow.angle(), PI));
        assert_eq!(arrow.midpoint(), Point::new(50.0, 0.0));
        // Perpendicular of a leftward angle points down the screen.
        assert!(points_eq(arrow.label_position(), Point::new(50.0, 25.0)));
        assert!(arrow.control_points().is_none());
    }

    #[test]
    fn test_curved_geometry() {
        let arrow = Arrow::curved(Point::new(0.0, 0.0), Point::new(100.0, 0.0), "a");

        assert!(points_eq(arrow.label_position(), Point::new(50.0, 50.0)));

        let (c1, c2) = arrow.control_points().unwrap();
        // Pushed outwards along the chord, then to the same side.
        assert!(points_eq(c1, Point::new(100.0, 30.0)));
        assert!(points_eq(c2, Point::new(0.0, 30.0)));
        assert!(approx_eq(arrow.head_direction(), PI - PI / 8.0));
    }

    #[test]
    fn test_looped_geometry() {
        let arrow = Arrow::looped(Point::new(-10.0, -28.0), Point::new(10.0, -28.0), "a");

        assert!(points_eq(arrow.label_position(), Point::new(0.0, -138.0)));

        let (c1, c2) = arrow.control_points().unwrap();
        assert!(points_eq(c1, Point::new(-120.0, -148.0)));
        assert!(points_eq(c2, Point::new(120.0, -148.0)));
        assert!(approx_eq(arrow.head_direction(), 1.725 * PI));
    }

    #[test]
    fn test_head_barbs_are_symmetric() {
        let arrow = Arrow::straight(Point::new(0.0, 0.0), Point::new(100.0, 0.0), "a");
        let (left, right) = arrow.head_barbs();

        // Both barbs trail behind the tip, mirrored across the shaft.
        assert!(left.x < 100.0 && right.x < 100.0);
        assert!(approx_eq(left.x, right.x));
        assert!(approx_eq(left.y, -right.y));
        assert!(approx_eq((left.x - 100.0).hypot(left.y), HEAD_LENGTH));
    }

    #[test]
    fn test_push_symbol() {
        let mut arrow = Arrow::straight(Point::new(0.0, 0.0), Point::new(1.0, 0.0), "a");
        arrow.push_symbol('b');
        arrow.push_symbol('c');

        assert_eq!(arrow.label(), "a, b, c");
    }

    #[test]
    fn test_render_straight() {
        let arrow = Arrow::straight(Point::new(0.0, 0.0), Point::new(100.0, 0.0), "a");
        let mut recorder = Recorder::new(100.0, 100.0);

        arrow.render(&mut recorder, "red", Point::new(10.0, 20.0));

        let commands = recorder.commands();
        assert_eq!(commands.len(), 3);

        match &commands[0] {
            DrawCommand::StrokePath { path, color, width } => {
                assert_eq!(color, "red");
                assert_eq!(*width, LINE_WIDTH);
                assert_eq!(
                    path.segments,
                    vec![
                        PathSegment::MoveTo {
                            to: Point::new(10.0, 20.0)
                        },
                        PathSegment::LineTo {
                            to: Point::new(110.0, 20.0)
                        },
                    ]
                );
            }
            other => panic!("Expected the shaft, got {:?}", other),
        }

        match &commands[1] {
            DrawCommand::Text(text) => {
                assert_eq!(text.content, "a");
                assert!(points_eq(text.anchor, Point::new(60.0, 45.0)));
                // A leftward label is flipped to stay readable.
                assert!(approx_eq(text.rotation, 2.0 * PI));
                assert_eq!(text.baseline_shift, LABEL_BASELINE_SHIFT);
            }
            other => panic!("Expected the label, got {:?}", other),
        }

        match &commands[2] {
            DrawCommand::StrokePath { path, .. } => assert_eq!(path.segments.len(), 4),
            other => panic!("Expected the head, got {:?}", other),
        }
    }

    #[test]
    fn test_render_loop_label_is_upright() {
        let arrow = Arrow::looped(Point::new(-10.0, -28.0), Point::new(10.0, -28.0), "0, 1");
        let mut recorder = Recorder::new(100.0, 100.0);

        arrow.render(&mut recorder, "black", Point::default());

        let text = recorder
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::Text(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(text.rotation, 0.0);
        assert_eq!(text.baseline_shift, 0.0);
        assert_eq!(text.content, "0, 1");

        match &recorder.commands()[0] {
            DrawCommand::StrokePath { path, .. } => {
                assert!(matches!(path.segments[1], PathSegment::CubicTo { .. }))
            }
            other => panic!("Expected a curve, got {:?}", other),
        }
    }

    #[test]
    fn test_render_skips_empty_label() {
        let arrow = Arrow::straight(Point::new(-100.0, 0.0), Point::new(-30.0, 0.0), "");
        let mut recorder = Recorder::new(100.0, 100.0);

        arrow.render(&mut recorder, "black", Point::default());

        assert_eq!(recorder.commands().len(), 2);
    }
}
