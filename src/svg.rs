//! A [`Surface`] that renders into a standalone SVG document.

use crate::geometry::Point;
use crate::surface::{Path, PathSegment, Stroke, Surface, Text};

pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    /// Wraps everything drawn so far in an `<svg>` element.
    pub fn finish(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">
{}</svg>
"#,
            self.width, self.height, self.width, self.height, self.body
        )
    }
}

impl Surface for SvgSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: &str) {
        self.body.push_str(&format!(
            "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" />\n",
            origin.x,
            origin.y,
            width,
            height,
            escape_xml(color)
        ));
    }

    fn circle(&mut self, center: Point, radius: f64, fill: Option<&str>, stroke: Option<&Stroke>) {
        let stroke_attrs = match stroke {
            Some(stroke) => format!(
                " stroke=\"{}\" stroke-width=\"{}\"",
                escape_xml(&stroke.color),
                stroke.width
            ),
            None => String::new(),
        };

        self.body.push_str(&format!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"{} />\n",
            center.x,
            center.y,
            radius,
            escape_xml(fill.unwrap_or("none")),
            stroke_attrs
        ));
    }

    fn stroke_path(&mut self, path: &Path, color: &str, width: f64) {
        self.body.push_str(&format!(
            "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" />\n",
            path_data(path),
            escape_xml(color),
            width
        ));
    }

    fn text(&mut self, text: &Text) {
        let (size, family) = split_font(&text.font);

        self.body.push_str(&format!(
            "  <text x=\"0\" y=\"{:.2}\" transform=\"translate({:.2} {:.2}) rotate({:.2})\" text-anchor=\"middle\" font-size=\"{}\" font-family=\"{}\" fill=\"{}\">{}</text>\n",
            text.baseline_shift,
            text.anchor.x,
            text.anchor.y,
            text.rotation.to_degrees(),
            escape_xml(size),
            escape_xml(family),
            escape_xml(&text.color),
            escape_xml(&text.content)
        ));
    }
}

fn path_data(path: &Path) -> String {
    path.segments
        .iter()
        .map(|segment| match segment {
            PathSegment::MoveTo { to } => format!("M{:.2},{:.2}", to.x, to.y),
            PathSegment::LineTo { to } => format!("L{:.2},{:.2}", to.x, to.y),
            PathSegment::CubicTo { c1, c2, to } => format!(
                "C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                c1.x, c1.y, c2.x, c2.y, to.x, to.y
            ),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a CSS shorthand like `24px Arial` into size and family.
fn split_font(font: &str) -> (&str, &str) {
    font.split_once(' ').unwrap_or(("16px", font))
}

fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Automaton, Descriptor};

    #[test]
    fn test_path_data() {
        let path = Path::new()
            .move_to(Point::new(0.0, 0.0))
            .cubic_to(Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0))
            .line_to(Point::new(7.5, 8.0));

        assert_eq!(
            path_data(&path),
            "M0.00,0.00 C1.00,2.00 3.00,4.00 5.00,6.00 L7.50,8.00"
        );
    }

    #[test]
    fn test_escape_and_font() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(split_font("24px Arial"), ("24px", "Arial"));
        assert_eq!(split_font("serif"), ("16px", "serif"));
    }

    #[test]
    fn test_render_automaton() {
        let descriptor: Descriptor = serde_json::from_str(
            r#"{
                "states": {"q<0>": {"x": 0, "y": 0}},
                "alphabet": ["a"],
                "transitions": {"q<0>": {"a": "q<0>"}},
                "startState": "q<0>",
                "acceptingStates": ["q<0>"]
            }"#,
        )
        .unwrap();
        let automaton = Automaton::new(descriptor);

        let mut surface = SvgSurface::new(300.0, 200.0);
        automaton.draw(&mut surface);
        let svg = surface.finish();

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("viewBox=\"0 0 300 200\""));
        assert!(svg.contains("<rect x=\"0.00\" y=\"0.00\" width=\"300.00\""));
        // Outer circle plus the accepting ring.
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(">q&lt;0&gt;</text>"));
        assert!(svg.contains(" C"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
