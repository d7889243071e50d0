//! Inline SVG outlines for geometric shapes, drawn in a 100×100 box

use crate::synth::ShapeKind;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stroke {
    Solid,
    /// Dotted outline for tracing
    Dashed,
}

fn star_points() -> String {
    (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { 46.0 } else { 19.0 };
            let t = i as f64 / 10.0 * 2.0 * PI - PI / 2.0;
            format!("{:.1},{:.1}", 50.0 + r * t.cos(), 52.0 + r * t.sin())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn outline(kind: ShapeKind) -> String {
    match kind {
        ShapeKind::Circle => r#"<circle cx="50" cy="50" r="44"/>"#.to_string(),
        ShapeKind::Square => r#"<rect x="8" y="8" width="84" height="84"/>"#.to_string(),
        ShapeKind::Rectangle => r#"<rect x="4" y="24" width="92" height="52"/>"#.to_string(),
        ShapeKind::Triangle => r#"<polygon points="50,6 94,92 6,92"/>"#.to_string(),
        ShapeKind::Star => format!(r#"<polygon points="{}"/>"#, star_points()),
        ShapeKind::Heart => {
            r#"<path d="M50 88 C20 66 4 46 12 26 C20 8 42 8 50 26 C58 8 80 8 88 26 C96 46 80 66 50 88 Z"/>"#.to_string()
        }
        ShapeKind::Diamond => r#"<polygon points="50,4 94,50 50,96 6,50"/>"#.to_string(),
        ShapeKind::Oval => r#"<ellipse cx="50" cy="50" rx="46" ry="32"/>"#.to_string(),
    }
}

/// An `<svg>` element `size` pixels wide showing `kind`.
pub fn shape_svg(kind: ShapeKind, size: f64, color: &str, fill: &str, stroke: Stroke) -> String {
    let dash = match stroke {
        Stroke::Solid => "",
        Stroke::Dashed => r#" stroke-dasharray="6 5""#,
    };
    format!(
        r#"<svg class="shape shape-{name}" width="{size:.0}" height="{size:.0}" viewBox="0 0 100 100"><g fill="{fill}" stroke="{color}" stroke-width="4" stroke-linejoin="round"{dash}>{body}</g></svg>"#,
        name = kind.name(),
        body = outline(kind),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shape_has_an_outline() {
        for kind in ShapeKind::ALL {
            let svg = shape_svg(kind, 40.0, "#000", "none", Stroke::Dashed);
            assert!(svg.starts_with("<svg class=\"shape shape-"));
            assert!(svg.contains("stroke-dasharray"));
            assert!(svg.ends_with("</g></svg>"));
        }
    }

    #[test]
    fn star_has_ten_points() {
        assert_eq!(star_points().split(' ').count(), 10);
    }
}
