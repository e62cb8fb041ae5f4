use egui::{Pos2, Rect, Vec2, pos2};
use tiny_skia::PathBuilder;

#[derive(Debug, Clone, PartialEq)]
enum Outline {
    Polyline { points: Vec<Pos2>, closed: bool },
    Ellipse { center: Pos2, radii: Vec2 },
}

/// Geometry in canvas pixel space: a polyline, optionally closed, or an
/// axis-aligned ellipse.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    outline: Outline,
}

impl Path {
    /// Begin a path at `start`
    pub fn new(start: Pos2) -> Self {
        Self {
            outline: Outline::Polyline {
                points: vec![start],
                closed: false,
            },
        }
    }

    /// Extend a polyline. Ellipses are complete and ignore this.
    pub fn line_to(&mut self, point: Pos2) {
        if let Outline::Polyline { points, .. } = &mut self.outline {
            points.push(point);
        }
    }

    pub fn close(&mut self) {
        if let Outline::Polyline { closed, .. } = &mut self.outline {
            *closed = true;
        }
    }

    /// A single straight segment
    pub fn segment(from: Pos2, to: Pos2) -> Self {
        let mut path = Self::new(from);
        path.line_to(to);
        path
    }

    /// Axis-aligned box through two opposite corners.
    ///
    /// The corners are visited starting at `origin`, moving along x first, so
    /// a negative width or height just reverses the winding.
    pub fn rect(origin: Pos2, corner: Pos2) -> Self {
        let mut path = Self::new(origin);
        path.line_to(pos2(corner.x, origin.y));
        path.line_to(corner);
        path.line_to(pos2(origin.x, corner.y));
        path.close();
        path
    }

    /// Closed ellipse with the given semi-axes
    pub fn ellipse(center: Pos2, radii: Vec2) -> Self {
        Self {
            outline: Outline::Ellipse {
                center,
                radii: radii.abs(),
            },
        }
    }

    /// Polyline vertices; empty for an ellipse
    pub fn points(&self) -> &[Pos2] {
        match &self.outline {
            Outline::Polyline { points, .. } => points.as_slice(),
            Outline::Ellipse { .. } => &[],
        }
    }

    pub fn is_closed(&self) -> bool {
        match &self.outline {
            Outline::Polyline { closed, .. } => *closed,
            Outline::Ellipse { .. } => true,
        }
    }

    /// Bounding box of the geometry, ignoring stroke width
    pub fn bounds(&self) -> Rect {
        match &self.outline {
            Outline::Polyline { points, .. } => Rect::from_points(points),
            Outline::Ellipse { center, radii } => Rect::from_center_size(*center, *radii * 2.0),
        }
    }

    /// Rasterizer form of the path. `None` for a lone point.
    pub(super) fn to_skia(&self) -> Option<tiny_skia::Path> {
        match &self.outline {
            Outline::Polyline { points, closed } => polyline(points, *closed),
            Outline::Ellipse { center, radii } => {
                tiny_skia::Rect::from_xywh(
                    center.x - radii.x,
                    center.y - radii.y,
                    radii.x * 2.0,
                    radii.y * 2.0,
                )
                .and_then(PathBuilder::from_oval)
                .or_else(|| {
                    // Flat ellipse: stroke its bounding box, which collapses to a line
                    let bounds = self.bounds();
                    let flat = Self::rect(bounds.min, bounds.max);
                    flat.to_skia()
                })
            }
        }
    }
}

fn polyline(points: &[Pos2], closed: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for point in rest {
        builder.line_to(point.x, point.y);
    }
    if closed {
        builder.close();
    }
    builder.finish()
}
