use egui::{Pos2, pos2, vec2};

use crate::raster::{PaintStyle, Path, Snapshot, Surface};
use crate::tools::ShapeKind;

/// Outline of `kind` spanning the box with corners `start` and `current`
pub fn shape_path(kind: ShapeKind, start: Pos2, current: Pos2) -> Path {
    match kind {
        ShapeKind::Rectangle => Path::rect(start, current),
        ShapeKind::Ellipse => {
            let center = pos2((start.x + current.x) / 2.0, (start.y + current.y) / 2.0);
            let radii = vec2((current.x - start.x).abs() / 2.0, (current.y - start.y).abs() / 2.0);
            Path::ellipse(center, radii)
        }
    }
}

#[derive(Debug)]
struct ArmedPreview {
    kind: ShapeKind,
    start: Pos2,
    pre_stroke: Snapshot,
}

/// Non-destructive shape preview.
///
/// Arming captures the raster once; every update restores that capture and
/// draws the whole shape again, so frames never leave stray pixels behind.
#[derive(Debug, Default)]
pub struct ShapePreviewRenderer {
    armed: Option<ArmedPreview>,
}

impl ShapePreviewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the pre-stroke raster and fix the start corner.
    /// Re-arming discards the previous capture.
    pub fn arm(&mut self, surface: &impl Surface, kind: ShapeKind, start: Pos2) {
        self.armed = Some(ArmedPreview {
            kind,
            start,
            pre_stroke: surface.read_pixels(),
        });
    }

    /// Restore the pre-stroke raster and draw the shape out to `current`.
    /// Does nothing when not armed.
    pub fn update(&self, surface: &mut impl Surface, current: Pos2, style: &PaintStyle) {
        let Some(armed) = &self.armed else {
            return;
        };
        surface.write_pixels(&armed.pre_stroke);
        surface.stroke_path(&shape_path(armed.kind, armed.start, current), style);
    }

    /// Drop the pre-stroke capture, returning it
    pub fn disarm(&mut self) -> Option<Snapshot> {
        self.armed.take().map(|armed| armed.pre_stroke)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn start(&self) -> Option<Pos2> {
        self.armed.as_ref().map(|armed| armed.start)
    }
}
