use egui::Pos2;

use crate::raster::{PaintStyle, Path, Surface};

/// Destructive, incremental rendering for freehand tools.
///
/// Each segment is stroked exactly once as it arrives and never redrawn, so
/// semi-transparent edges can be blended twice where segments meet.
#[derive(Debug, Default)]
pub struct StrokeRenderer {
    /// Points of the active path, kept for logging and stroke bounds
    path: Option<Path>,
}

impl StrokeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a path at `start`. Any unfinished path is dropped.
    pub fn begin(&mut self, start: Pos2) {
        self.path = Some(Path::new(start));
    }

    /// Stroke one segment from `from` to `to` onto the surface
    pub fn segment(&mut self, surface: &mut impl Surface, from: Pos2, to: Pos2, style: &PaintStyle) {
        surface.stroke_path(&Path::segment(from, to), style);
        match &mut self.path {
            Some(path) => path.line_to(to),
            None => {
                let mut path = Path::new(from);
                path.line_to(to);
                self.path = Some(path);
            }
        }
    }

    /// Close the active path, returning it
    pub fn finish(&mut self) -> Option<Path> {
        let path = self.path.take();
        if let Some(path) = &path {
            log::trace!("Freehand stroke finished with {} points", path.points().len());
        }
        path
    }

    pub fn is_active(&self) -> bool {
        self.path.is_some()
    }
}
