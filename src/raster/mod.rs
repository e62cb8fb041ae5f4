//! The render surface port and its in-memory implementation.
//!
//! The engine never talks to a display directly. Everything it needs from a
//! canvas is expressed by the [`Surface`] trait: a stroke primitive, full-raster
//! reads and writes, clearing, and backing-store resizing. [`RasterSurface`]
//! implements it over a `tiny_skia::Pixmap`, which is also what the host
//! uploads as an egui texture.

mod path;
mod surface;

use std::sync::Arc;

use egui::Color32;
use image::RgbaImage;
use tiny_skia::Pixmap;

use crate::error::RasterError;

pub use path::Path;
pub use surface::RasterSurface;

/// Result type for surface operations
pub type RasterResult<T> = Result<T, RasterError>;

/// How the ends of an open path are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// How two connected segments of a path meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl From<LineCap> for tiny_skia::LineCap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => Self::Butt,
            LineCap::Round => Self::Round,
            LineCap::Square => Self::Square,
        }
    }
}

impl From<LineJoin> for tiny_skia::LineJoin {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => Self::Miter,
            LineJoin::Round => Self::Round,
            LineJoin::Bevel => Self::Bevel,
        }
    }
}

/// Pixel blend rule for a draw operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Paint over existing content (source-over).
    #[default]
    Overwrite,
    /// Clear existing content to transparent (destination-out).
    Erase,
}

impl From<CompositeMode> for tiny_skia::BlendMode {
    fn from(mode: CompositeMode) -> Self {
        match mode {
            CompositeMode::Overwrite => Self::SourceOver,
            CompositeMode::Erase => Self::DestinationOut,
        }
    }
}

/// Everything needed to stroke a path.
///
/// Passed explicitly with every draw call. A surface additionally retains one
/// "current" style, which is reset whenever its backing store is resized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub color: Color32,
    pub width: f32,
    pub composite: CompositeMode,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            color: Color32::BLACK,
            width: 1.0,
            composite: CompositeMode::Overwrite,
        }
    }
}

impl PaintStyle {
    /// Round caps and joins, as used by every drawing tool
    pub fn rounded(color: Color32, width: f32, composite: CompositeMode) -> Self {
        Self {
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            color,
            width,
            composite,
        }
    }
}

/// An immutable full-canvas raster captured at one instant.
///
/// Pixels are premultiplied RGBA8. Cloning is cheap; the pixels are shared.
#[derive(Clone)]
pub struct Snapshot {
    pixmap: Arc<Pixmap>,
}

impl Snapshot {
    pub fn new(pixmap: Pixmap) -> Self {
        Self {
            pixmap: Arc::new(pixmap),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Premultiplied RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight RGBA value at a pixel, or `None` outside the raster
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(straight_rgba)
    }

    pub fn memory_bytes(&self) -> usize {
        self.pixmap.data().len()
    }

    /// True if every pixel is fully transparent
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Unpremultiplied copy for encoders
    pub fn to_rgba_image(&self) -> RasterResult<RgbaImage> {
        let data: Vec<u8> = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| straight_rgba(*p))
            .collect();
        let actual = data.len();
        RgbaImage::from_raw(self.width(), self.height(), data).ok_or(
            RasterError::BufferSizeMismatch {
                width: self.width(),
                height: self.height(),
                actual,
            },
        )
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.as_bytes() == other.as_bytes()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

pub(super) fn straight_rgba(pixel: tiny_skia::PremultipliedColorU8) -> [u8; 4] {
    let color = pixel.demultiply();
    [color.red(), color.green(), color.blue(), color.alpha()]
}

/// The port between the engine and whatever actually holds the pixels.
pub trait Surface {
    /// Backing store size in device pixels
    fn size(&self) -> [u32; 2];

    /// Stroke `path` with an explicit style. Never reads the retained style.
    fn stroke_path(&mut self, path: &Path, style: &PaintStyle);

    /// Capture the full raster
    fn read_pixels(&self) -> Snapshot;

    /// Replace the whole raster with `snapshot`, anchored at the origin and
    /// clipped to the backing store. No blending; any area the snapshot does
    /// not cover becomes transparent.
    fn write_pixels(&mut self, snapshot: &Snapshot);

    /// Blank the whole raster to fully transparent
    fn clear(&mut self);

    /// Resize the backing store. Discards all content and resets the
    /// retained paint style to its default.
    fn resize(&mut self, width: u32, height: u32) -> RasterResult<()>;

    /// The retained "current" paint style
    fn paint_style(&self) -> PaintStyle;

    fn set_paint_style(&mut self, style: PaintStyle);
}
