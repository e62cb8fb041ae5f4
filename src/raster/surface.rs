use egui::ColorImage;
use tiny_skia::{Color, Paint, Pixmap, Stroke, Transform};

use super::{CompositeMode, PaintStyle, Path, RasterResult, Snapshot, Surface, straight_rgba};
use crate::error::RasterError;

/// Miter joins longer than this multiple of the line width fall back to bevels.
const MITER_LIMIT: f32 = 10.0;

/// In-memory backing store: premultiplied RGBA8 pixels.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    style: PaintStyle,
    /// Bumped on every pixel mutation so hosts only re-upload changed frames
    version: u64,
}

impl RasterSurface {
    /// Creates a fully transparent surface
    pub fn new(width: u32, height: u32) -> RasterResult<Self> {
        Ok(Self {
            pixmap: blank_pixmap(width, height)?,
            style: PaintStyle::default(),
            version: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight RGBA value at a pixel, or `None` outside the raster
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(straight_rgba)
    }

    /// Monotonic counter of pixel mutations
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Converts the raster to egui's texture format
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_premultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixmap.data(),
        )
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

fn blank_pixmap(width: u32, height: u32) -> RasterResult<Pixmap> {
    Pixmap::new(width, height).ok_or(RasterError::InvalidDimensions { width, height })
}

fn paint_for(style: &PaintStyle) -> Paint<'static> {
    let mut paint = Paint {
        anti_alias: true,
        blend_mode: style.composite.into(),
        ..Default::default()
    };
    match style.composite {
        CompositeMode::Overwrite => {
            let [r, g, b, a] = style.color.to_srgba_unmultiplied();
            paint.set_color_rgba8(r, g, b, a);
        }
        // Only the source alpha matters for destination-out
        CompositeMode::Erase => paint.set_color_rgba8(0, 0, 0, 255),
    }
    paint
}

fn stroke_for(style: &PaintStyle) -> Stroke {
    Stroke {
        width: style.width,
        miter_limit: MITER_LIMIT,
        line_cap: style.line_cap.into(),
        line_join: style.line_join.into(),
        dash: None,
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }

    fn stroke_path(&mut self, path: &Path, style: &PaintStyle) {
        if !(style.width > 0.0) {
            return;
        }
        let Some(outline) = path.to_skia() else {
            return;
        };
        self.pixmap.stroke_path(
            &outline,
            &paint_for(style),
            &stroke_for(style),
            Transform::identity(),
            None,
        );
        self.touch();
    }

    fn read_pixels(&self) -> Snapshot {
        Snapshot::new(self.pixmap.clone())
    }

    fn write_pixels(&mut self, snapshot: &Snapshot) {
        if snapshot.size() == self.size() {
            self.pixmap.data_mut().copy_from_slice(snapshot.as_bytes());
        } else {
            self.pixmap.fill(Color::TRANSPARENT);
            let width = snapshot.width().min(self.width()) as usize;
            let height = snapshot.height().min(self.height()) as usize;
            let src_stride = snapshot.width() as usize * 4;
            let dst_stride = self.width() as usize * 4;
            let src = snapshot.as_bytes();
            let dst = self.pixmap.data_mut();
            for row in 0..height {
                let src_row = &src[row * src_stride..row * src_stride + width * 4];
                dst[row * dst_stride..row * dst_stride + width * 4].copy_from_slice(src_row);
            }
        }
        self.touch();
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
        self.touch();
    }

    fn resize(&mut self, width: u32, height: u32) -> RasterResult<()> {
        self.pixmap = blank_pixmap(width, height)?;
        self.style = PaintStyle::default();
        self.touch();
        Ok(())
    }

    fn paint_style(&self) -> PaintStyle {
        self.style
    }

    fn set_paint_style(&mut self, style: PaintStyle) {
        self.style = style;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{LineCap, LineJoin};
    use egui::{Color32, pos2};

    fn pen(color: Color32, width: f32, composite: CompositeMode) -> PaintStyle {
        PaintStyle::rounded(color, width, composite)
    }

    fn style(width: f32, line_cap: LineCap, line_join: LineJoin) -> PaintStyle {
        PaintStyle {
            line_cap,
            line_join,
            color: Color32::BLACK,
            width,
            composite: CompositeMode::Overwrite,
        }
    }

    fn alpha(surface: &RasterSurface, x: u32, y: u32) -> u8 {
        surface.pixel(x, y).unwrap()[3]
    }

    #[test]
    fn test_zero_sized_surface_is_rejected() {
        assert_eq!(
            RasterSurface::new(0, 10).unwrap_err(),
            RasterError::InvalidDimensions { width: 0, height: 10 }
        );
        let mut surface = RasterSurface::new(4, 4).unwrap();
        assert!(surface.resize(4, 0).is_err());
        assert_eq!(surface.size(), [4, 4]);
    }

    #[test]
    fn test_opaque_stroke_writes_exact_color() {
        let mut surface = RasterSurface::new(32, 32).unwrap();
        let red = Color32::from_rgb(200, 10, 10);
        surface.stroke_path(
            &Path::segment(pos2(4.0, 16.5), pos2(28.0, 16.5)),
            &pen(red, 5.0, CompositeMode::Overwrite),
        );
        assert_eq!(surface.pixel(16, 16), Some([200, 10, 10, 255]));
        assert_eq!(surface.pixel(16, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_erase_ignores_color_and_clears_alpha() {
        let mut surface = RasterSurface::new(32, 32).unwrap();
        let style = pen(Color32::BLUE, 10.0, CompositeMode::Overwrite);
        surface.stroke_path(&Path::segment(pos2(0.0, 16.0), pos2(32.0, 16.0)), &style);
        assert_eq!(alpha(&surface, 10, 16), 255);

        let eraser = pen(Color32::RED, 4.0, CompositeMode::Erase);
        surface.stroke_path(&Path::segment(pos2(10.5, 0.0), pos2(10.5, 32.0)), &eraser);
        assert_eq!(surface.pixel(10, 16), Some([0, 0, 0, 0]));
        // Untouched paint stays blue
        assert_eq!(surface.pixel(25, 16), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_round_cap_extends_past_endpoint() {
        let path = Path::segment(pos2(10.0, 10.5), pos2(20.0, 10.5));
        let mut round = RasterSurface::new(40, 40).unwrap();
        round.stroke_path(&path, &style(4.0, LineCap::Round, LineJoin::Round));
        let mut butt = RasterSurface::new(40, 40).unwrap();
        butt.stroke_path(&path, &style(4.0, LineCap::Butt, LineJoin::Round));

        // Just past the end of the segment
        assert!(alpha(&round, 20, 10) >= 250);
        assert_eq!(alpha(&butt, 21, 10), 0);
        // Middle of the segment is solid either way
        assert_eq!(alpha(&round, 15, 10), 255);
        assert_eq!(alpha(&butt, 15, 10), 255);
    }

    #[test]
    fn test_miter_join_fills_outer_corner() {
        let mut path = Path::new(pos2(2.0, 10.0));
        path.line_to(pos2(20.0, 10.0));
        path.line_to(pos2(20.0, 30.0));
        let mut miter = RasterSurface::new(40, 40).unwrap();
        miter.stroke_path(&path, &style(6.0, LineCap::Butt, LineJoin::Miter));
        let mut bevel = RasterSurface::new(40, 40).unwrap();
        bevel.stroke_path(&path, &style(6.0, LineCap::Butt, LineJoin::Bevel));

        // Pixel in the sharp outer corner at (23, 7)
        assert!(alpha(&miter, 22, 7) >= 250);
        assert_eq!(alpha(&bevel, 22, 7), 0);
    }

    #[test]
    fn test_stroke_is_clipped_to_raster() {
        let mut surface = RasterSurface::new(10, 10).unwrap();
        surface.stroke_path(
            &Path::segment(pos2(-50.0, 5.0), pos2(50.0, 5.0)),
            &style(2.0, LineCap::Round, LineJoin::Round),
        );
        assert_eq!(alpha(&surface, 0, 4), 255);
        assert_eq!(alpha(&surface, 9, 5), 255);
    }

    #[test]
    fn test_ellipse_stroke_follows_curve() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        surface.stroke_path(
            &Path::ellipse(pos2(50.0, 50.0), egui::vec2(30.0, 20.0)),
            &style(2.0, LineCap::Butt, LineJoin::Round),
        );
        // Rightmost and bottom points of the curve, and the untouched center
        assert!(alpha(&surface, 79, 50) >= 200);
        assert!(alpha(&surface, 50, 69) >= 200);
        assert_eq!(alpha(&surface, 50, 50), 0);
    }

    #[test]
    fn test_non_positive_width_paints_nothing() {
        let mut surface = RasterSurface::new(10, 10).unwrap();
        let version = surface.version();
        surface.stroke_path(
            &Path::segment(pos2(0.0, 5.0), pos2(10.0, 5.0)),
            &style(0.0, LineCap::Round, LineJoin::Round),
        );
        assert!(surface.read_pixels().is_blank());
        assert_eq!(surface.version(), version);
    }

    #[test]
    fn test_write_pixels_clips_larger_snapshot() {
        let mut big = RasterSurface::new(8, 8).unwrap();
        big.stroke_path(
            &Path::segment(pos2(0.0, 1.0), pos2(8.0, 1.0)),
            &pen(Color32::BLACK, 2.0, CompositeMode::Overwrite),
        );
        let snapshot = big.read_pixels();

        let mut small = RasterSurface::new(4, 4).unwrap();
        small.write_pixels(&snapshot);
        assert_eq!(small.pixel(3, 0), snapshot.pixel(3, 0));
        assert_eq!(small.pixel(3, 1), snapshot.pixel(3, 1));
    }

    #[test]
    fn test_write_pixels_clears_area_outside_smaller_snapshot() {
        let mut surface = RasterSurface::new(8, 8).unwrap();
        surface.stroke_path(
            &Path::segment(pos2(0.0, 6.5), pos2(8.0, 6.5)),
            &pen(Color32::BLACK, 3.0, CompositeMode::Overwrite),
        );
        let mut small = RasterSurface::new(4, 4).unwrap();
        small.stroke_path(
            &Path::segment(pos2(0.0, 1.0), pos2(4.0, 1.0)),
            &pen(Color32::RED, 2.0, CompositeMode::Overwrite),
        );

        surface.write_pixels(&small.read_pixels());
        assert_eq!(surface.pixel(2, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(2, 3), Some([0, 0, 0, 0]));
        // Paint the snapshot does not cover is gone
        assert_eq!(surface.pixel(6, 6), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_snapshot_converts_to_straight_rgba() {
        let mut surface = RasterSurface::new(8, 8).unwrap();
        surface.stroke_path(
            &Path::segment(pos2(0.0, 4.0), pos2(8.0, 4.0)),
            &pen(Color32::from_rgba_unmultiplied(255, 0, 0, 128), 4.0, CompositeMode::Overwrite),
        );
        let image = surface.read_pixels().to_rgba_image().unwrap();
        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(image.get_pixel(4, 4).0, surface.pixel(4, 4).unwrap());
        assert!(image.get_pixel(4, 4).0[0] >= 250);
    }

    #[test]
    fn test_resize_discards_content_and_style() {
        let mut surface = RasterSurface::new(16, 16).unwrap();
        let style = PaintStyle {
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            color: Color32::GREEN,
            width: 7.0,
            composite: CompositeMode::Erase,
        };
        surface.set_paint_style(style);
        surface.stroke_path(
            &Path::segment(pos2(0.0, 8.0), pos2(16.0, 8.0)),
            &pen(Color32::BLACK, 4.0, CompositeMode::Overwrite),
        );

        surface.resize(16, 16).unwrap();
        assert!(surface.read_pixels().is_blank());
        assert_eq!(surface.paint_style(), PaintStyle::default());
    }

    #[test]
    fn test_mutations_bump_version() {
        let mut surface = RasterSurface::new(4, 4).unwrap();
        let before = surface.version();
        surface.clear();
        assert!(surface.version() > before);
    }
}
