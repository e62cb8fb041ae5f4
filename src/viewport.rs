use std::time::Duration;

use egui::Vec2;

use crate::raster::{Snapshot, Surface};

/// Default wait after an orientation change before layout is trusted
pub const DEFAULT_ORIENTATION_SETTLE_SECS: f64 = 0.3;

/// Size of the canvas container as laid out by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerLayout {
    /// Layout size in points
    pub size: Vec2,
    /// Physical pixels per point (device pixel ratio)
    pub pixels_per_point: f32,
}

impl ContainerLayout {
    pub fn new(size: Vec2, pixels_per_point: f32) -> Self {
        Self {
            size,
            pixels_per_point,
        }
    }

    /// Backing-store size in physical pixels
    pub fn backing_size(&self) -> [u32; 2] {
        let scale = |extent: f32| (extent * self.pixels_per_point).round().max(0.0) as u32;
        [scale(self.size.x), scale(self.size.y)]
    }

    pub fn is_empty(&self) -> bool {
        let [width, height] = self.backing_size();
        width == 0 || height == 0
    }

    pub fn is_portrait(&self) -> bool {
        self.size.y > self.size.x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSignal {
    Resize,
    OrientationChange,
}

/// Keeps the backing store matched to its container without losing pixels.
///
/// Resizing a surface discards its content and retained style. The manager
/// captures both first, reapplies the style right away and writes the
/// captured raster back on the next frame, clipped to the new bounds.
#[derive(Debug)]
pub struct ViewportManager {
    settle_delay: f64,
    /// Time at which a pending orientation change is reconciled
    settle_deadline: Option<f64>,
    pending_restore: Option<Snapshot>,
}

impl Default for ViewportManager {
    fn default() -> Self {
        Self::new(DEFAULT_ORIENTATION_SETTLE_SECS)
    }
}

impl ViewportManager {
    pub fn new(settle_delay: f64) -> Self {
        Self {
            settle_delay: settle_delay.max(0.0),
            settle_deadline: None,
            pending_restore: None,
        }
    }

    pub fn settle_delay(&self) -> f64 {
        self.settle_delay
    }

    pub fn has_pending_restore(&self) -> bool {
        self.pending_restore.is_some()
    }

    /// Time at which a pending orientation change will be reconciled
    pub fn settle_deadline(&self) -> Option<f64> {
        self.settle_deadline
    }

    /// How long the host may wait before the next [`Self::on_frame`] call.
    /// A pending restore wants the very next frame; a settle deadline wants
    /// a frame once it expires. `None` when nothing is outstanding.
    pub fn repaint_after(&self, now: f64) -> Option<Duration> {
        if self.pending_restore.is_some() {
            return Some(Duration::ZERO);
        }
        self.settle_deadline
            .map(|deadline| Duration::from_secs_f64((deadline - now).max(0.0)))
    }

    /// Handle a viewport signal at time `now` (seconds).
    ///
    /// Resizes reconcile immediately. Orientation changes (re)start the settle
    /// timer and reconcile from [`Self::on_frame`] once it expires.
    pub fn signal(
        &mut self,
        signal: ViewportSignal,
        layout: ContainerLayout,
        now: f64,
        surface: &mut impl Surface,
    ) -> bool {
        match signal {
            ViewportSignal::Resize => self.reconcile(layout, surface),
            ViewportSignal::OrientationChange => {
                if self.settle_deadline.is_some() {
                    log::debug!("Orientation changed again, restarting settle delay");
                }
                self.settle_deadline = Some(now + self.settle_delay);
                false
            }
        }
    }

    /// Paint opportunity: flush a deferred restore, then run a due orientation
    /// reconciliation. Returns true if the surface changed.
    pub fn on_frame(&mut self, now: f64, layout: ContainerLayout, surface: &mut impl Surface) -> bool {
        let mut changed = self.flush_restore(surface);
        if self.settle_deadline.is_some_and(|deadline| now >= deadline) {
            self.settle_deadline = None;
            changed |= self.reconcile(layout, surface);
        }
        changed
    }

    /// Match the backing store to `layout`, preserving content and style.
    pub fn reconcile(&mut self, layout: ContainerLayout, surface: &mut impl Surface) -> bool {
        if layout.is_empty() {
            log::debug!("Skipping viewport reconcile for zero-area container {:?}", layout.size);
            return false;
        }

        // A newer reconcile must not drop content still waiting to be restored
        self.flush_restore(surface);

        let [width, height] = layout.backing_size();
        if surface.size() == [width, height] {
            return false;
        }

        let snapshot = surface.read_pixels();
        let style = surface.paint_style();
        if let Err(err) = surface.resize(width, height) {
            log::warn!("Failed to resize backing store: {err}");
            return false;
        }
        surface.set_paint_style(style);
        log::debug!(
            "Backing store {}x{} -> {}x{}",
            snapshot.width(),
            snapshot.height(),
            width,
            height
        );
        self.pending_restore = Some(snapshot);
        true
    }

    fn flush_restore(&mut self, surface: &mut impl Surface) -> bool {
        match self.pending_restore.take() {
            Some(snapshot) => {
                surface.write_pixels(&snapshot);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{CompositeMode, PaintStyle, Path, RasterSurface};
    use egui::{Color32, pos2, vec2};

    fn dot(surface: &mut RasterSurface, x: f32, y: f32) {
        surface.stroke_path(
            &Path::segment(pos2(x, y), pos2(x + 2.0, y)),
            &PaintStyle::rounded(Color32::RED, 4.0, CompositeMode::Overwrite),
        );
    }

    #[test]
    fn test_backing_size_rounds() {
        let layout = ContainerLayout::new(vec2(100.4, 50.6), 1.5);
        assert_eq!(layout.backing_size(), [151, 76]);
        assert!(ContainerLayout::new(vec2(0.0, 30.0), 2.0).is_empty());
    }

    #[test]
    fn test_zero_area_is_skipped() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        dot(&mut surface, 5.0, 5.0);
        let before = surface.read_pixels();
        let mut viewport = ViewportManager::default();

        let layout = ContainerLayout::new(vec2(0.0, 0.0), 1.0);
        assert!(!viewport.signal(ViewportSignal::Resize, layout, 0.0, &mut surface));
        assert!(!viewport.has_pending_restore());
        assert_eq!(surface.read_pixels(), before);
    }

    #[test]
    fn test_restore_is_deferred_to_next_frame() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        dot(&mut surface, 5.0, 5.0);
        let mut viewport = ViewportManager::default();
        let layout = ContainerLayout::new(vec2(40.0, 40.0), 1.0);

        assert!(viewport.signal(ViewportSignal::Resize, layout, 0.0, &mut surface));
        assert_eq!(surface.size(), [40, 40]);
        assert!(surface.read_pixels().is_blank());

        assert!(viewport.on_frame(0.016, layout, &mut surface));
        assert_eq!(surface.pixel(6, 5).unwrap()[3], 255);
        assert_eq!(surface.pixel(30, 30), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_orientation_waits_for_settle_delay() {
        let mut surface = RasterSurface::new(30, 20).unwrap();
        let mut viewport = ViewportManager::new(0.3);
        let portrait = ContainerLayout::new(vec2(20.0, 30.0), 1.0);

        viewport.signal(ViewportSignal::OrientationChange, portrait, 1.0, &mut surface);
        viewport.on_frame(1.1, portrait, &mut surface);
        assert_eq!(surface.size(), [30, 20]);

        // A second signal pushes the deadline out
        viewport.signal(ViewportSignal::OrientationChange, portrait, 1.2, &mut surface);
        viewport.on_frame(1.35, portrait, &mut surface);
        assert_eq!(surface.size(), [30, 20]);

        viewport.on_frame(1.6, portrait, &mut surface);
        assert_eq!(surface.size(), [20, 30]);
        assert!(viewport.has_pending_restore());
    }

    #[test]
    fn test_repaint_waits_for_settle_deadline() {
        let mut surface = RasterSurface::new(30, 20).unwrap();
        let mut viewport = ViewportManager::new(0.5);
        let portrait = ContainerLayout::new(vec2(20.0, 30.0), 1.0);
        assert_eq!(viewport.repaint_after(0.0), None);

        viewport.signal(ViewportSignal::OrientationChange, portrait, 2.0, &mut surface);
        assert_eq!(viewport.settle_deadline(), Some(2.5));
        assert_eq!(viewport.repaint_after(2.0), Some(Duration::from_millis(500)));
        assert_eq!(viewport.repaint_after(3.0), Some(Duration::ZERO));

        // Once reconciled, only the restore is left and it wants the next frame
        viewport.on_frame(2.5, portrait, &mut surface);
        assert_eq!(viewport.settle_deadline(), None);
        assert_eq!(viewport.repaint_after(2.5), Some(Duration::ZERO));
        viewport.on_frame(2.52, portrait, &mut surface);
        assert_eq!(viewport.repaint_after(2.52), None);
    }

    #[test]
    fn test_back_to_back_resizes_keep_content() {
        let mut surface = RasterSurface::new(40, 40).unwrap();
        dot(&mut surface, 5.0, 5.0);
        let mut viewport = ViewportManager::default();

        viewport.signal(
            ViewportSignal::Resize,
            ContainerLayout::new(vec2(50.0, 50.0), 1.0),
            0.0,
            &mut surface,
        );
        viewport.signal(
            ViewportSignal::Resize,
            ContainerLayout::new(vec2(60.0, 60.0), 1.0),
            0.0,
            &mut surface,
        );
        viewport.on_frame(0.016, ContainerLayout::new(vec2(60.0, 60.0), 1.0), &mut surface);
        assert_eq!(surface.size(), [60, 60]);
        assert_eq!(surface.pixel(6, 5).unwrap()[3], 255);
    }
}
