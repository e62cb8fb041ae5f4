use egui::{Pos2, Rect, pos2};

/// A pointer position as reported by the windowing layer, before mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointer {
    /// Position in layout (logical) coordinates
    pub client: Pos2,
    /// Device-reported force, if any
    pub force: Option<f32>,
}

impl RawPointer {
    pub fn new(client: Pos2) -> Self {
        Self { client, force: None }
    }

    pub fn with_force(client: Pos2, force: f32) -> Self {
        Self {
            client,
            force: Some(force),
        }
    }
}

/// A pointer position in canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Pos2,
    /// Always in `(0, 1]`
    pub pressure: f32,
}

impl PointerSample {
    pub fn new(position: Pos2) -> Self {
        Self {
            position,
            pressure: 1.0,
        }
    }
}

/// Map a device force into pressure.
///
/// Exactly `1.0` is what devices without pressure report, so it is treated
/// as unknown just like an absent or nonsensical value.
pub fn normalize_pressure(force: Option<f32>) -> f32 {
    match force {
        Some(f) if f.is_finite() && f > 0.0 && f != 1.0 => f.min(1.0),
        _ => 1.0,
    }
}

/// Map a raw pointer into canvas pixels.
///
/// `layout` is the canvas's rectangle at the time of this event and must be
/// looked up fresh for every event; scrolling or resizing moves it.
pub fn normalize(raw: RawPointer, layout: Rect, backing_size: [u32; 2]) -> PointerSample {
    let scale = |backing: u32, extent: f32| {
        if extent > 0.0 {
            backing as f32 / extent
        } else {
            1.0
        }
    };
    let scale_x = scale(backing_size[0], layout.width());
    let scale_y = scale(backing_size[1], layout.height());

    PointerSample {
        position: pos2(
            (raw.client.x - layout.min.x) * scale_x,
            (raw.client.y - layout.min.y) * scale_y,
        ),
        pressure: normalize_pressure(raw.force),
    }
}
