//! The drawing state machine.
//!
//! [`Engine`] is the explicit application state: tool settings, the in-flight
//! stroke, the preview renderer and the history. Every handler takes the
//! surface it should draw on, so the engine runs the same against a real
//! canvas or an in-memory raster.
//!
//! ```text
//!            pointer down                   pointer up / cancel / leave
//!   Idle ────────────────────► Drawing ─────────────────────────────► Idle
//!                              │    ▲         (commit to history)
//!                              └────┘
//!                           pointer move
//! ```

use egui::Color32;

use crate::error::EngineError;
use crate::history::HistoryManager;
use crate::input::{InputEvent, PointerSample};
use crate::raster::{PaintStyle, Snapshot, Surface};
use crate::shape::ShapePreviewRenderer;
use crate::state::{DrawingState, validate_brush_size};
use crate::stroke::StrokeRenderer;
use crate::tools::{RenderBehavior, ToolKind, dispatch};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Settings fixed for the duration of one stroke
#[derive(Debug)]
struct ActiveStroke {
    behavior: RenderBehavior,
    style: PaintStyle,
    /// Raster at pointer-down, committed to history when the stroke ends
    before: Snapshot,
}

#[derive(Debug, Default)]
pub struct Engine {
    state: DrawingState,
    history: HistoryManager,
    strokes: StrokeRenderer,
    preview: ShapePreviewRenderer,
    active: Option<ActiveStroke>,
    pressure_sensitivity: bool,
}

impl Engine {
    pub fn new(state: DrawingState, history: HistoryManager) -> Self {
        Self {
            state,
            history,
            ..Self::default()
        }
    }

    /// Scale freehand width by pointer pressure
    pub fn with_pressure_sensitivity(mut self, enabled: bool) -> Self {
        self.pressure_sensitivity = enabled;
        self
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn is_drawing(&self) -> bool {
        self.state.is_drawing
    }

    /// Takes effect on the next pointer-down
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.state.active_tool != tool {
            log::debug!("Tool changed: {} -> {}", self.state.active_tool, tool);
            self.state.active_tool = tool;
        }
    }

    pub fn set_color(&mut self, color: Color32) {
        self.state.color = color;
    }

    pub fn set_brush_size(&mut self, size: f32) -> EngineResult<()> {
        self.state.brush_size = validate_brush_size(size)?;
        Ok(())
    }

    /// Route one input event. Returns true if the raster may have changed.
    pub fn handle_event(&mut self, surface: &mut impl Surface, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown(sample) => {
                self.pointer_down(surface, *sample);
                false
            }
            InputEvent::PointerMove(sample) => self.pointer_move(surface, *sample),
            InputEvent::PointerUp | InputEvent::PointerCancel | InputEvent::PointerLeave => {
                self.end_stroke(surface)
            }
        }
    }

    /// `Idle -> Drawing`. A repeated down re-arms from the current raster.
    pub fn pointer_down(&mut self, surface: &mut impl Surface, sample: PointerSample) {
        let earlier = self.active.take().map(|stroke| {
            log::debug!("Pointer down while drawing, re-arming stroke");
            self.strokes.finish();
            self.preview.disarm();
            stroke.before
        });
        let before = earlier.unwrap_or_else(|| surface.read_pixels());

        let behavior = dispatch(self.state.active_tool);
        let style = self.state.paint_style();
        surface.set_paint_style(style);

        match behavior {
            RenderBehavior::Freehand(_) => self.strokes.begin(sample.position),
            RenderBehavior::ShapePreview(kind) => self.preview.arm(surface, kind, sample.position),
        }

        self.state.is_drawing = true;
        self.state.last_point = sample.position;
        self.active = Some(ActiveStroke {
            behavior,
            style,
            before,
        });
    }

    /// `Drawing -> Drawing`. No-op while idle. Returns true if pixels were drawn.
    pub fn pointer_move(&mut self, surface: &mut impl Surface, sample: PointerSample) -> bool {
        let Some(active) = &self.active else {
            return false;
        };
        match active.behavior {
            RenderBehavior::Freehand(_) => {
                let mut style = active.style;
                if self.pressure_sensitivity {
                    style.width *= sample.pressure;
                }
                self.strokes
                    .segment(surface, self.state.last_point, sample.position, &style);
                self.state.last_point = sample.position;
            }
            RenderBehavior::ShapePreview(_) => {
                self.preview.update(surface, sample.position, &active.style);
            }
        }
        true
    }

    /// `Drawing -> Idle`, committing the stroke. No-op while idle.
    pub fn end_stroke(&mut self, surface: &mut impl Surface) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        self.state.is_drawing = false;
        self.strokes.finish();
        self.preview.disarm();
        self.history.commit(active.before);
        log::trace!("Stroke committed on {:?} surface", surface.size());
        true
    }

    pub fn undo(&mut self, surface: &mut impl Surface) -> bool {
        self.end_stroke(surface);
        self.history.undo(surface)
    }

    pub fn redo(&mut self, surface: &mut impl Surface) -> bool {
        self.end_stroke(surface);
        self.history.redo(surface)
    }

    /// Blank the canvas as an undoable step
    pub fn clear(&mut self, surface: &mut impl Surface) {
        self.end_stroke(surface);
        self.history.clear(surface);
    }

    /// Drop any stroke and all history and blank the canvas. Not undoable.
    pub fn reset(&mut self, surface: &mut impl Surface) {
        self.active = None;
        self.state.is_drawing = false;
        self.strokes.finish();
        self.preview.disarm();
        self.history.reset();
        surface.clear();
    }
}
