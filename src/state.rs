use egui::{Color32, Pos2};

use crate::error::EngineError;
use crate::raster::{CompositeMode, PaintStyle};
use crate::tools::{RenderBehavior, ToolKind, dispatch};

/// Where the stroke state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokePhase {
    #[default]
    Idle,
    Drawing,
}

/// Tool settings plus the in-flight stroke position.
///
/// Only the engine's tool and stroke transitions mutate this.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingState {
    pub(crate) active_tool: ToolKind,
    pub(crate) brush_size: f32,
    pub(crate) color: Color32,
    pub(crate) is_drawing: bool,
    pub(crate) last_point: Pos2,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            active_tool: ToolKind::Pencil,
            brush_size: 5.0,
            color: Color32::BLACK,
            is_drawing: false,
            last_point: Pos2::ZERO,
        }
    }
}

impl DrawingState {
    pub fn new(active_tool: ToolKind, brush_size: f32, color: Color32) -> Result<Self, EngineError> {
        Ok(Self {
            active_tool,
            brush_size: validate_brush_size(brush_size)?,
            color,
            ..Self::default()
        })
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    pub fn last_point(&self) -> Pos2 {
        self.last_point
    }

    pub fn phase(&self) -> StrokePhase {
        if self.is_drawing {
            StrokePhase::Drawing
        } else {
            StrokePhase::Idle
        }
    }

    /// Style the active tool draws with at full pressure
    pub fn paint_style(&self) -> PaintStyle {
        let composite = match dispatch(self.active_tool) {
            RenderBehavior::Freehand(mode) => mode,
            RenderBehavior::ShapePreview(_) => CompositeMode::Overwrite,
        };
        PaintStyle::rounded(self.color, self.brush_size, composite)
    }
}

pub(crate) fn validate_brush_size(size: f32) -> Result<f32, EngineError> {
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(EngineError::InvalidBrushSize(size))
    }
}
