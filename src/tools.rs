use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::raster::CompositeMode;

/// The drawing tools a user can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
    Rectangle,
    #[serde(alias = "circle")]
    Ellipse,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [Self::Pencil, Self::Eraser, Self::Rectangle, Self::Ellipse];

    /// Stable identifier, also accepted by `from_str`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pencil => "pencil",
            Self::Eraser => "eraser",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
        }
    }

    /// Label for the tools panel
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pencil => "✏ Pencil",
            Self::Eraser => "⌫ Eraser",
            Self::Rectangle => "◻ Rectangle",
            Self::Ellipse => "◯ Ellipse",
        }
    }

    pub fn is_shape(&self) -> bool {
        matches!(dispatch(*self), RenderBehavior::ShapePreview(_))
    }
}

impl FromStr for ToolKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pencil" => Ok(Self::Pencil),
            "eraser" => Ok(Self::Eraser),
            "rectangle" => Ok(Self::Rectangle),
            "ellipse" | "circle" => Ok(Self::Ellipse),
            other => Err(EngineError::UnknownTool(other.to_owned())),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Bounded-box shapes drawn by the preview renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
}

/// How a tool puts pixels on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderBehavior {
    /// Destructive, incremental segments in the given composite mode
    Freehand(CompositeMode),
    /// Restore-then-redraw of a whole shape from the stroke's start point
    ShapePreview(ShapeKind),
}

/// Stateless lookup from tool to rendering behavior
pub fn dispatch(tool: ToolKind) -> RenderBehavior {
    match tool {
        ToolKind::Pencil => RenderBehavior::Freehand(CompositeMode::Overwrite),
        ToolKind::Eraser => RenderBehavior::Freehand(CompositeMode::Erase),
        ToolKind::Rectangle => RenderBehavior::ShapePreview(ShapeKind::Rectangle),
        ToolKind::Ellipse => RenderBehavior::ShapePreview(ShapeKind::Ellipse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_table() {
        assert_eq!(dispatch(ToolKind::Pencil), RenderBehavior::Freehand(CompositeMode::Overwrite));
        assert_eq!(dispatch(ToolKind::Eraser), RenderBehavior::Freehand(CompositeMode::Erase));
        assert_eq!(dispatch(ToolKind::Rectangle), RenderBehavior::ShapePreview(ShapeKind::Rectangle));
        assert_eq!(dispatch(ToolKind::Ellipse), RenderBehavior::ShapePreview(ShapeKind::Ellipse));
    }

    #[test]
    fn test_parse_tool_names() {
        for tool in ToolKind::ALL {
            assert_eq!(tool.name().parse::<ToolKind>().unwrap(), tool);
        }
        assert_eq!("circle".parse::<ToolKind>().unwrap(), ToolKind::Ellipse);
        assert_eq!(
            "lasso".parse::<ToolKind>().unwrap_err(),
            EngineError::UnknownTool("lasso".to_owned())
        );
    }

    #[test]
    fn test_serde_accepts_circle_alias() {
        let tool: ToolKind = serde_json::from_str("\"circle\"").unwrap();
        assert_eq!(tool, ToolKind::Ellipse);
        assert_eq!(serde_json::to_string(&ToolKind::Eraser).unwrap(), "\"eraser\"");
    }
}
