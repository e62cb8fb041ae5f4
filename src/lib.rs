#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod history;
pub mod input;
pub mod offline;
pub mod panels;
pub mod raster;
pub mod shape;
pub mod state;
pub mod stroke;
pub mod texture_manager;
pub mod tools;
pub mod viewport;

pub use app::SketchApp;
pub use config::SketchConfig;
pub use engine::Engine;
pub use error::{CacheError, ConfigError, EngineError, ExportError, FetchError, RasterError};
pub use export::{Exporter, MemorySink, SaveSink};
pub use history::HistoryManager;
pub use input::{InputEvent, InputHandler, PointerSample};
pub use offline::OfflineCache;
pub use raster::{CompositeMode, PaintStyle, RasterSurface, Snapshot, Surface};
pub use shape::ShapePreviewRenderer;
pub use state::DrawingState;
pub use stroke::StrokeRenderer;
pub use tools::{RenderBehavior, ToolKind};
pub use viewport::{ContainerLayout, ViewportManager, ViewportSignal};
