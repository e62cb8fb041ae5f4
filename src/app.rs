use egui::{Color32, Context, Painter, Rect};

use crate::config::SketchConfig;
use crate::engine::Engine;
use crate::error::RasterError;
use crate::export::Exporter;
use crate::input::InputHandler;
use crate::panels::{central_panel, tools_panel};
use crate::raster::{RasterSurface, Surface};
use crate::texture_manager::TextureManager;
use crate::tools::ToolKind;
use crate::viewport::{ContainerLayout, ViewportManager, ViewportSignal};

pub struct SketchApp {
    engine: Engine,
    surface: RasterSurface,
    viewport: ViewportManager,
    input_handler: InputHandler,
    exporter: Exporter,
    textures: TextureManager,
    /// Canvas layout seen last frame, used to classify layout changes
    last_layout: Option<ContainerLayout>,
    /// Last user-facing status or error message
    status: Option<String>,
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: SketchConfig) -> Result<Self, RasterError> {
        Self::from_config(config)
    }

    /// Build the app without a creation context, falling back to default
    /// settings if the config is unusable
    pub fn from_config(config: SketchConfig) -> Result<Self, RasterError> {
        let engine = config.engine().unwrap_or_else(|err| {
            log::error!("Invalid settings, using defaults: {err}");
            Engine::default()
        });
        Ok(Self {
            engine,
            // 1x1 placeholder until the first layout pass sizes the backing store
            surface: RasterSurface::new(1, 1)?,
            viewport: config.viewport(),
            input_handler: InputHandler::new(),
            exporter: config.exporter(),
            textures: TextureManager::new(),
            last_layout: None,
            status: None,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        log::info!("Tool selected from UI: {tool}");
        self.engine.set_tool(tool);
    }

    /// Set the drawing color. Brush colors are always opaque.
    pub fn set_color(&mut self, color: Color32) {
        self.engine.set_color(color.to_opaque());
    }

    pub fn set_brush_size(&mut self, size: f32) {
        if let Err(err) = self.engine.set_brush_size(size) {
            log::warn!("{err}");
        }
    }

    pub fn undo(&mut self) {
        self.engine.undo(&mut self.surface);
    }

    pub fn redo(&mut self) {
        self.engine.redo(&mut self.surface);
    }

    pub fn clear(&mut self) {
        self.engine.clear(&mut self.surface);
    }

    /// Save the current raster as PNG
    pub fn export(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        let mut sink = crate::export::DirectorySink::new(".");
        #[cfg(target_arch = "wasm32")]
        let mut sink = crate::export::DownloadSink;

        self.status = match self.exporter.export(&self.surface, &mut sink) {
            Ok(()) => Some(format!("Saved {}", self.exporter.file_name())),
            Err(err) => {
                log::error!("Export failed: {err}");
                Some(format!("Export failed: {err}"))
            }
        };
    }

    /// Match the backing store to the canvas rect.
    ///
    /// Work deferred by earlier frames is flushed first, so a restore captured
    /// during this call is written back on the following frame.
    pub(crate) fn sync_viewport(&mut self, ctx: &Context, layout: ContainerLayout) {
        let now = ctx.input(|i| i.time);
        self.viewport.on_frame(now, layout, &mut self.surface);

        match self.last_layout {
            Some(previous) if previous == layout => {}
            Some(previous) => {
                let signal = if previous.is_portrait() != layout.is_portrait() {
                    ViewportSignal::OrientationChange
                } else {
                    ViewportSignal::Resize
                };
                log::debug!("Viewport {signal:?}: {:?} -> {:?}", previous.size, layout.size);
                self.viewport.signal(signal, layout, now, &mut self.surface);
            }
            None => {
                self.viewport.reconcile(layout, &mut self.surface);
            }
        }
        self.last_layout = Some(layout);

        if let Some(delay) = self.viewport.repaint_after(now) {
            ctx.request_repaint_after(delay);
        }
    }

    /// Feed this frame's pointer input through the engine
    pub(crate) fn handle_input(&mut self, ctx: &Context, canvas_rect: Rect) {
        let events =
            self.input_handler
                .process_input(ctx, canvas_rect, self.surface.size());
        for event in &events {
            self.engine.handle_event(&mut self.surface, event);
        }
    }

    /// Draw the raster stretched over the canvas rect
    pub(crate) fn paint_canvas(&mut self, ctx: &Context, painter: &Painter, canvas_rect: Rect) {
        let texture = self.textures.texture_for(ctx, &self.surface);
        let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        painter.image(texture, canvas_rect, uv, Color32::WHITE);
    }
}

impl eframe::App for SketchApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        tools_panel(self, ctx);
        central_panel(self, ctx);
    }
}
