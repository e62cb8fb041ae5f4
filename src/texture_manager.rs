use egui::{Context, TextureHandle, TextureId, TextureOptions};

use crate::raster::RasterSurface;

/// Keeps the GPU copy of the canvas in step with the raster.
///
/// The surface bumps its version on every pixel write; the texture is only
/// re-uploaded when that version moves.
#[derive(Default)]
pub struct TextureManager {
    handle: Option<TextureHandle>,
    /// Surface version the texture was last uploaded from
    version: Option<u64>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture showing the current raster, uploading it if it changed
    pub fn texture_for(&mut self, ctx: &Context, surface: &RasterSurface) -> TextureId {
        let version = surface.version();
        if let Some(handle) = &self.handle {
            if self.version == Some(version) {
                return handle.id();
            }
        }

        let image = surface.to_color_image();
        let handle = match self.handle.take() {
            Some(mut handle) => {
                handle.set(image, TextureOptions::NEAREST);
                handle
            }
            None => ctx.load_texture("canvas", image, TextureOptions::NEAREST),
        };
        let id = handle.id();
        self.handle = Some(handle);
        self.version = Some(version);
        log::trace!("Uploaded canvas texture v{version}");
        id
    }
}
