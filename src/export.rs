use std::io::Cursor;

use image::ImageFormat;

use crate::error::ExportError;
use crate::raster::{Snapshot, Surface};

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// File name used when none is configured
pub const DEFAULT_EXPORT_FILE_NAME: &str = "drawing.png";

/// Destination for an encoded export
pub trait SaveSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> ExportResult<()>;
}

/// Losslessly encode a raster as PNG
pub fn encode_png(snapshot: &Snapshot) -> ExportResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    snapshot
        .to_rgba_image()?
        .write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

#[derive(Debug, Clone)]
pub struct Exporter {
    file_name: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_FILE_NAME)
    }
}

impl Exporter {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Encode the current raster and hand it to `sink`. Reads the surface only.
    pub fn export(&self, surface: &impl Surface, sink: &mut impl SaveSink) -> ExportResult<()> {
        let bytes = encode_png(&surface.read_pixels())?;
        sink.save(&self.file_name, &bytes)?;
        log::info!("Exported {} ({} bytes)", self.file_name, bytes.len());
        Ok(())
    }
}

/// Keeps exports in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub saved: Vec<(String, Vec<u8>)>,
}

impl SaveSink for MemorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> ExportResult<()> {
        self.saved.push((file_name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

/// Writes exports into a directory
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectorySink {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, file_name: &str) -> std::path::PathBuf {
        self.dir.join(file_name)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveSink for DirectorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> ExportResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(file_name);
        std::fs::write(&path, bytes)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Triggers a browser download through a temporary anchor element
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadSink;

#[cfg(target_arch = "wasm32")]
impl SaveSink for DownloadSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> ExportResult<()> {
        use wasm_bindgen::JsCast;

        let platform = |what: &str| ExportError::Platform(what.to_owned());
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| platform("no document"))?;

        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(bytes));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type("image/png");
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|_| platform("failed to create blob"))?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|_| platform("failed to create object URL"))?;

        let anchor = document
            .create_element("a")
            .ok()
            .and_then(|element| element.dyn_into::<web_sys::HtmlAnchorElement>().ok())
            .ok_or_else(|| platform("failed to create anchor"))?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();

        web_sys::Url::revoke_object_url(&url).ok();
        Ok(())
    }
}
