use thiserror::Error;

/// Errors raised by the drawing engine's control signals
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Brush size must be a positive number, got {0}")]
    InvalidBrushSize(f32),

    #[error("Unknown tool identifier: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Errors raised by a raster surface
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("Invalid backing store dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer of {actual} bytes does not match {width}x{height}")]
    BufferSizeMismatch { width: u32, height: u32, actual: usize },
}

/// Errors raised while exporting the raster
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download failed: {0}")]
    Platform(String),
}

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid color value: {0}")]
    InvalidColor(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors seen by callers of the offline cache
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("{0} is not cached and the offline document is unavailable")]
    Offline(String),

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors raised by cache storage writes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache namespace {0} is full")]
    QuotaExceeded(String),
}
