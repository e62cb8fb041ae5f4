use std::path::Path;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::ConfigError;
use crate::export::{DEFAULT_EXPORT_FILE_NAME, Exporter};
use crate::history::HistoryManager;
use crate::offline::{FetchResult, OfflineCache};
use crate::state::DrawingState;
use crate::tools::ToolKind;
use crate::viewport::ViewportManager;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for the offline asset cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Namespace the current build caches into
    pub version: String,
    pub origin: String,
    pub offline_document: Option<String>,
    pub assets: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: "artbit-v1".to_owned(),
            origin: "http://localhost:8080".to_owned(),
            offline_document: Some("./index.html".to_owned()),
            assets: [
                "./",
                "./index.html",
                "./css/style.css",
                "./js/app.js",
                "./manifest.json",
                "./icons/icon-192x192.png",
                "./icons/icon-512x512.png",
                "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/5.15.4/css/all.min.css",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        }
    }
}

impl CacheConfig {
    pub fn build(&self) -> FetchResult<OfflineCache> {
        let cache = OfflineCache::new(&self.version, &self.origin)?.with_assets(self.assets.clone());
        Ok(match &self.offline_document {
            Some(document) => cache.with_offline_document(document),
            None => cache,
        })
    }
}

/// Startup settings, read from a JSON file.
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub tool: ToolKind,
    pub brush_size: f32,
    /// Opaque `#rrggbb` or `#rgb`
    pub color: String,
    pub pressure_sensitivity: bool,
    /// Undo entries kept; unbounded when absent
    pub history_depth: Option<usize>,
    pub orientation_settle_ms: u64,
    pub export_file_name: String,
    pub cache: CacheConfig,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pencil,
            brush_size: 5.0,
            color: "#000000".to_owned(),
            pressure_sensitivity: false,
            history_depth: None,
            orientation_settle_ms: 300,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_owned(),
            cache: CacheConfig::default(),
        }
    }
}

impl SketchConfig {
    /// Load settings from `path`, falling back to defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.color32()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn color32(&self) -> ConfigResult<Color32> {
        parse_hex_color(&self.color)
    }

    pub fn settle_delay_secs(&self) -> f64 {
        self.orientation_settle_ms as f64 / 1000.0
    }

    /// Build an engine in the configured starting state
    pub fn engine(&self) -> ConfigResult<Engine> {
        let state = DrawingState::new(self.tool, self.brush_size, self.color32()?)?;
        let history = HistoryManager::with_max_depth(self.history_depth);
        Ok(Engine::new(state, history).with_pressure_sensitivity(self.pressure_sensitivity))
    }

    pub fn viewport(&self) -> ViewportManager {
        ViewportManager::new(self.settle_delay_secs())
    }

    pub fn exporter(&self) -> Exporter {
        Exporter::new(&self.export_file_name)
    }
}

/// Parse an opaque `#rrggbb` or `#rgb` color. The alpha forms are accepted
/// only when fully opaque.
pub fn parse_hex_color(value: &str) -> ConfigResult<Color32> {
    let color = Color32::from_hex(value).map_err(|err| {
        log::debug!("Rejected color {value:?}: {err:?}");
        ConfigError::InvalidColor(value.to_owned())
    })?;
    if !color.is_opaque() {
        return Err(ConfigError::InvalidColor(value.to_owned()));
    }
    Ok(color)
}
