#![forbid(unsafe_code)]

//! Editor configuration loaded from TOML or JSON.
//!
//! ```toml
//! # panelforge.toml
//! [page]
//! width = 800
//! height = 1000
//!
//! [snap]
//! enabled = true
//! grid_size = 25
//!
//! [history]
//! max_depth = 200
//! ```
//!
//! ```rust,ignore
//! let config = EditorConfig::from_path("panelforge.toml")?;
//! let editor = Editor::new(&config);
//! ```
//!
//! Every field has a default equal to the engine's built-in constant, so an
//! empty file yields `EditorConfig::default()`.

use std::path::Path;

use panelforge_core::geometry::{DEFAULT_GUTTER, MIN_PANEL_SIZE, Point, Size};
use panelforge_layout::{
    DEFAULT_DUPLICATE_OFFSET, DEFAULT_HANDLE_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_PANEL_SIZE,
    DEFAULT_PLACEMENT_ORIGIN, LayoutRules, SnapRules,
};
use serde::{Deserialize, Serialize};

use crate::undo::HistoryConfig;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub page: PageConfig,
    pub geometry: GeometryConfig,
    pub snap: SnapConfig,
    pub placement: PlacementConfig,
    pub history: HistoryPolicyConfig,
    pub interaction: InteractionConfig,
}

/// Size of newly created pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_PAGE_SIZE.width,
            height: DEFAULT_PAGE_SIZE.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Minimum panel width and height.
    pub min_size: i32,
    /// Gutter kept between auto-placed panels.
    pub gutter: i32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            min_size: MIN_PANEL_SIZE,
            gutter: DEFAULT_GUTTER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    pub grid_size: i32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        let rules = SnapRules::default();
        Self {
            enabled: rules.enabled,
            grid_size: rules.grid_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub origin_x: i32,
    pub origin_y: i32,
    pub panel_width: i32,
    pub panel_height: i32,
    pub duplicate_offset_x: i32,
    pub duplicate_offset_y: i32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            origin_x: DEFAULT_PLACEMENT_ORIGIN.x,
            origin_y: DEFAULT_PLACEMENT_ORIGIN.y,
            panel_width: DEFAULT_PANEL_SIZE.width,
            panel_height: DEFAULT_PANEL_SIZE.height,
            duplicate_offset_x: DEFAULT_DUPLICATE_OFFSET.x,
            duplicate_offset_y: DEFAULT_DUPLICATE_OFFSET.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryPolicyConfig {
    /// Undo entries kept per page, baseline included.
    pub max_depth: usize,
}

impl Default for HistoryPolicyConfig {
    fn default() -> Self {
        Self {
            max_depth: HistoryConfig::default().max_depth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Edge length of corner resize handles.
    pub handle_size: i32,
    /// Arrow-key step when snapping is off.
    pub nudge_step: i32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            handle_size: DEFAULT_HANDLE_SIZE,
            nudge_step: 1,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load by extension (`.json` is JSON, anything else TOML) and validate.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        let errors = config.validate();
        if errors.is_empty() {
            tracing::debug!(path = %path.display(), "editor config loaded");
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Range checks; an empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut positive = |name: &str, value: i64| {
            if value <= 0 {
                errors.push(format!("{name} must be positive, got {value}"));
            }
        };
        positive("page.width", i64::from(self.page.width));
        positive("page.height", i64::from(self.page.height));
        positive("geometry.min_size", i64::from(self.geometry.min_size));
        positive("placement.panel_width", i64::from(self.placement.panel_width));
        positive("placement.panel_height", i64::from(self.placement.panel_height));
        positive("interaction.handle_size", i64::from(self.interaction.handle_size));
        positive("interaction.nudge_step", i64::from(self.interaction.nudge_step));
        positive(
            "history.max_depth",
            i64::try_from(self.history.max_depth).unwrap_or(i64::MAX),
        );
        if self.snap.enabled && self.snap.grid_size <= 0 {
            errors.push(format!(
                "snap.grid_size must be positive when snapping is enabled, got {}",
                self.snap.grid_size
            ));
        }
        if self.geometry.gutter < 0 {
            errors.push(format!(
                "geometry.gutter must not be negative, got {}",
                self.geometry.gutter
            ));
        }
        errors
    }

    #[must_use]
    pub fn layout_rules(&self) -> LayoutRules {
        LayoutRules {
            page_size: Size::new(self.page.width, self.page.height),
            min_size: self.geometry.min_size,
            gutter: self.geometry.gutter,
            snap: SnapRules {
                enabled: self.snap.enabled,
                grid_size: self.snap.grid_size,
            },
            placement_origin: Point::new(self.placement.origin_x, self.placement.origin_y),
            panel_size: Size::new(self.placement.panel_width, self.placement.panel_height),
            duplicate_offset: Point::new(
                self.placement.duplicate_offset_x,
                self.placement.duplicate_offset_y,
            ),
            handle_size: self.interaction.handle_size,
        }
    }

    #[must_use]
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            max_depth: self.history.max_depth,
        }
    }
}

/// Errors that can occur when loading an editor configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    /// Range check failures from [`EditorConfig::validate`].
    Invalid(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Invalid(errors) => write!(f, "invalid config: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}
