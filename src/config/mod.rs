//! Configuration records for Strata
//!
//! The window-management core only ever reads these records. They come in
//! through [`crate::context::Context`] as an `Arc<StrataConfig>`; loading
//! them from TOML is a convenience for the binary and for embedders.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::tag::{LayoutKind, MAX_MASTER_RATIO, MIN_MASTER_RATIO};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StrataConfig {
    /// General settings (gaps, debug)
    #[serde(default)]
    pub general: GeneralConfig,

    /// Defaults applied to every new tag
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Tags installed on outputs that no monitor entry configures
    #[serde(default)]
    pub tags: Vec<TagConfig>,

    /// Per-setup monitor arrangements
    #[serde(default)]
    pub monitor_groups: Vec<MonitorGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Gap between tiled windows and around the usable area (pixels)
    pub gap: i32,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    #[serde(default)]
    pub default_layout: LayoutKind,

    #[serde(default = "LayoutConfig::default_master_count")]
    pub master_count: usize,

    #[serde(default = "LayoutConfig::default_master_ratio")]
    pub master_ratio: f64,
}

/// One tag to install on an output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagConfig {
    pub name: String,

    /// Optional glyph shown before the name
    #[serde(default)]
    pub icon: Option<String>,
}

impl TagConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
        }
    }

    /// Icon followed by name, when an icon is set
    pub fn display_name(&self) -> String {
        match self.icon.as_deref() {
            Some(icon) if !icon.is_empty() => format!("{}{}", icon, self.name),
            _ => self.name.clone(),
        }
    }
}

/// A named set of monitor entries for one physical setup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorGroup {
    pub name: String,

    #[serde(default)]
    pub monitors: Vec<MonitorConfig>,
}

/// Settings for one monitor, keyed by an identifier.
///
/// The identifier is matched against connected outputs: plain text must
/// equal the output name, `d:<text>` is a substring of the description and
/// `m:<text>` a substring of `"<make>/<model>"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    pub name: String,

    #[serde(default)]
    pub bars: Vec<BarConfig>,

    /// Tags for this monitor; empty keeps the global list
    #[serde(default)]
    pub tags: Vec<TagConfig>,

    #[serde(default)]
    pub wallpaper: Option<String>,

    #[serde(default)]
    pub position: Option<Position>,

    #[serde(default)]
    pub scale: Option<f64>,

    #[serde(default)]
    pub transform: Option<Transform>,
}

impl MonitorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bars: Vec::new(),
            tags: Vec::new(),
            wallpaper: None,
            position: None,
            scale: None,
            transform: None,
        }
    }
}

/// A docked bar reserving space along one edge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BarConfig {
    #[serde(default = "BarConfig::default_name")]
    pub name: String,

    pub position: BarPosition,

    /// Height for top/bottom bars, width for left/right bars (pixels)
    pub thickness: i32,

    /// Non-exclusive bars overlay windows instead of reserving space
    #[serde(default = "BarConfig::default_exclusive")]
    pub exclusive: bool,
}

impl BarConfig {
    pub fn new(position: BarPosition, thickness: i32) -> Self {
        Self {
            name: Self::default_name(),
            position,
            thickness,
            exclusive: true,
        }
    }

    fn default_name() -> String {
        "bar".to_string()
    }

    fn default_exclusive() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BarPosition {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Output transform requested from the windowing layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Transform {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
    Flipped,
    Flipped90,
    Flipped180,
    Flipped270,
}

/// Reasons a configuration is rejected
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid gap {0}: must not be negative")]
    NegativeGap(i32),

    #[error("invalid master_ratio {0}: must be strictly between 0.05 and 0.95")]
    MasterRatioOutOfRange(f64),

    #[error("duplicate monitor group '{0}'")]
    DuplicateGroup(String),

    #[error("monitor group '{0}' has an entry with an empty identifier")]
    EmptyMonitorIdentifier(String),

    #[error("bar '{bar}' on monitor '{monitor}' has non-positive thickness {thickness}")]
    InvalidBarThickness {
        monitor: String,
        bar: String,
        thickness: i32,
    },

    #[error("invalid scale {scale} for monitor '{monitor}'")]
    InvalidScale { monitor: String, scale: f64 },
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            gap: 10,
            debug: false,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_layout: LayoutKind::MasterStack,
            master_count: Self::default_master_count(),
            master_ratio: Self::default_master_ratio(),
        }
    }
}

impl LayoutConfig {
    fn default_master_count() -> usize {
        1
    }
    fn default_master_ratio() -> f64 {
        0.55
    }
}

impl StrataConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            let rest = path.strip_prefix("~").unwrap_or(path);
            Path::new(&home).join(rest)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file: {}", expanded_path.display()))
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: StrataConfig =
            toml::from_str(contents).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.gap < 0 {
            return Err(ConfigError::NegativeGap(self.general.gap));
        }

        let ratio = self.layout.master_ratio;
        if !(ratio > MIN_MASTER_RATIO && ratio < MAX_MASTER_RATIO) {
            return Err(ConfigError::MasterRatioOutOfRange(ratio));
        }

        let mut seen = HashSet::new();
        for group in &self.monitor_groups {
            if !seen.insert(group.name.as_str()) {
                return Err(ConfigError::DuplicateGroup(group.name.clone()));
            }
            for monitor in &group.monitors {
                if monitor.name.trim().is_empty() {
                    return Err(ConfigError::EmptyMonitorIdentifier(group.name.clone()));
                }
                if let Some(scale) = monitor.scale {
                    if !(scale > 0.0 && scale.is_finite()) {
                        return Err(ConfigError::InvalidScale {
                            monitor: monitor.name.clone(),
                            scale,
                        });
                    }
                }
                if let Some(bar) = monitor.bars.iter().find(|b| b.thickness <= 0) {
                    return Err(ConfigError::InvalidBarThickness {
                        monitor: monitor.name.clone(),
                        bar: bar.name.clone(),
                        thickness: bar.thickness,
                    });
                }
            }
        }

        Ok(())
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn monitor_group(&self, name: &str) -> Option<&MonitorGroup> {
        self.monitor_groups.iter().find(|g| g.name == name)
    }
}
