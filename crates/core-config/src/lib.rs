//! Configuration loading and parsing.
//!
//! Parses `cadence.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [layout]
//! rows = 2
//! cols = 2
//! pages = ["now_playing", "queue", "search"]
//!
//! [render]
//! refresh_ms = 1000
//! frame_ms = 16
//!
//! [[keys]]
//! key = "c"
//! modifiers = ["ctrl"]
//! action = "quit"
//! ```
//!
//! Every section is optional. A missing file or a parse error yields defaults;
//! unknown fields are ignored. Key bindings are loaded once at startup and merged
//! over the built-in defaults (see [`core_keymap::merge_mappings`]).

use anyhow::Result;
use core_events::ModMask;
use core_keymap::{KeyMapping, default_mappings, merge_mappings};
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Page types that can occupy a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    NowPlaying,
    Queue,
    Search,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_rows")]
    pub rows: u32,
    #[serde(default = "LayoutConfig::default_cols")]
    pub cols: u32,
    #[serde(default = "LayoutConfig::default_pages")]
    pub pages: Vec<PageKind>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rows: Self::default_rows(),
            cols: Self::default_cols(),
            pages: Self::default_pages(),
        }
    }
}

impl LayoutConfig {
    const fn default_rows() -> u32 {
        2
    }
    const fn default_cols() -> u32 {
        2
    }
    fn default_pages() -> Vec<PageKind> {
        vec![PageKind::NowPlaying, PageKind::Queue, PageKind::Search]
    }

    /// Largest accepted row or column count. Past this no page fits any
    /// real terminal anyway.
    pub const MAX_CELLS_PER_AXIS: u32 = 16;

    /// Clamp rows/cols into `1..=MAX_CELLS_PER_AXIS`.
    pub fn normalized(mut self) -> Self {
        if self.rows > Self::MAX_CELLS_PER_AXIS || self.cols > Self::MAX_CELLS_PER_AXIS {
            warn!(target: "config", rows = self.rows, cols = self.cols, "layout_dimensions_clamped");
        }
        self.rows = self.rows.clamp(1, Self::MAX_CELLS_PER_AXIS);
        self.cols = self.cols.clamp(1, Self::MAX_CELLS_PER_AXIS);
        self
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    #[serde(default = "RenderConfig::default_refresh_ms")]
    pub refresh_ms: u64,
    #[serde(default = "RenderConfig::default_frame_ms")]
    pub frame_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            refresh_ms: Self::default_refresh_ms(),
            frame_ms: Self::default_frame_ms(),
        }
    }
}

impl RenderConfig {
    const fn default_refresh_ms() -> u64 {
        1000
    }
    const fn default_frame_ms() -> u64 {
        16
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct KeyConfig {
    pub key: String,
    #[serde(default)]
    pub modifiers: Option<Vec<String>>,
    pub action: String,
}

impl KeyConfig {
    /// Convert to a mapping; `None` when a modifier name is not recognized.
    pub fn to_mapping(&self) -> Option<KeyMapping> {
        let modifiers = match &self.modifiers {
            None => None,
            Some(names) => {
                let mut mask = ModMask::empty();
                for name in names {
                    mask |= ModMask::parse_name(name)?;
                }
                Some(mask)
            }
        };
        Some(KeyMapping::new(self.key.clone(), modifiers, self.action.clone()))
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub keys: Vec<KeyConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("cadence.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("cadence").join("cadence.toml");
    }
    PathBuf::from("cadence.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_error");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn layout(&self) -> LayoutConfig {
        self.file.layout.clone().normalized()
    }

    pub fn render(&self) -> RenderConfig {
        self.file.render
    }

    /// Built-in bindings merged with the user's `[[keys]]` entries.
    pub fn key_mappings(&self) -> Vec<KeyMapping> {
        let user: Vec<KeyMapping> = self
            .file
            .keys
            .iter()
            .filter_map(|k| {
                let mapping = k.to_mapping();
                match &mapping {
                    None => {
                        warn!(target: "config", key = k.key.as_str(), "key_binding_bad_modifier");
                    }
                    Some(m) if m.shift_unreachable() => {
                        warn!(target: "config", key = k.key.as_str(), "key_binding_shift_never_matches");
                    }
                    Some(_) => {}
                }
                mapping
            })
            .collect();
        merge_mappings(default_mappings(), &user)
    }
}
