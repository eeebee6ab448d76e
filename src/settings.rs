use crate::hotkey::{parse_hotkey, Hotkey};
use crate::text::DEFAULT_TEXT;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Appearance of the overlay strip. Fixed values, not a styling system.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OverlaySettings {
    /// Height of the strip in points.
    #[serde(default = "default_height")]
    pub height: f32,
    /// Horizontal inset of the window and of each text half.
    #[serde(default = "default_margin")]
    pub margin: f32,
    /// How far the strip hangs below the bottom edge of the monitor.
    #[serde(default = "default_bottom_overhang")]
    pub bottom_overhang: f32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Opacity applied to the text, `0.0..=1.0`.
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default = "default_text_color")]
    pub text_color: [u8; 3],
}

fn default_height() -> f32 {
    40.0
}

fn default_margin() -> f32 {
    20.0
}

fn default_bottom_overhang() -> f32 {
    20.0
}

fn default_font_size() -> f32 {
    14.0
}

fn default_alpha() -> f32 {
    0.75
}

fn default_text_color() -> [u8; 3] {
    [85, 85, 85]
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            height: default_height(),
            margin: default_margin(),
            bottom_overhang: default_bottom_overhang(),
            font_size: default_font_size(),
            alpha: default_alpha(),
            text_color: default_text_color(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Address the draw endpoint listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Text displayed before the first request arrives.
    #[serde(default = "default_initial_text")]
    pub initial_text: String,
    /// Hotkeys that quit the application.
    #[serde(default = "default_quit_hotkeys")]
    pub quit_hotkeys: Vec<String>,
    /// Send `Access-Control-Allow-*` headers so browser pages can call `/draw`.
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
    /// Run only the HTTP endpoint without opening the overlay.
    #[serde(default)]
    pub headless: bool,
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub overlay: OverlaySettings,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".into()
}

fn default_initial_text() -> String {
    DEFAULT_TEXT.into()
}

fn default_quit_hotkeys() -> Vec<String> {
    vec!["Escape".into(), "Ctrl+C".into()]
}

fn default_enable_cors() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            initial_text: default_initial_text(),
            quit_hotkeys: default_quit_hotkeys(),
            enable_cors: default_enable_cors(),
            headless: false,
            debug_logging: false,
            log_file: None,
            overlay: OverlaySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing or empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.bind_addr))
    }

    /// Parse the configured quit hotkeys, skipping invalid entries.
    pub fn quit_hotkeys(&self) -> Vec<Hotkey> {
        self.quit_hotkeys
            .iter()
            .filter_map(|hotkey| match parse_hotkey(hotkey) {
                Some(k) => Some(k),
                None => {
                    tracing::warn!(
                        "provided quit hotkey string '{}' is invalid; ignoring",
                        hotkey
                    );
                    None
                }
            })
            .collect()
    }
}
