use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;
use crate::protocol::PCM_SAMPLE_RATE_HZ;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the scanner back end's websocket lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "platform::default_ws_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_audio_enabled")]
    pub enabled: bool,
    /// Rate of the PCM in binary frames.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Audio buffered before playback (re)starts.
    #[serde(default = "default_prebuffer_ms")]
    pub prebuffer_ms: u32,
    /// Oldest samples are dropped beyond this much queued audio.
    #[serde(default = "default_max_buffer_ms")]
    pub max_buffer_ms: u32,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_show_keys_bar")]
    pub show_keys_bar: bool,
}

impl ServerConfig {
    /// Websocket URL of the back end, e.g. `ws://127.0.0.1:8001/`.
    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("ws://{}:{}{}", self.host, self.port, path)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: platform::default_ws_host(),
            port: default_port(),
            path: default_path(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_audio_enabled(),
            sample_rate: default_sample_rate(),
            prebuffer_ms: default_prebuffer_ms(),
            max_buffer_ms: default_max_buffer_ms(),
            volume: default_volume(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_keys_bar: default_show_keys_bar(),
        }
    }
}

fn default_port() -> u16 {
    platform::DEFAULT_WS_PORT
}

fn default_path() -> String {
    "/".to_string()
}

fn default_audio_enabled() -> bool {
    true
}

fn default_sample_rate() -> u32 {
    PCM_SAMPLE_RATE_HZ
}

fn default_prebuffer_ms() -> u32 {
    250
}

fn default_max_buffer_ms() -> u32 {
    5000
}

fn default_volume() -> f32 {
    1.0
}

fn default_show_keys_bar() -> bool {
    true
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
