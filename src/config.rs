use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Where the peer listens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8891,
            path: "/ws".to_string(),
        }
    }
}

impl LinkConfig {
    /// Overrides the host, e.g. from a `server` query parameter. Empty
    /// overrides are ignored.
    pub fn with_server(mut self, server: Option<&str>) -> Self {
        if let Some(host) = server.filter(|s| !s.is_empty()) {
            self.host = host.to_string();
        }
        self
    }

    pub fn url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, self.path)
    }
}

/// Defaults for newly created node boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub width: f64,
    pub port_radius: f64,
    pub smooth: f64,
    pub port_gap_ratio: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            port_radius: 7.0,
            smooth: 10.0,
            port_gap_ratio: 0.25,
        }
    }
}

/// Top-level editor configuration. Every field has a default, so a partial
/// JSON document is enough.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub link: LinkConfig,
    /// Build the demo graph whenever a fresh catalog arrives.
    pub auto_demo: bool,
    pub geometry: GeometryConfig,
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads the configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}
