use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::BBox;

pub const DEFAULT_OUTPUT: &str = "public/data/kelurahan_osm.json";
pub const DEFAULT_ADMIN_LEVEL: u8 = 8;

/// Extra client-side time so a server-side `[timeout:N]` remark can still arrive
const CLIENT_TIMEOUT_MARGIN_SECS: u64 = 10;

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub bbox: Option<BBox>,
    #[serde(default)]
    pub admin_level: Option<u8>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub overpass: Option<OverpassConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: default_overpass_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OverpassConfig {
    /// HTTP timeout, slightly longer than the query timeout sent to the server
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs + CLIENT_TIMEOUT_MARGIN_SECS)
    }
}

impl FileConfig {
    /// Load the first config file found in the search paths.
    ///
    /// Unparseable files are reported and skipped.
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("osm-boundaries.toml"));
    paths.push(PathBuf::from(".osm-boundaries.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("osm-boundaries").join("config.toml"));
        paths.push(config_dir.join("osm-boundaries.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".osm-boundaries.toml"));
        paths.push(
            home.join(".config")
                .join("osm-boundaries")
                .join("config.toml"),
        );
    }

    paths
}
