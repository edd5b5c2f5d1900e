//! Parse config from the config file

use crate::model::LatLng;
use serde::Deserialize;
use std::{
    env,
    fmt::{self, Display, Formatter},
    fs::read_to_string,
    io,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

const CONFIG_ENV: &str = "HUTMAP_CONFIG";
const API_URL_ENV: &str = "HUTMAP_API_URL";

#[derive(Debug)]
pub enum ConfigError {
    ConfigFileRead(io::Error),
    TomlParse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigFileRead(e) => write!(f, "Unable to read config file: {e}"),
            Self::TomlParse(e) => write!(f, "Unable to parse config file as toml: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub start: LatLng,
    pub start_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Corners of the hunting area.
    pub bounds: Vec<LatLng>,
    pub restrict_to_bounds: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            start: LatLng::new(51.437_285_5, 7.878_100_2),
            start_zoom: 15.0,
            min_zoom: 10.0,
            max_zoom: 17.0,
            bounds: vec![
                LatLng::new(51.448_635_880_508_2, 7.857_112_884_521_49),
                LatLng::new(51.446_289_525_498_2, 7.898_397_445_678_71),
                LatLng::new(51.421_502_501_715_1, 7.899_684_906_005_86),
                LatLng::new(51.422_786_300_180_3, 7.854_194_641_113_28),
            ],
            restrict_to_bounds: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub ngrok_skip_header: Header,
    pub log_level: String,
    pub wind_refresh_secs: u64,
    pub session_file: Option<PathBuf>,
    pub map: MapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_owned(),
            ngrok_skip_header: Header {
                name: "ngrok-skip-browser-warning".to_owned(),
                value: "skip-browser-warning".to_owned(),
            },
            log_level: "info".to_owned(),
            wind_refresh_secs: 60 * 60,
            session_file: None,
            map: MapConfig::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|dir| dir.join("hutmap").join("config.toml")))
    }

    /// Loads the config file; a missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => {
                debug!("no config file, using defaults");
                Self::default()
            }
        };
        if let Ok(api_url) = env::var(API_URL_ENV) {
            config.api_url = api_url;
        }
        Ok(config.normalized())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("reading config from {}", path.display());
        let content = read_to_string(path).map_err(ConfigError::ConfigFileRead)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(content)
            .map(Self::normalized)
            .map_err(ConfigError::TomlParse)
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.api_url.trim_end_matches('/').len();
        self.api_url.truncate(trimmed);
        if self.map.min_zoom > self.map.max_zoom {
            std::mem::swap(&mut self.map.min_zoom, &mut self.map.max_zoom);
        }
        self
    }

    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(env::temp_dir)
                .join("hutmap")
                .join("session.json")
        })
    }

    pub fn wind_refresh(&self) -> Duration {
        Duration::from_secs(self.wind_refresh_secs.max(60))
    }
}
