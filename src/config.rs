//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dataset::DEFAULT_DATASET_URL;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub tooltip: TooltipConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the race results come from
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_url")]
    pub url: String,

    /// Local JSON file used instead of the URL when set
    pub file: Option<PathBuf>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_dataset_url() -> String {
    DEFAULT_DATASET_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url: default_dataset_url(),
            file: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl DatasetConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Drawing surface and plot geometry
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    /// Gap between the canvas edge and the plot area, on all sides
    #[serde(default = "default_padding")]
    pub padding: f64,

    #[serde(default = "default_marker_radius")]
    pub marker_radius: f64,

    /// Diameter of the legend swatches
    #[serde(default = "default_swatch_size")]
    pub legend_swatch: f64,
}

fn default_width() -> f64 {
    1000.0
}

fn default_height() -> f64 {
    600.0
}

fn default_padding() -> f64 {
    75.0
}

fn default_marker_radius() -> f64 {
    5.0
}

fn default_swatch_size() -> f64 {
    20.0
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            padding: default_padding(),
            marker_radius: default_marker_radius(),
            legend_swatch: default_swatch_size(),
        }
    }
}

/// Tooltip placement, sizing and animation
#[derive(Debug, Clone, Deserialize)]
pub struct TooltipConfig {
    /// Fade duration; the hide timer uses the same value
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,

    /// Times whose minute component is below this open below the marker
    #[serde(default = "default_minute_threshold")]
    pub minute_threshold: u32,

    /// Years before this open to the right of the marker
    #[serde(default = "default_year_threshold")]
    pub year_threshold: i32,

    /// Gap between marker top and tooltip when opening below
    #[serde(default = "default_vertical_offset")]
    pub vertical_offset: f64,

    #[serde(default = "default_char_width")]
    pub char_width: f64,

    #[serde(default = "default_line_height")]
    pub line_height: f64,

    #[serde(default = "default_tooltip_padding")]
    pub padding: f64,

    #[serde(default = "default_max_width")]
    pub max_width: f64,
}

fn default_fade_ms() -> u64 {
    300
}

fn default_minute_threshold() -> u32 {
    38
}

fn default_year_threshold() -> i32 {
    2005
}

fn default_vertical_offset() -> f64 {
    10.0
}

fn default_char_width() -> f64 {
    7.0
}

fn default_line_height() -> f64 {
    18.0
}

fn default_tooltip_padding() -> f64 {
    10.0
}

fn default_max_width() -> f64 {
    320.0
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            fade_ms: default_fade_ms(),
            minute_threshold: default_minute_threshold(),
            year_threshold: default_year_threshold(),
            vertical_offset: default_vertical_offset(),
            char_width: default_char_width(),
            line_height: default_line_height(),
            padding: default_tooltip_padding(),
            max_width: default_max_width(),
        }
    }
}

impl TooltipConfig {
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("cyclist-scatter").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Dataset overrides
        if let Ok(url) = std::env::var("CYCLIST_DATASET_URL") {
            self.dataset.url = url;
        }
        if let Ok(file) = std::env::var("CYCLIST_DATASET_FILE") {
            self.dataset.file = Some(PathBuf::from(file));
        }

        // Canvas overrides
        if let Some(width) = env_parse("CYCLIST_CANVAS_WIDTH") {
            self.canvas.width = width;
        }
        if let Some(height) = env_parse("CYCLIST_CANVAS_HEIGHT") {
            self.canvas.height = height;
        }

        // API overrides
        if let Ok(host) = std::env::var("CYCLIST_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = env_parse("CYCLIST_API_PORT") {
            self.api.port = port;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("CYCLIST_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CYCLIST_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Cyclist Scatter Configuration
#
# Environment variables override these settings:
# - CYCLIST_DATASET_URL
# - CYCLIST_DATASET_FILE
# - CYCLIST_CANVAS_WIDTH / CYCLIST_CANVAS_HEIGHT
# - CYCLIST_API_HOST / CYCLIST_API_PORT
# - CYCLIST_LOG_LEVEL / CYCLIST_LOG_FORMAT

[dataset]
# JSON endpoint serving the race results
url = "{url}"

# Local copy of the payload, used instead of the URL when set
# file = "./cyclist-data.json"

# Request timeout in seconds
request_timeout_secs = 30

[canvas]
# Drawing surface size in pixels
width = 1000
height = 600

# Gap between the canvas edge and the plot on all sides
padding = 75

# Marker radius
marker_radius = 5

# Legend swatch diameter
legend_swatch = 20

[tooltip]
# Fade in/out duration (ms); the tooltip is hidden once the fade-out ends
fade_ms = 300

# Finish times with minutes below this open below the marker
minute_threshold = 38

# Years before this open to the right of the marker
year_threshold = 2005

# Text metrics used to size the tooltip
vertical_offset = 10
char_width = 7
line_height = 18
padding = 10
max_width = 320

[api]
host = "127.0.0.1"
port = 8090

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#,
        url = DEFAULT_DATASET_URL
    )
}
