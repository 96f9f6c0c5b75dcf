use directories::ProjectDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Toml(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Toml(e)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CselConfig {
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(flatten)]
    pub ui: UiConfig,
}

/// `[renderer]` section: how the overlay process is invoked
#[derive(Debug, Deserialize, Clone)]
pub struct RendererConfig {
    /// Runtime command that executes the renderer script
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Renderer script path; defaults to `overlay.swift` in the data dir
    #[serde(default)]
    pub script: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            script: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,
    #[serde(default = "default_cursor")]
    pub cursor: String,
    #[serde(default)]
    pub hard_stop: bool,
    #[serde(default = "default_true")]
    pub rounded_borders: bool,
    #[serde(default = "default_white")]
    pub main_border_color: String,
    #[serde(default = "default_white")]
    pub list_border_color: String,
    #[serde(default = "default_white")]
    pub input_border_color: String,
    #[serde(default = "default_white")]
    pub main_text_color: String,
    #[serde(default = "default_white")]
    pub list_text_color: String,
    #[serde(default = "default_white")]
    pub input_text_color: String,
    #[serde(default = "default_white")]
    pub header_title_color: String,
}

// Default value implementations for serde
fn default_runtime() -> String {
    "swift".to_string()
}
fn default_true() -> bool {
    true
}
fn default_highlight_color() -> String {
    "LightBlue".to_string()
}
fn default_cursor() -> String {
    "█".to_string()
}
fn default_white() -> String {
    "White".to_string()
}

impl Default for CselConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            ui: UiConfig {
                highlight_color: default_highlight_color(),
                cursor: default_cursor(),
                hard_stop: false,
                rounded_borders: true,
                main_border_color: default_white(),
                list_border_color: default_white(),
                input_border_color: default_white(),
                main_text_color: default_white(),
                list_text_color: default_white(),
                input_text_color: default_white(),
                header_title_color: default_white(),
            },
        }
    }
}

impl CselConfig {
    pub fn new(cli_config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Determine config file path
        // Priority: CLI arg > XDG_CONFIG_HOME > Default fallback
        let cli_provided = cli_config_path.is_some();
        let config_path = if let Some(path) = cli_config_path {
            Some(path)
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "csel") {
            let mut p = proj_dirs.config_dir().to_path_buf();
            p.push("config.toml");
            Some(p)
        } else {
            None
        };

        // Load config from file or use defaults
        let mut cfg: CselConfig = if let Some(ref path) = config_path {
            if path.exists() {
                let contents = fs::read_to_string(path)?;
                toml::from_str(&contents)?
            } else if cli_provided {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Config file not found at {}", path.display()),
                )
                .into());
            } else {
                CselConfig::default()
            }
        } else {
            CselConfig::default()
        };

        // Override with CSEL_* environment variables
        if let Ok(val) = env::var("CSEL_RENDERER_RUNTIME") {
            cfg.renderer.runtime = val;
        }
        if let Ok(val) = env::var("CSEL_RENDERER_SCRIPT") {
            cfg.renderer.script = Some(PathBuf::from(val));
        }
        if let Ok(val) = env::var("CSEL_HIGHLIGHT_COLOR") {
            cfg.ui.highlight_color = val;
        }
        if let Ok(val) = env::var("CSEL_CURSOR") {
            cfg.ui.cursor = val;
        }
        if let Ok(val) = env::var("CSEL_HARD_STOP") {
            cfg.ui.hard_stop = val.parse().unwrap_or(cfg.ui.hard_stop);
        }
        if let Ok(val) = env::var("CSEL_ROUNDED_BORDERS") {
            cfg.ui.rounded_borders = val.parse().unwrap_or(cfg.ui.rounded_borders);
        }

        Ok(cfg)
    }
}
