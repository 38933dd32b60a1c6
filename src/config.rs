//! Configuration file support for framecrop
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./framecrop.toml` - current directory
//! 3. `~/.config/framecrop/config.toml` - user config
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [crop]
//! margin = 10
//! tolerance = 1000
//! strategy = "independent"
//! blank_policy = "keep-full"
//!
//! [output]
//! jpeg_quality = 90
//! output_dir = "cropped"
//! save_debug = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::frame::{BlankPolicy, CropOptions, ScanStrategy, MAX_DISTANCE};
use crate::image_io::DEFAULT_JPEG_QUALITY;

/// File name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "framecrop.toml";

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Detection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CropConfig {
    /// Margin in pixels
    #[serde(default)]
    pub margin: Option<u32>,

    /// Tolerance in summed 16-bit channel units
    #[serde(default)]
    pub tolerance: Option<u32>,

    /// Scan strategy
    #[serde(default)]
    pub strategy: Option<ScanStrategy>,

    /// Handling of single-color images
    #[serde(default)]
    pub blank_policy: Option<BlankPolicy>,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// JPEG quality (1-100)
    #[serde(default)]
    pub jpeg_quality: Option<u8>,

    /// Directory for output files
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Write debug overlays next to the outputs
    #[serde(default)]
    pub save_debug: Option<bool>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Detection settings
    #[serde(default)]
    pub crop: CropConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub crop: CropOptions,
    pub jpeg_quality: u8,
    pub output_dir: Option<PathBuf>,
    pub save_debug: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            crop: CropOptions::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            output_dir: None,
            save_debug: false,
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default search path
    ///
    /// Search order:
    /// 1. `./framecrop.toml`
    /// 2. `~/.config/framecrop/config.toml`
    /// 3. Default values (if no file found)
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Resolve file settings on top of the defaults
    pub fn to_run_config(&self) -> RunConfig {
        let mut config = RunConfig::default();
        let mut crop = CropOptions::builder();

        if let Some(margin) = self.crop.margin {
            crop = crop.margin(margin);
        }
        if let Some(tolerance) = self.crop.tolerance {
            crop = crop.tolerance(tolerance);
        }
        if let Some(strategy) = self.crop.strategy {
            crop = crop.strategy(strategy);
        }
        if let Some(policy) = self.crop.blank_policy {
            crop = crop.blank_policy(policy);
        }
        config.crop = crop.build();

        if let Some(quality) = self.output.jpeg_quality {
            config.jpeg_quality = quality.clamp(1, 100);
        }
        if let Some(dir) = &self.output.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(save_debug) = self.output.save_debug {
            config.save_debug = save_debug;
        }

        config
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> RunConfig {
        let mut config = self.to_run_config();

        if let Some(margin) = cli.margin {
            config.crop.margin = margin;
        }
        if let Some(tolerance) = cli.tolerance {
            config.crop.tolerance = tolerance.min(MAX_DISTANCE);
        }
        if let Some(strategy) = cli.strategy {
            config.crop.strategy = strategy;
        }
        if let Some(policy) = cli.blank_policy {
            config.crop.blank_policy = policy;
        }
        if let Some(quality) = cli.jpeg_quality {
            config.jpeg_quality = quality.clamp(1, 100);
        }
        if let Some(dir) = &cli.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(save_debug) = cli.save_debug {
            config.save_debug = save_debug;
        }

        config
    }

    /// Get config file search paths
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("framecrop").join("config.toml"));
        }

        paths
    }
}

/// CLI override values for merging with config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub margin: Option<u32>,
    pub tolerance: Option<u32>,
    pub strategy: Option<ScanStrategy>,
    pub blank_policy: Option<BlankPolicy>,
    pub jpeg_quality: Option<u8>,
    pub output_dir: Option<PathBuf>,
    pub save_debug: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}
