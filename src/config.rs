//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{Result, Wt440hError};
use crate::protocol::dedup::DEFAULT_DEDUP_WINDOW_US;
use crate::protocol::layout::LayoutVersion;
use crate::protocol::timing::{Timing, DEFAULT_BIT_LENGTH_US, DEFAULT_TOLERANCE_US};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Bit timing configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_bit_length_us")]
    pub bit_length_us: u32,

    #[serde(default = "default_tolerance_us")]
    pub tolerance_us: u32,
}

/// Frame layout configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct FrameConfig {
    #[serde(default)]
    pub layout: LayoutVersion,
}

/// Retransmission filter configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DedupConfig {
    #[serde(default = "default_window_us")]
    pub window_us: u32,
}

/// Edge to frame hand-off configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PipelineConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Reading output configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub format: String,
}

// Default value functions
fn default_bit_length_us() -> u32 { DEFAULT_BIT_LENGTH_US }
fn default_tolerance_us() -> u32 { DEFAULT_TOLERANCE_US }

fn default_window_us() -> u32 { DEFAULT_DEDUP_WINDOW_US }

fn default_channel_capacity() -> usize { 1024 }

fn default_output_format() -> String { "text".to_string() }

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            bit_length_us: default_bit_length_us(),
            tolerance_us: default_tolerance_us(),
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self { window_us: default_window_us() }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { channel_capacity: default_channel_capacity() }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: default_output_format() }
    }
}

impl TimingConfig {
    /// Classification bands for these settings
    ///
    /// # Errors
    ///
    /// Returns `InvalidTiming` if the bands would overlap
    pub fn timing(&self) -> Result<Timing> {
        Timing::new(self.bit_length_us, self.tolerance_us)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wt440h_rx::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Bands must classify every interval unambiguously
        self.timing.timing()?;

        if self.dedup.window_us == 0 {
            return Err(Wt440hError::Config(
                toml::de::Error::custom("dedup window_us must be greater than 0")
            ));
        }

        if self.pipeline.channel_capacity == 0 {
            return Err(Wt440hError::Config(
                toml::de::Error::custom("channel_capacity must be greater than 0")
            ));
        }

        if !["text", "jsonl"].contains(&self.output.format.as_str()) {
            return Err(Wt440hError::Config(
                toml::de::Error::custom("output format must be 'text' or 'jsonl'")
            ));
        }

        Ok(())
    }
}
