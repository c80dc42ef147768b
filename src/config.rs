// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::{Codec, DEFAULT_ENCODER, EncodingProfile, RenamePolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Encoder executable (name on PATH or absolute path)
    #[serde(default = "default_program")]
    pub program: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub codec: Codec,

    /// Constant rate factor used when the option string has no digits
    #[serde(default = "default_quality")]
    pub quality: u32,

    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub hardware_acceleration: bool,

    /// Write `<name>_copy.<ext>` next to the source instead of replacing it
    #[serde(default)]
    pub keep_original: bool,

    /// Seconds to wait for a key before continuing with defaults
    #[serde(default = "default_prompt_timeout_secs")]
    pub prompt_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Delay between attempts when the output target is locked
    #[serde(default = "default_placement_retry_secs")]
    pub placement_retry_secs: u64,

    /// Refuse to start while another instance holds `.ffcrush.lock` in the
    /// working directory
    #[serde(default)]
    pub lock_file: bool,

    /// Append commands and encoder failures to `ffcrush.log` in the working directory
    #[serde(default = "default_true_config")]
    pub debug_log: bool,
}

fn default_program() -> String {
    DEFAULT_ENCODER.to_string()
}

fn default_quality() -> u32 {
    24
}

fn default_extension() -> String {
    "mp4".to_string()
}

fn default_prompt_timeout_secs() -> u64 {
    5
}

fn default_placement_retry_secs() -> u64 {
    5
}

fn default_true_config() -> bool {
    true
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            codec: Codec::H264,
            quality: default_quality(),
            extension: default_extension(),
            hardware_acceleration: false,
            keep_original: false,
            prompt_timeout_secs: default_prompt_timeout_secs(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            placement_retry_secs: default_placement_retry_secs(),
            lock_file: false,
            debug_log: default_true_config(),
        }
    }
}

impl DefaultsConfig {
    /// Profile the option string is decoded on top of
    pub fn profile(&self) -> EncodingProfile {
        EncodingProfile {
            codec: self.codec,
            quality: self.quality,
            hardware_acceleration: self.hardware_acceleration,
            extension: self.extension.clone(),
            rename_policy: if self.keep_original {
                RenamePolicy::keep_original()
            } else {
                RenamePolicy::ReplaceInPlace
            },
            ..EncodingProfile::default()
        }
        .finalize()
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }
}

impl RunConfig {
    pub fn placement_retry_delay(&self) -> Duration {
        Duration::from_secs(self.placement_retry_secs)
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("ffcrush")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("ffcrush")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            let config: Config = toml::from_str(&contents).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?;

            Ok(config)
        } else {
            let config = Config::default();

            // Not being able to write the default file is not fatal
            if let Err(e) = config.save() {
                tracing::warn!(
                    "Could not create default config file: {:#}. Run 'ffcrush init-config' to create one.",
                    e
                );
            }

            Ok(config)
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }
}
