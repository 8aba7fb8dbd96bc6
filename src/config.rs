use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the REST API binds to
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    7040
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached enrichment artifacts
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Model used for advisory completions
    #[serde(default = "default_advisor_model")]
    pub model: String,
    /// Token budget for explain/troubleshoot completions
    #[serde(default = "default_advice_max_tokens")]
    pub advice_max_tokens: u32,
    /// Token budget for image-grounded completions
    #[serde(default = "default_vision_max_tokens")]
    pub vision_max_tokens: u32,
}

fn default_advisor_model() -> String {
    "claude-3-opus-20240229".to_string()
}

fn default_advice_max_tokens() -> u32 {
    500
}

fn default_vision_max_tokens() -> u32 {
    1000
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: default_advisor_model(),
            advice_max_tokens: default_advice_max_tokens(),
            vision_max_tokens: default_vision_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Seconds between render status polls
    #[serde(default = "default_poll_delay_secs")]
    pub poll_delay_secs: u64,
    /// Number of status polls before a render is declared timed out
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
}

fn default_poll_delay_secs() -> u64 {
    5
}

fn default_poll_max_attempts() -> u32 {
    60
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            poll_delay_secs: default_poll_delay_secs(),
            poll_max_attempts: default_poll_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write logs to a file instead of stderr
    #[serde(default)]
    pub to_file: bool,
    /// Directory for log files when `to_file` is set
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
            dir: default_log_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            advisor: AdvisorConfig::default(),
            avatar: AvatarConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so foldguide works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // User config in ~/.config/foldguide/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("foldguide").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with FOLDGUIDE_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("FOLDGUIDE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Directory log files are written to
    pub fn logs_path(&self) -> PathBuf {
        PathBuf::from(&self.logging.dir)
    }

    /// Delay between render status polls
    pub fn poll_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.avatar.poll_delay_secs)
    }
}
