//! Boshu configuration file handling
//!
//! Provides default configuration generation and loading for the bot.
//! Configuration files are TOML format.
//!
//! Only operator settings live here: defaults for the recruitment command and
//! logging. Recruitments themselves are never written anywhere.

use boshu::recruit::command::{RecruitDefaults, DEFAULT_DEADLINE, DEFAULT_LIMIT};
use boshu::recruit::deadline::parse_deadline;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Boshu bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoshuConfig {
    /// Defaults for options left out of the recruitment command
    #[serde(default)]
    pub recruitment: RecruitmentConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recruitment command defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruitmentConfig {
    /// Participant limit when `--limit` is not given
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Deadline when `--deadline` is not given ("10m", "2h", "21:30")
    #[serde(default = "default_deadline")]
    pub default_deadline: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_deadline() -> String {
    DEFAULT_DEADLINE.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for RecruitmentConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            default_deadline: DEFAULT_DEADLINE.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl RecruitmentConfig {
    pub fn to_defaults(&self) -> RecruitDefaults {
        RecruitDefaults {
            limit: self.default_limit,
            deadline: self.default_deadline.clone(),
        }
    }
}

impl BoshuConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: BoshuConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        config
            .validate()
            .map_err(|e| format!("Invalid config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Reject defaults the recruitment command could never accept
    pub fn validate(&self) -> Result<(), String> {
        if self.recruitment.default_limit == 0 {
            return Err("recruitment.default_limit must be at least 1".to_string());
        }

        parse_deadline(&self.recruitment.default_deadline, &chrono::Local::now())
            .map_err(|e| format!("recruitment.default_deadline: {}", e))?;

        Ok(())
    }

    /// Save configuration to a TOML file
    #[allow(dead_code)] // Used by tests; the CLI only writes the commented template
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        format!(
            r#"# Boshu Bot Configuration
#
# Recruitments are kept in memory only. Restarting the bot drops every
# open recruitment.

[recruitment]
# Participant limit used when /boshu is invoked without --limit (>= 1)
default_limit = {limit}

# Deadline used when /boshu is invoked without --deadline
# Relative ("10m", "2h") or a local clock time ("21:30")
default_deadline = "{deadline}"

[logging]
# Log level: trace, debug, info, warn, error
# RUST_LOG overrides this when set
level = "{level}"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/boshu/boshu.log"
"#,
            limit = DEFAULT_LIMIT,
            deadline = DEFAULT_DEADLINE,
            level = DEFAULT_LOG_LEVEL,
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, Self::generate_default_toml()).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Get the default config file path
///
/// - Linux: ~/.config/boshu/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("boshu")
        .join("config.toml")
}
