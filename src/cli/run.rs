use super::config::{default_config_path, BoshuConfig};
use super::logging::init_logging;
use boshu::chat::{BotConfig, ConsoleClient, OutputFormat, RecruitBot};
use std::path::PathBuf;
use tracing::info;

/// Run the bot service
///
/// Starts the recruitment bot on the console transport: events are read from
/// stdin one per line, cards and notices are written to stdout.
///
/// ## Configuration Loading
///
/// 1. `--config` flag if provided
/// 2. Default config at `~/.config/boshu/config.toml`
///
/// If the config file doesn't exist, a default one is generated.
pub async fn execute(
    config_path: Option<String>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_or_create(config_path)?;
    init_logging(&config.logging)?;

    info!(
        default_limit = config.recruitment.default_limit,
        default_deadline = %config.recruitment.default_deadline,
        "Starting boshu bot on console transport"
    );

    let bot_config = BotConfig {
        defaults: config.recruitment.to_defaults(),
    };
    let mut bot = RecruitBot::new(ConsoleClient::stdin(format), bot_config);
    bot.run().await?;

    Ok(())
}

fn load_or_create(config_path: Option<String>) -> Result<BoshuConfig, Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        eprintln!("📝 No config file found. Creating default configuration...");
        BoshuConfig::create_default(&config_path)?;
        eprintln!("   Created: {}", config_path.display());
    }

    BoshuConfig::load(&config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_existing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[recruitment]\ndefault_limit = 3\n").unwrap();

        let config = load_or_create(Some(config_path.to_string_lossy().to_string())).unwrap();
        assert_eq!(config.recruitment.default_limit, 3);
    }

    #[test]
    fn test_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("boshu").join("config.toml");
        assert!(!config_path.exists());

        let config = load_or_create(Some(config_path.to_string_lossy().to_string())).unwrap();

        assert!(config_path.exists());
        assert_eq!(config.recruitment.default_limit, 4);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[recruitment\n").unwrap();

        assert!(load_or_create(Some(config_path.to_string_lossy().to_string())).is_err());
    }
}
