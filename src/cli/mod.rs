use boshu::chat::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};

pub mod check_deadline;
pub mod config;
pub mod logging;
pub mod run;
pub mod version;

#[derive(Parser)]
#[command(name = "boshu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Timed group sign-up bot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for the console transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot on the console transport (events on stdin, cards on stdout)
    Run {
        /// Path to config file (default: ~/.config/boshu/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// How cards and notices are printed
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Show how a deadline such as "10m" or "21:30" resolves right now
    CheckDeadline {
        /// Deadline text
        input: String,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run { config, format } => run::execute(config, format.into()).await,
        Commands::CheckDeadline { input } => check_deadline::execute(&input),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
