//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use platen_core::config::Config;

mod commands;

#[derive(Parser)]
#[command(name = "platen")]
#[command(version)]
#[command(about = "Terminal chat widget for the platen answer service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Chat on stdin/stdout without the full-screen widget
    Chat,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // default to the full-screen widget
    let Some(command) = cli.command else {
        let config = Config::load().context("load config")?;
        let _guard = crate::logging::init()?;
        return platen_tui::run(config);
    };

    match command {
        Commands::Chat => {
            let config = Config::load().context("load config")?;
            let _guard = crate::logging::init()?;
            commands::chat::run(&config).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
