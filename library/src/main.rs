//! Romhub - game library launcher
//!
//! # Commands
//!
//! - `romhub launch <system> <game>` - Extract if needed, then run the game
//! - `romhub resolve <system> <game>` - Print the file that would be launched
//! - `romhub install <url>` - Download and extract an emulator or core package
//! - `romhub systems` - List configured systems and their emulators
//! - `romhub games <system>` - List a system's content
//!
//! Systems are configured as `[[systems]]` tables in `config.toml` in the
//! platform config directory, or in the file given with `--config`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use romhub_library::{browse, install, launch, settings};

/// Romhub - game library launcher
#[derive(Parser)]
#[command(name = "romhub")]
#[command(about = "Download, extract and launch games and emulators")]
#[command(version)]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a game with its system's emulator
    Launch(launch::LaunchArgs),

    /// Print the file a game would launch, extracting archives if needed
    Resolve(launch::ResolveArgs),

    /// Download a package and extract it into the install root
    Install(install::InstallArgs),

    /// List configured systems
    Systems,

    /// List the games of a system
    Games(browse::GamesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = settings::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Launch(args) => launch::execute(args, config).await,
        Commands::Resolve(args) => launch::resolve(args, config).await,
        Commands::Install(args) => install::execute(args, config).await,
        Commands::Systems => browse::systems(&config),
        Commands::Games(args) => browse::games(args, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_launch() {
        let cli = Cli::try_parse_from([
            "romhub", "launch", "psx", "Final Fantasy VII", "-e", "duckstation",
        ])
        .unwrap();
        match cli.command {
            Commands::Launch(args) => {
                assert_eq!(args.system, "psx");
                assert_eq!(args.game, "Final Fantasy VII");
                assert_eq!(args.emulator.as_deref(), Some("duckstation"));
                assert!(!args.keep_staging);
            }
            _ => panic!("expected launch"),
        }
    }

    #[test]
    fn test_parse_install_with_global_config() {
        let cli = Cli::try_parse_from([
            "romhub",
            "install",
            "https://host.example/core.zip",
            "--config",
            "/tmp/romhub.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/romhub.toml")));
        assert!(matches!(cli.command, Commands::Install(ref args) if args.dest.is_none()));
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["romhub"]).is_err());
    }
}
