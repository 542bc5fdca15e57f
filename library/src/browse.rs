//! Systems and games listings

use anyhow::Result;
use clap::Args;
use romhub_core::config::{self, Config};
use romhub_core::library::{resolve_system, scan_system};
use romhub_shared::SystemLaunchConfig;

use crate::output::{format_bytes, lookup_error};

/// Arguments for the games command
#[derive(Args, Debug)]
pub struct GamesArgs {
    /// System name (case-insensitive, unique prefixes accepted)
    pub system: String,
}

/// Execute the systems command
pub fn systems(config: &Config) -> Result<()> {
    if config.systems.is_empty() {
        match config::config_path() {
            Some(path) => println!("No systems configured. Add [[systems]] to {}", path.display()),
            None => println!("No systems configured."),
        }
        return Ok(());
    }

    for system in &config.systems {
        println!("{}", describe_system(system));
        for (i, emulator) in system.emulators.iter().enumerate() {
            let marker = if i == 0 { "*" } else { " " };
            println!(
                "  {} {} ({})",
                marker,
                emulator.name,
                emulator.executable.display()
            );
        }
    }

    Ok(())
}

/// Execute the games command
pub fn games(args: GamesArgs, config: &Config) -> Result<()> {
    let system = resolve_system(&args.system, &config.systems).map_err(lookup_error)?;
    let games = scan_system(system);

    if games.is_empty() {
        println!(
            "No games found for {} in {}",
            system.name,
            system.rom_folder.display()
        );
        return Ok(());
    }

    for game in &games {
        println!("{:<48} {:>10}", game.title, format_bytes(game.size_bytes));
    }
    println!("\n{} game(s)", games.len());

    Ok(())
}

fn describe_system(system: &SystemLaunchConfig) -> String {
    let mut line = format!("{} [{}]", system.name, system.rom_folder.display());
    if system.extract_before_launch {
        line.push_str(&format!(
            " extracts, launches {}",
            system.launch_extensions.join("/")
        ));
    }
    line
}
