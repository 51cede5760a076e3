use crate::cli::{ConfigArgs, ConfigCommands};
use crate::config::location::ConfigLocation;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// `explicit` is the `--config` value, which wins over the stored location.
pub fn run(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    let location = ConfigLocation::new()?;
    match args.command {
        ConfigCommands::Path => handle_path(&location, explicit),
        ConfigCommands::SetPath { path } => handle_set_path(&location, path),
        ConfigCommands::ResetPath => handle_reset_path(&location),
    }
}

fn handle_path(location: &ConfigLocation, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => location.config_file()?,
    };
    println!("{}", path.display());
    if !path.exists() {
        println!("(file does not exist yet; built-in defaults are in effect)");
    }
    Ok(())
}

fn handle_set_path(location: &ConfigLocation, path: PathBuf) -> Result<()> {
    info!("Setting custom configuration path to {:?}", path);
    location.set_custom_path(&path)?;
    println!("✓ Configuration path set to: {}", path.display());
    Ok(())
}

fn handle_reset_path(location: &ConfigLocation) -> Result<()> {
    info!("Resetting configuration path to default.");
    location.reset_path()?;
    println!(
        "✓ Configuration path reset to default: {}",
        location.default_config_file().display()
    );
    Ok(())
}
