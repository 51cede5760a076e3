pub mod builder;
pub mod defaults;
pub mod file;
pub mod location;

use crate::cli::Overrides;
use crate::error::Result;
use bepipred::core::config::PluginConfig;
use defaults::DefaultsConfig;
use file::FileConfig;
use location::ConfigLocation;
use std::path::Path;
use tracing::debug;

/// Merges command-line overrides, the process environment and the config file.
pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<PluginConfig> {
    let defaults = DefaultsConfig::new()?;

    let file_config = match explicit {
        Some(path) => FileConfig::from_file(path)?,
        None => {
            let path = ConfigLocation::new()?.config_file()?;
            if path.is_file() {
                FileConfig::from_file(&path)?
            } else {
                debug!("No configuration file at {:?}, using defaults.", path);
                FileConfig::default()
            }
        }
    };

    let config = builder::build_config(overrides, file_config, &defaults, |name| {
        std::env::var(name).ok()
    })?;
    debug!("Effective plugin configuration: {:?}", config);
    Ok(config)
}
