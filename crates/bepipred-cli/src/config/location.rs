use super::defaults::project_dirs;
use crate::error::{CliError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PATH_CONF: &str = "path.conf";
const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Where the plugin configuration file lives.
///
/// The default sits in the OS config directory; `set-path` stores a custom location in a
/// small `path.conf` next to it.
#[derive(Debug)]
pub struct ConfigLocation {
    config_dir: PathBuf,
}

impl ConfigLocation {
    pub fn new() -> Result<Self> {
        let dirs = project_dirs()?;
        Ok(Self::in_dir(dirs.config_dir()))
    }

    pub fn in_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
        }
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join(DEFAULT_CONFIG_FILE)
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        let path_conf = self.path_conf();
        if !path_conf.exists() {
            return Ok(self.default_config_file());
        }

        let custom = fs::read_to_string(&path_conf)?.trim().to_string();
        if custom.is_empty() {
            warn!("Custom path config file is empty, falling back to default path.");
            Ok(self.default_config_file())
        } else {
            debug!("Using custom configuration path from {:?}", path_conf);
            Ok(PathBuf::from(custom))
        }
    }

    pub fn set_custom_path(&self, path: &Path) -> Result<()> {
        if !path.is_absolute() {
            return Err(CliError::Config(format!(
                "Configuration path must be absolute: {}",
                path.display()
            )));
        }
        let value = path.to_str().ok_or_else(|| {
            CliError::Config(format!("Path is not valid UTF-8: {}", path.display()))
        })?;

        fs::create_dir_all(&self.config_dir)?;
        fs::write(self.path_conf(), value).map_err(CliError::from)
    }

    pub fn reset_path(&self) -> Result<()> {
        let path_conf = self.path_conf();
        if path_conf.exists() {
            fs::remove_file(path_conf)?;
        }
        Ok(())
    }

    fn path_conf(&self) -> PathBuf {
        self.config_dir.join(PATH_CONF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_to_config_toml_in_config_dir() {
        let dir = tempdir().unwrap();
        let location = ConfigLocation::in_dir(dir.path());
        assert_eq!(
            location.config_file().unwrap(),
            dir.path().join("config.toml")
        );
    }

    #[test]
    fn custom_path_round_trips_and_resets() {
        let dir = tempdir().unwrap();
        let location = ConfigLocation::in_dir(&dir.path().join("nested"));
        let custom = dir.path().join("elsewhere.toml");

        location.set_custom_path(&custom).unwrap();
        assert_eq!(location.config_file().unwrap(), custom);

        location.reset_path().unwrap();
        assert_eq!(
            location.config_file().unwrap(),
            dir.path().join("nested").join("config.toml")
        );
        location.reset_path().unwrap();
    }

    #[test]
    fn relative_custom_path_is_rejected() {
        let dir = tempdir().unwrap();
        let location = ConfigLocation::in_dir(dir.path());
        let result = location.set_custom_path(Path::new("relative.toml"));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn empty_path_conf_falls_back_to_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("path.conf"), "  \n").unwrap();
        let location = ConfigLocation::in_dir(dir.path());
        assert_eq!(
            location.config_file().unwrap(),
            dir.path().join("config.toml")
        );
    }
}
