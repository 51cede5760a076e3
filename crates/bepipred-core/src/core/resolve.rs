use super::config::{ConfigError, PluginConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Finds the tool's home among the immediate entries of `root`.
///
/// Directories are visited in file-name order and the first one whose name contains
/// `pattern` (case-insensitively) wins. Files such as source archives or lock files are never
/// picked, even when their name matches. When nothing matches, `root/<fallback>` is returned without
/// checking that it exists; callers decide what a missing home means.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRoot`] if `root` does not exist, so that an absent software
/// directory is never mistaken for "present but not installed".
pub fn resolve_home(root: &Path, pattern: &str, fallback: &str) -> Result<PathBuf, ConfigError> {
    if !root.is_dir() {
        return Err(ConfigError::MissingRoot(root.to_path_buf()));
    }

    let listing = |source| ConfigError::Listing {
        path: root.to_path_buf(),
        source,
    };
    let mut names = fs::read_dir(root)
        .map_err(listing)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(listing)?;
    names.sort();

    let needle = pattern.to_lowercase();
    let found = names.into_iter().find(|name| {
        name.to_string_lossy().to_lowercase().contains(&needle) && root.join(name).is_dir()
    });

    match found {
        Some(name) => {
            let home = root.join(name);
            debug!("Found candidate home {:?} under {:?}", home, root);
            Ok(home)
        }
        None => {
            warn!(
                "No entry matching '{}' found under {:?}, falling back to '{}'.",
                pattern, root, fallback
            );
            Ok(root.join(fallback))
        }
    }
}

/// A snapshot of where the tool lives, recomputed every time configuration is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    pub home_path: PathBuf,
    pub zip_path: Option<PathBuf>,
    pub activation_command: Option<String>,
}

impl ResolvedEnvironment {
    /// Resolves the home (configured value first, discovery second) and the activation command.
    ///
    /// When no activation command is configured but the home carries the installation
    /// sentinel, the descriptor's default activation is assumed.
    pub fn resolve(config: &PluginConfig) -> Result<Self, ConfigError> {
        let home_path = resolve_home_path(config)?;

        let activation_command = config.variables.activation.clone().or_else(|| {
            config
                .sentinel_path(&home_path)
                .exists()
                .then(|| config.descriptor.default_activation())
        });

        Ok(Self {
            home_path,
            zip_path: config.variables.zip.clone(),
            activation_command,
        })
    }

    pub fn home_exists(&self) -> bool {
        self.home_path.is_dir()
    }

    pub fn zip_exists(&self) -> bool {
        self.zip_path.as_deref().is_some_and(Path::is_file)
    }
}

pub fn resolve_home_path(config: &PluginConfig) -> Result<PathBuf, ConfigError> {
    match &config.variables.home {
        Some(home) => Ok(home.clone()),
        None => resolve_home(
            &config.software_root,
            &config.descriptor.name,
            &config.descriptor.env_name(),
        ),
    }
}
