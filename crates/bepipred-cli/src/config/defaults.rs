use crate::error::{CliError, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "scipion-chem", "bepipred").ok_or_else(|| {
        CliError::Config("Could not determine the user's home directory.".to_string())
    })
}

pub struct DefaultsConfig {
    /// Used when neither `--software-root`, `EM_ROOT` nor the file set one.
    pub software_root: PathBuf,
}

impl DefaultsConfig {
    pub fn new() -> Result<Self> {
        let dirs = project_dirs()?;
        Ok(Self {
            software_root: dirs.data_dir().join("software"),
        })
    }
}
