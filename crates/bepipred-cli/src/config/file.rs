use crate::error::{CliError, Result};
use bepipred::core::descriptor::ToolDescriptor;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileVariables {
    pub home: Option<String>,
    pub zip: Option<String>,
    pub activation: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileCondaConfig {
    pub executable: Option<String>,
    pub hook: Option<String>,
    pub python_version: Option<String>,
    pub requirements_file: Option<String>,
    pub pinned_requirement: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileRuntimeConfig {
    pub shell: Option<String>,
    pub interpreter: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub software_root: Option<String>,
    pub variables: Option<FileVariables>,
    pub conda: Option<FileCondaConfig>,
    pub runtime: Option<FileRuntimeConfig>,
    pub tool: Option<ToolDescriptor>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
