use super::descriptor::ToolDescriptor;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SHELL: &str = "bash";
pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_CONDA_EXECUTABLE: &str = "conda";
pub const DEFAULT_CONDA_HOOK: &str = r#"eval "$(conda shell.bash hook)""#;
pub const DEFAULT_PYTHON_VERSION: &str = "3.9";
pub const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";
pub const DEFAULT_PINNED_REQUIREMENT: &str = "torch==";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Software root directory does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to list directory '{}': {source}", .path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source archive does not exist: {}", .0.display())]
    MissingArchive(PathBuf),

    #[error("Failed to read archive '{}': {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Malformed activation command '{command}': {reason}")]
    MalformedCommand {
        command: String,
        reason: &'static str,
    },

    #[error("Shell '{shell}' could not be started: {source}")]
    ShellUnavailable {
        shell: String,
        #[source]
        source: std::io::Error,
    },
}

/// The three host variables of a [`ToolDescriptor`], each independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    pub home: Option<PathBuf>,
    pub zip: Option<PathBuf>,
    pub activation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondaSettings {
    pub executable: String,
    /// Shell-integration prefix that must run before `conda activate` in a non-interactive shell.
    pub hook: String,
    pub python_version: String,
    pub requirements_file: String,
    /// Requirement line prefix disabled in the tool's manifest before the environment is created.
    pub pinned_requirement: String,
}

impl Default for CondaSettings {
    fn default() -> Self {
        Self {
            executable: DEFAULT_CONDA_EXECUTABLE.to_string(),
            hook: DEFAULT_CONDA_HOOK.to_string(),
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
            requirements_file: DEFAULT_REQUIREMENTS_FILE.to_string(),
            pinned_requirement: DEFAULT_PINNED_REQUIREMENT.to_string(),
        }
    }
}

/// Everything the subsystem reads from its host, passed explicitly by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub descriptor: ToolDescriptor,
    /// Directory under which the host keeps installed software (the host's `EM_ROOT`).
    pub software_root: PathBuf,
    pub variables: Variables,
    pub conda: CondaSettings,
    pub shell: String,
    pub interpreter: String,
}

impl PluginConfig {
    /// Directory an archive is unpacked into when no home exists yet.
    pub fn extraction_target(&self) -> PathBuf {
        self.software_root.join(self.descriptor.env_name())
    }

    pub fn sentinel_path(&self, home: &Path) -> PathBuf {
        home.join(self.descriptor.sentinel_name())
    }
}

#[derive(Default)]
pub struct PluginConfigBuilder {
    descriptor: Option<ToolDescriptor>,
    software_root: Option<PathBuf>,
    home: Option<PathBuf>,
    zip: Option<PathBuf>,
    activation: Option<String>,
    conda: Option<CondaSettings>,
    shell: Option<String>,
    interpreter: Option<String>,
}

impl PluginConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(mut self, descriptor: ToolDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }
    pub fn software_root(mut self, path: PathBuf) -> Self {
        self.software_root = Some(path);
        self
    }
    pub fn home(mut self, path: Option<PathBuf>) -> Self {
        self.home = path;
        self
    }
    pub fn zip(mut self, path: Option<PathBuf>) -> Self {
        self.zip = path;
        self
    }
    pub fn activation(mut self, command: Option<String>) -> Self {
        self.activation = command.filter(|c| !c.trim().is_empty());
        self
    }
    pub fn conda(mut self, conda: CondaSettings) -> Self {
        self.conda = Some(conda);
        self
    }
    pub fn shell(mut self, shell: String) -> Self {
        self.shell = Some(shell);
        self
    }
    pub fn interpreter(mut self, interpreter: String) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn build(self) -> Result<PluginConfig, ConfigError> {
        Ok(PluginConfig {
            descriptor: self.descriptor.unwrap_or_default(),
            software_root: self
                .software_root
                .ok_or(ConfigError::MissingParameter("software_root"))?,
            variables: Variables {
                home: self.home,
                zip: self.zip,
                activation: self.activation,
            },
            conda: self.conda.unwrap_or_default(),
            shell: self.shell.unwrap_or_else(|| DEFAULT_SHELL.to_string()),
            interpreter: self
                .interpreter
                .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string()),
        })
    }
}
