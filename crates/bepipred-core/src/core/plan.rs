use super::command::CommandSpec;
use super::config::{ConfigError, PluginConfig};
use super::probe::EnvironmentProbe;
use super::resolve::ResolvedEnvironment;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// One atomic installation step. Steps run in order and the first failure aborts the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStep {
    /// Unpack a zip archive into `destination`.
    Extract {
        archive: PathBuf,
        destination: PathBuf,
    },
    /// Lift the contents of the single directory inside `directory` up one level.
    Flatten { directory: PathBuf },
    /// Comment out every line of `manifest` starting with `requirement`.
    DisablePin {
        manifest: PathBuf,
        requirement: String,
    },
    Run(CommandSpec),
    /// Create the empty sentinel file marking a finished installation.
    MarkInstalled { sentinel: PathBuf },
}

impl InstallStep {
    pub fn label(&self) -> &'static str {
        match self {
            InstallStep::Extract { .. } => "Extracting archive",
            InstallStep::Flatten { .. } => "Normalizing layout",
            InstallStep::DisablePin { .. } => "Patching requirements",
            InstallStep::Run(_) => "Running command",
            InstallStep::MarkInstalled { .. } => "Marking installed",
        }
    }
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStep::Extract {
                archive,
                destination,
            } => write!(
                f,
                "extract {} into {}",
                archive.display(),
                destination.display()
            ),
            InstallStep::Flatten { directory } => {
                write!(f, "flatten single top-level directory in {}", directory.display())
            }
            InstallStep::DisablePin {
                manifest,
                requirement,
            } => write!(
                f,
                "comment out '{}' lines in {}",
                requirement,
                manifest.display()
            ),
            InstallStep::Run(spec) => write!(f, "run {}", spec),
            InstallStep::MarkInstalled { sentinel } => write!(f, "touch {}", sentinel.display()),
        }
    }
}

/// The ordered steps that materialize a working environment, consumed once by an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationPlan {
    pub home: PathBuf,
    pub env_name: String,
    pub steps: Vec<InstallStep>,
    pub sentinel: PathBuf,
    /// Activation command the environment answers to once the plan has run.
    pub activation_command: String,
    pub needed_programs: Vec<String>,
}

impl InstallationPlan {
    /// Advisory lock created next to the home while the plan executes.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .home
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| self.env_name.clone().into());
        name.push(".install.lock");
        self.home.with_file_name(name)
    }
}

/// Decides whether an installation is needed and, if so, which steps it takes.
///
/// The home is preferred over the archive: the archive is only considered when the home
/// directory does not exist. Returns `Ok(None)` when nothing has to (or can) be installed.
///
/// # Errors
///
/// Propagates configuration errors from the probe and from reading the archive.
pub fn plan(
    config: &PluginConfig,
    resolved: &ResolvedEnvironment,
    probe: &dyn EnvironmentProbe,
) -> Result<Option<InstallationPlan>, ConfigError> {
    if resolved.home_exists() {
        if let Some(activation) = &resolved.activation_command {
            if probe.probe(activation)? {
                info!(
                    "Home {:?} exists and its environment activates, installation not needed.",
                    resolved.home_path
                );
                return Ok(None);
            }
            debug!("Activation command '{}' failed, reinstalling.", activation);
        }
        info!("Planning installation from directory {:?}", resolved.home_path);
        return Ok(Some(install_from_directory(config, &resolved.home_path)));
    }

    match &resolved.zip_path {
        Some(zip) if resolved.zip_exists() => {
            info!(
                "Home {:?} missing, planning installation from archive {:?}",
                resolved.home_path, zip
            );
            extract_and_install(config, zip).map(Some)
        }
        _ => {
            warn!(
                "Neither the home {:?} nor a source archive exists, nothing to install.",
                resolved.home_path
            );
            Ok(None)
        }
    }
}

pub fn install_from_directory(config: &PluginConfig, home: &Path) -> InstallationPlan {
    let env_name = config.descriptor.env_name();
    let conda = &config.conda;
    let sentinel = config.sentinel_path(home);

    let create_env = CommandSpec::new(&conda.executable)
        .args(["create", "-y", "-n", env_name.as_str()])
        .arg(format!("python={}", conda.python_version))
        .args(["--file", conda.requirements_file.as_str()])
        .current_dir(home);

    InstallationPlan {
        home: home.to_path_buf(),
        steps: vec![
            InstallStep::DisablePin {
                manifest: home.join(&conda.requirements_file),
                requirement: conda.pinned_requirement.clone(),
            },
            InstallStep::Run(create_env),
            InstallStep::MarkInstalled {
                sentinel: sentinel.clone(),
            },
        ],
        sentinel,
        activation_command: config.descriptor.default_activation(),
        needed_programs: vec![conda.executable.clone()],
        env_name,
    }
}

/// Builds the archive variant: extract, optionally flatten, then install from the result.
///
/// # Errors
///
/// Returns [`ConfigError::MissingArchive`] if `archive` is not a file, and
/// [`ConfigError::Archive`] if it cannot be read as a zip archive.
pub fn extract_and_install(
    config: &PluginConfig,
    archive: &Path,
) -> Result<InstallationPlan, ConfigError> {
    if !archive.is_file() {
        return Err(ConfigError::MissingArchive(archive.to_path_buf()));
    }

    let target = config.extraction_target();
    let mut steps = vec![InstallStep::Extract {
        archive: archive.to_path_buf(),
        destination: target.clone(),
    }];
    if has_single_root_directory(archive)? {
        debug!("Archive {:?} wraps its payload in one directory.", archive);
        steps.push(InstallStep::Flatten {
            directory: target.clone(),
        });
    }

    let mut plan = install_from_directory(config, &target);
    steps.append(&mut plan.steps);
    plan.steps = steps;
    Ok(plan)
}

/// True when every entry of the archive lives under one and the same top-level directory.
pub fn has_single_root_directory(archive: &Path) -> Result<bool, ConfigError> {
    let read_error = |source: zip::result::ZipError| ConfigError::Archive {
        path: archive.to_path_buf(),
        source,
    };
    let file = File::open(archive).map_err(|e| read_error(e.into()))?;
    let zip = ZipArchive::new(file).map_err(read_error)?;

    let mut roots = BTreeSet::new();
    let mut nested = false;
    for name in zip.file_names() {
        let path = Path::new(name);
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            continue;
        }
        let mut components = path.components().filter(|c| matches!(c, Component::Normal(_)));
        let Some(first) = components.next() else {
            continue;
        };
        roots.insert(first.as_os_str().to_os_string());
        if components.next().is_some() || name.ends_with('/') {
            nested = true;
        }
    }

    // A lone top-level file is not a wrapping directory.
    Ok(roots.len() == 1 && nested)
}
