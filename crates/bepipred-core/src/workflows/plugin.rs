use crate::core::config::PluginConfig;
use crate::core::plan::{self, InstallationPlan};
use crate::core::probe::{EnvironmentProbe, ShellProbe};
use crate::core::resolve::{ResolvedEnvironment, resolve_home_path};
use crate::core::validate::{self, ValidationReport};
use crate::engine::error::EngineError;
use crate::engine::install;
use crate::engine::launch::{self, LaunchEnvironment, LaunchMode, ScriptsDir};
use crate::engine::progress::ProgressReporter;
use std::path::Path;
use tracing::{info, instrument};

/// A host configuration variable and the value it currently resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: Option<String>,
}

/// Capabilities a workflow host expects from a tool plugin.
pub trait Plugin {
    /// Host variables the plugin reads, with their effective values.
    fn define_variables(&self) -> Vec<Variable>;

    /// Decides what, if anything, has to be installed.
    fn define_binaries(&self) -> Result<Option<InstallationPlan>, EngineError>;

    /// Lists every problem that keeps the tool from running; empty means ready.
    fn validate_installation(&self) -> ValidationReport;

    /// Runs one of the tool's scripts inside its activated environment.
    fn run_script(
        &self,
        script: &str,
        args: &[String],
        cwd: Option<&Path>,
        mode: LaunchMode<'_>,
    ) -> Result<(), EngineError>;
}

#[derive(Debug, Clone)]
pub struct BepiPredPlugin<P = ShellProbe> {
    config: PluginConfig,
    probe: P,
}

impl BepiPredPlugin<ShellProbe> {
    pub fn new(config: PluginConfig) -> Self {
        let probe = ShellProbe::new(config.shell.clone(), config.conda.hook.clone());
        Self { config, probe }
    }
}

impl<P: EnvironmentProbe> BepiPredPlugin<P> {
    pub fn with_probe(config: PluginConfig, probe: P) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn resolve(&self) -> Result<ResolvedEnvironment, EngineError> {
        Ok(ResolvedEnvironment::resolve(&self.config)?)
    }

    /// Plans and, when something has to be installed, executes the installation.
    ///
    /// Returns the executed plan, or `None` if the environment was already usable or there
    /// was nothing to install from.
    #[instrument(skip_all, name = "install_workflow")]
    pub fn install(
        &self,
        reporter: &ProgressReporter,
    ) -> Result<Option<InstallationPlan>, EngineError> {
        let Some(plan) = self.define_binaries()? else {
            return Ok(None);
        };
        install::execute(&plan, reporter)?;
        Ok(Some(plan))
    }
}

impl<P: EnvironmentProbe> Plugin for BepiPredPlugin<P> {
    fn define_variables(&self) -> Vec<Variable> {
        let descriptor = &self.config.descriptor;
        let resolved = ResolvedEnvironment::resolve(&self.config).ok();

        let home = resolve_home_path(&self.config)
            .ok()
            .map(|p| p.display().to_string());
        let zip = self
            .config
            .variables
            .zip
            .as_ref()
            .map(|p| p.display().to_string());
        let activation = resolved
            .and_then(|r| r.activation_command)
            .or_else(|| self.config.variables.activation.clone());

        descriptor
            .variable_names()
            .into_iter()
            .zip([home, zip, activation])
            .map(|(name, value)| Variable {
                name: name.to_string(),
                value,
            })
            .collect()
    }

    fn define_binaries(&self) -> Result<Option<InstallationPlan>, EngineError> {
        let resolved = ResolvedEnvironment::resolve(&self.config)?;
        Ok(plan::plan(&self.config, &resolved, &self.probe)?)
    }

    fn validate_installation(&self) -> ValidationReport {
        validate::validate(&self.config, &self.probe)
    }

    fn run_script(
        &self,
        script: &str,
        args: &[String],
        cwd: Option<&Path>,
        mode: LaunchMode<'_>,
    ) -> Result<(), EngineError> {
        let resolved = ResolvedEnvironment::resolve(&self.config)?;
        let env = LaunchEnvironment::new(&self.config, &resolved)?;
        info!(
            "Launching {} script '{}' from {:?}",
            self.config.descriptor.name, script, resolved.home_path
        );
        launch::launch(
            &ScriptsDir(resolved.home_path.clone()),
            script,
            args,
            &env,
            cwd,
            mode,
        )
    }
}
