use super::error::EngineError;
use crate::core::command::CommandSpec;
use crate::core::config::PluginConfig;
use crate::core::probe::with_shell_hook;
use crate::core::resolve::ResolvedEnvironment;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maps a logical script name onto a file.
pub trait ScriptLocator {
    fn locate(&self, script: &str) -> PathBuf;
}

/// Scripts living directly inside one directory, as in the BepiPred source tree.
#[derive(Debug, Clone)]
pub struct ScriptsDir(pub PathBuf);

impl ScriptLocator for ScriptsDir {
    fn locate(&self, script: &str) -> PathBuf {
        self.0.join(script)
    }
}

/// The host's managed job facility: it owns output capture, logging and queueing.
pub trait JobRunner {
    fn run_job(&mut self, command: &CommandSpec) -> Result<(), EngineError>;
}

pub enum LaunchMode<'a> {
    Managed(&'a mut dyn JobRunner),
    Direct,
}

/// What a launch needs to know about the activated environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEnvironment {
    pub shell: String,
    pub activation: String,
    pub interpreter: String,
}

impl LaunchEnvironment {
    pub fn new(config: &PluginConfig, resolved: &ResolvedEnvironment) -> Result<Self, EngineError> {
        let activation = resolved.activation_command.as_deref().ok_or_else(|| {
            EngineError::NotActivatable {
                tool: config.descriptor.name.clone(),
            }
        })?;
        Ok(Self {
            shell: config.shell.clone(),
            activation: with_shell_hook(activation, &config.conda.hook),
            interpreter: config.interpreter.clone(),
        })
    }
}

/// Builds `<activation> && <interpreter> <script> <args...>` as one typed invocation.
///
/// # Errors
///
/// Returns [`EngineError::ScriptNotFound`] if the located script does not exist.
pub fn compose(
    locator: &dyn ScriptLocator,
    script: &str,
    args: &[String],
    env: &LaunchEnvironment,
    cwd: Option<&Path>,
) -> Result<CommandSpec, EngineError> {
    let script_path = locator.locate(script);
    if !script_path.is_file() {
        return Err(EngineError::ScriptNotFound(script_path));
    }

    let mut program = CommandSpec::new(&env.interpreter)
        .arg(script_path.to_string_lossy())
        .args(args.iter().cloned());
    if let Some(dir) = cwd {
        program = program.current_dir(dir);
    }
    Ok(CommandSpec::activated(&env.shell, &env.activation, program))
}

/// Runs one script invocation, either through the host's job runner or synchronously.
///
/// # Errors
///
/// In [`LaunchMode::Direct`], a nonzero exit becomes [`EngineError::CommandFailed`]; in
/// [`LaunchMode::Managed`], whatever the runner reports is returned unchanged.
pub fn launch(
    locator: &dyn ScriptLocator,
    script: &str,
    args: &[String],
    env: &LaunchEnvironment,
    cwd: Option<&Path>,
    mode: LaunchMode<'_>,
) -> Result<(), EngineError> {
    let command = compose(locator, script, args, env, cwd)?;
    debug!("Composed launch command: {}", command);

    match mode {
        LaunchMode::Managed(runner) => {
            info!("Submitting '{}' to the job runner.", script);
            runner.run_job(&command)
        }
        LaunchMode::Direct => {
            info!("Running '{}' directly.", script);
            let status = command
                .to_command()
                .status()
                .map_err(|e| EngineError::CommandFailed {
                    command: command.to_string(),
                    reason: e.to_string(),
                })?;
            if status.success() {
                Ok(())
            } else {
                Err(EngineError::CommandFailed {
                    command: command.to_string(),
                    reason: status.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingRunner {
        jobs: Vec<CommandSpec>,
    }

    impl JobRunner for RecordingRunner {
        fn run_job(&mut self, command: &CommandSpec) -> Result<(), EngineError> {
            self.jobs.push(command.clone());
            Ok(())
        }
    }

    fn sh_env(activation: &str) -> LaunchEnvironment {
        LaunchEnvironment {
            shell: "sh".to_string(),
            activation: activation.to_string(),
            interpreter: "sh".to_string(),
        }
    }

    #[test]
    fn managed_mode_hands_composed_command_to_runner() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("predict.py"), "").unwrap();
        let mut runner = RecordingRunner::default();

        launch(
            &ScriptsDir(dir.path().to_path_buf()),
            "predict.py",
            &["-i".to_string(), "in.fasta".to_string()],
            &LaunchEnvironment {
                shell: "bash".to_string(),
                activation: "conda activate BepiPred-3.0".to_string(),
                interpreter: "python".to_string(),
            },
            Some(dir.path()),
            LaunchMode::Managed(&mut runner),
        )
        .unwrap();

        assert_eq!(runner.jobs.len(), 1);
        let job = &runner.jobs[0];
        assert_eq!(job.program, "bash");
        assert_eq!(job.args[1], "conda activate BepiPred-3.0 && exec \"$@\"");
        assert_eq!(
            &job.args[3..],
            &[
                "python".to_string(),
                dir.path().join("predict.py").to_string_lossy().to_string(),
                "-i".to_string(),
                "in.fasta".to_string(),
            ]
        );
        assert_eq!(job.cwd.as_deref(), Some(dir.path()));
    }

    #[test]
    fn direct_mode_runs_script_after_activation() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("touch.sh"), "touch \"$1\"\n").unwrap();
        let marker = dir.path().join("ran");

        launch(
            &ScriptsDir(dir.path().to_path_buf()),
            "touch.sh",
            &[marker.to_string_lossy().to_string()],
            &sh_env("true"),
            None,
            LaunchMode::Direct,
        )
        .unwrap();

        assert!(marker.exists());
    }

    #[test]
    fn direct_mode_fails_when_activation_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("noop.sh"), "exit 0\n").unwrap();

        let result = launch(
            &ScriptsDir(dir.path().to_path_buf()),
            "noop.sh",
            &[],
            &sh_env("false"),
            None,
            LaunchMode::Direct,
        );
        assert!(matches!(result, Err(EngineError::CommandFailed { .. })));
    }

    #[test]
    fn direct_mode_fails_on_nonzero_script_exit() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fail.sh"), "exit 4\n").unwrap();

        let result = launch(
            &ScriptsDir(dir.path().to_path_buf()),
            "fail.sh",
            &[],
            &sh_env("true"),
            None,
            LaunchMode::Direct,
        );
        assert!(matches!(result, Err(EngineError::CommandFailed { .. })));
    }

    #[test]
    fn missing_script_is_reported_before_launch() {
        let dir = tempdir().unwrap();
        let mut runner = RecordingRunner::default();
        let result = launch(
            &ScriptsDir(dir.path().to_path_buf()),
            "bepipred3_CLI.py",
            &[],
            &sh_env("true"),
            None,
            LaunchMode::Managed(&mut runner),
        );
        assert!(matches!(result, Err(EngineError::ScriptNotFound(_))));
        assert!(runner.jobs.is_empty());
    }

    #[test]
    fn environment_requires_an_activation_command() {
        let config = crate::core::config::PluginConfigBuilder::new()
            .software_root(PathBuf::from("/opt/em"))
            .build()
            .unwrap();
        let resolved = ResolvedEnvironment {
            home_path: PathBuf::from("/opt/em/BepiPred-3.0"),
            zip_path: None,
            activation_command: None,
        };
        assert!(matches!(
            LaunchEnvironment::new(&config, &resolved),
            Err(EngineError::NotActivatable { .. })
        ));

        let resolved = ResolvedEnvironment {
            activation_command: Some("conda activate BepiPred-3.0".to_string()),
            ..resolved
        };
        let env = LaunchEnvironment::new(&config, &resolved).unwrap();
        assert!(env.activation.starts_with("eval \"$(conda shell.bash hook)\" && "));
        assert_eq!(env.interpreter, "python");
    }
}
