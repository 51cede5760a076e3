use super::config::ConfigError;
use std::process::{Command, Stdio};
use tracing::{debug, trace};

const CONDA_ACTIVATE: &str = "conda activate";

/// Answers whether an activation command currently succeeds.
///
/// A nonzero exit is the ordinary "not ready" answer and maps to `Ok(false)`; only a command
/// that cannot be run at all is an error.
pub trait EnvironmentProbe {
    fn probe(&self, activation: &str) -> Result<bool, ConfigError>;
}

/// Runs the activation command through `shell -c`, discarding its output.
#[derive(Debug, Clone)]
pub struct ShellProbe {
    shell: String,
    hook: String,
}

impl ShellProbe {
    pub fn new(shell: impl Into<String>, hook: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            hook: hook.into(),
        }
    }
}

impl EnvironmentProbe for ShellProbe {
    fn probe(&self, activation: &str) -> Result<bool, ConfigError> {
        check_well_formed(activation)?;
        let command = with_shell_hook(activation, &self.hook);
        trace!("Probing activation with {}: {}", self.shell, command);

        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ConfigError::ShellUnavailable {
                shell: self.shell.clone(),
                source,
            })?;

        debug!("Activation probe exited with {}", status);
        Ok(status.success())
    }
}

/// Prepends the package manager's shell integration when `conda activate` is used without it.
pub fn with_shell_hook(activation: &str, hook: &str) -> String {
    let activation = activation.trim();
    let hook = hook.trim();
    if hook.is_empty() || !activation.contains(CONDA_ACTIVATE) || activation.contains(hook) {
        activation.to_string()
    } else {
        format!("{} && {}", hook, activation)
    }
}

pub fn check_well_formed(activation: &str) -> Result<(), ConfigError> {
    let malformed = |reason| ConfigError::MalformedCommand {
        command: activation.to_string(),
        reason,
    };

    if activation.trim().is_empty() {
        return Err(malformed("command is empty"));
    }
    if activation.contains('\0') {
        return Err(malformed("command contains a NUL byte"));
    }

    let mut single = false;
    let mut double = false;
    let mut escaped = false;
    for c in activation.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !single => escaped = true,
            '\'' if !double => single = !single,
            '"' if !single => double = !double,
            _ => {}
        }
    }
    if single || double {
        return Err(malformed("unbalanced quotes"));
    }
    Ok(())
}
