use bepipred::core::command::CommandSpec;
use bepipred::engine::error::EngineError;
use bepipred::engine::launch::JobRunner;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Runs jobs to completion, forwarding their output to the log and, optionally, a job log file.
#[derive(Debug, Default)]
pub struct LoggedJobRunner {
    log_file: Option<PathBuf>,
}

impl LoggedJobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends each job's command line and output to `path`.
    pub fn with_log_file(path: impl Into<PathBuf>) -> Self {
        Self {
            log_file: Some(path.into()),
        }
    }

    fn append_to_log(&self, command: &CommandSpec, stdout: &[u8], stderr: &[u8]) {
        let Some(path) = &self.log_file else {
            return;
        };
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| {
                writeln!(file, "$ {}", command)?;
                file.write_all(stdout)?;
                file.write_all(stderr)
            });
        if let Err(e) = result {
            warn!("Could not write job log {:?}: {}", path, e);
        }
    }
}

impl JobRunner for LoggedJobRunner {
    fn run_job(&mut self, command: &CommandSpec) -> Result<(), EngineError> {
        info!("Starting job: {}", command);

        let output = command
            .to_command()
            .output()
            .map_err(|e| EngineError::Job(format!("could not start '{}': {}", command.program, e)))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            info!(target: "bepipred::job", "{}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!(target: "bepipred::job", "{}", line);
        }
        self.append_to_log(command, &output.stdout, &output.stderr);

        if output.status.success() {
            Ok(())
        } else {
            Err(EngineError::Job(format!(
                "'{}' finished with {}",
                command, output.status
            )))
        }
    }
}
