use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A program invocation as an argument vector, never as a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Runs `program args...` after `activation` in a shell.
    ///
    /// The activation fragment is the only text the shell interprets; the program and its
    /// arguments reach the shell as positional parameters and are exec'd verbatim.
    pub fn activated(shell: &str, activation: &str, program: Self) -> Self {
        let script = format!("{} && exec \"$@\"", activation);
        let mut spec = Self::new(shell)
            .arg("-c")
            .arg(script)
            .arg(program.program.clone())
            .arg(program.program)
            .args(program.args);
        spec.cwd = program.cwd;
        spec
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        if let Some(dir) = &self.cwd {
            write!(f, "  (in {})", dir.display())?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+@%,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_arguments_in_order() {
        let spec = CommandSpec::new("conda")
            .arg("create")
            .args(["-y", "-n", "BepiPred-3.0"])
            .current_dir("/opt/tool");

        assert_eq!(spec.program, "conda");
        assert_eq!(spec.args, vec!["create", "-y", "-n", "BepiPred-3.0"]);
        assert_eq!(spec.cwd, Some(PathBuf::from("/opt/tool")));
    }

    #[test]
    fn activated_passes_program_as_positional_parameters() {
        let inner = CommandSpec::new("python")
            .args(["/opt/tool/run.py", "a; rm -rf /"])
            .current_dir("/work");
        let spec = CommandSpec::activated("bash", "conda activate env", inner);

        assert_eq!(spec.program, "bash");
        assert_eq!(
            spec.args,
            vec![
                "-c",
                "conda activate env && exec \"$@\"",
                "python",
                "python",
                "/opt/tool/run.py",
                "a; rm -rf /",
            ]
        );
        assert_eq!(spec.cwd, Some(PathBuf::from("/work")));
    }

    #[test]
    fn display_quotes_words_with_shell_metacharacters() {
        let spec = CommandSpec::new("python").args(["script.py", "two words", "it's"]);
        assert_eq!(spec.to_string(), r"python script.py 'two words' 'it'\''s'");
    }

    #[test]
    fn activated_command_runs_arguments_verbatim() {
        let temp_dir = tempfile::tempdir().unwrap();
        let marker = temp_dir.path().join("created; echo injected");
        let inner = CommandSpec::new("touch").arg(marker.to_string_lossy());
        let status = CommandSpec::activated("sh", "true", inner)
            .to_command()
            .status()
            .unwrap();

        assert!(status.success());
        assert!(marker.exists());
    }
}
