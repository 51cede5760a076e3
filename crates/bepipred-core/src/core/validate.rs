use super::config::PluginConfig;
use super::probe::EnvironmentProbe;
use super::resolve::resolve_home_path;
use std::fmt;
use tracing::debug;

/// Ordered list of blocking problems. Empty means the tool is ready to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    problems: Vec<String>,
}

impl ValidationReport {
    pub fn is_ready(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    fn push(&mut self, problem: String) {
        self.problems.push(problem);
    }
}

impl IntoIterator for ValidationReport {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.problems.into_iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.problems.join("\n"))
    }
}

pub fn remediation(config: &PluginConfig) -> String {
    format!(
        "Installation could not be completed because the {name} download or installation has not been found.\n\
         Set {home} to an existing {name} directory, or {zip} to its source archive and run the installation again; \
         {activation} may hold a custom environment activation command.",
        name = config.descriptor.name,
        home = config.descriptor.home_var,
        zip = config.descriptor.zip_var,
        activation = config.descriptor.activation_var,
    )
}

/// Checks that the tool home exists and that its environment activates.
///
/// Both checks always run so every problem is reported at once; a trailing remediation hint
/// is appended whenever something is wrong. Errors never escape: they become report lines.
pub fn validate(config: &PluginConfig, probe: &dyn EnvironmentProbe) -> ValidationReport {
    let descriptor = &config.descriptor;
    let mut report = ValidationReport::default();

    let home = match resolve_home_path(config) {
        Ok(home) if home.is_dir() => Some(home),
        Ok(home) => {
            report.push(format!(
                "Path of {} does not exist ({}): {}",
                descriptor.name,
                descriptor.home_var,
                home.display()
            ));
            None
        }
        Err(e) => {
            report.push(format!(
                "Path of {} could not be resolved ({}): {}",
                descriptor.name, descriptor.home_var, e
            ));
            None
        }
    };

    let activation = config.variables.activation.clone().or_else(|| {
        home.as_deref()
            .filter(|h| config.sentinel_path(h).exists())
            .map(|_| descriptor.default_activation())
    });

    match activation {
        None => report.push(format!(
            "Environment activation command for {} is not defined ({}) and no finished installation was found",
            descriptor.name, descriptor.activation_var
        )),
        Some(command) => match probe.probe(&command) {
            Ok(true) => debug!("Activation command '{}' succeeded.", command),
            Ok(false) => report.push(format!(
                "Environment activation command for {} failed ({}): {}",
                descriptor.name, descriptor.activation_var, command
            )),
            Err(e) => report.push(format!(
                "Environment activation command for {} is unusable ({}): {}",
                descriptor.name, descriptor.activation_var, e
            )),
        },
    }

    if !report.is_empty() {
        report.push(remediation(config));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ConfigError, PluginConfigBuilder};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    struct FixedProbe(bool);

    impl EnvironmentProbe for FixedProbe {
        fn probe(&self, _activation: &str) -> Result<bool, ConfigError> {
            Ok(self.0)
        }
    }

    struct BrokenProbe;

    impl EnvironmentProbe for BrokenProbe {
        fn probe(&self, activation: &str) -> Result<bool, ConfigError> {
            Err(ConfigError::MalformedCommand {
                command: activation.to_string(),
                reason: "unbalanced quotes",
            })
        }
    }

    #[test]
    fn nothing_resolvable_reports_both_problems_and_remediation() {
        let root = tempdir().unwrap();
        let config = PluginConfigBuilder::new()
            .software_root(root.path().to_path_buf())
            .build()
            .unwrap();

        let report = validate(&config, &FixedProbe(true));
        assert_eq!(report.len(), 3);
        assert!(report.problems()[0].contains("BEPIPRED_HOME"));
        assert!(report.problems()[1].contains("ACT_COMMAND"));
        assert_eq!(report.problems()[2], remediation(&config));
        assert!(!report.is_ready());
    }

    #[test]
    fn missing_root_is_reported_not_raised() {
        let config = PluginConfigBuilder::new()
            .software_root(PathBuf::from("/definitely/missing/software/root"))
            .build()
            .unwrap();

        let report = validate(&config, &FixedProbe(true));
        assert_eq!(report.len(), 3);
        assert!(report.problems()[0].contains("could not be resolved"));
    }

    #[test]
    fn existing_home_and_working_activation_is_ready() {
        let home = tempdir().unwrap();
        let config = PluginConfigBuilder::new()
            .software_root(PathBuf::from("/unused"))
            .home(Some(home.path().to_path_buf()))
            .activation(Some("conda activate BepiPred-3.0".to_string()))
            .build()
            .unwrap();

        let report = validate(&config, &FixedProbe(true));
        assert!(report.is_ready());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn failing_activation_alone_is_reported_with_remediation() {
        let home = tempdir().unwrap();
        let config = PluginConfigBuilder::new()
            .software_root(PathBuf::from("/unused"))
            .home(Some(home.path().to_path_buf()))
            .activation(Some("conda activate nope".to_string()))
            .build()
            .unwrap();

        let report = validate(&config, &FixedProbe(false));
        assert_eq!(report.len(), 2);
        assert!(report.problems()[0].contains("failed"));
    }

    #[test]
    fn probe_errors_become_report_lines() {
        let home = tempdir().unwrap();
        let config = PluginConfigBuilder::new()
            .software_root(PathBuf::from("/unused"))
            .home(Some(home.path().to_path_buf()))
            .activation(Some("echo 'x".to_string()))
            .build()
            .unwrap();

        let report = validate(&config, &BrokenProbe);
        assert_eq!(report.len(), 2);
        assert!(report.problems()[0].contains("unusable"));
    }

    #[test]
    fn sentinel_makes_default_activation_available() {
        let root = tempdir().unwrap();
        let home = root.path().join("BepiPred-3.0");
        fs::create_dir(&home).unwrap();
        let config = PluginConfigBuilder::new()
            .software_root(root.path().to_path_buf())
            .build()
            .unwrap();

        assert_eq!(validate(&config, &FixedProbe(true)).len(), 2);

        fs::write(home.join("BepiPred_installed"), "").unwrap();
        assert!(validate(&config, &FixedProbe(true)).is_ready());
    }
}
