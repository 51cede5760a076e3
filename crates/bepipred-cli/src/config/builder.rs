use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::Overrides;
use crate::error::Result;
use bepipred::core::config::{CondaSettings, PluginConfig, PluginConfigBuilder};
use directories::BaseDirs;
use std::path::PathBuf;

/// Host variable naming the directory installed software lives under.
pub const SOFTWARE_ROOT_VAR: &str = "EM_ROOT";

/// Builds the core configuration, taking each value from the first layer that sets it:
/// command line, then environment, then file, then defaults.
///
/// `env` looks up environment variables; blank values count as unset.
pub fn build_config(
    overrides: &Overrides,
    file_config: FileConfig,
    defaults: &DefaultsConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PluginConfig> {
    let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    let descriptor = file_config.tool.unwrap_or_default();
    let file_vars = file_config.variables.unwrap_or_default();

    let home = overrides
        .home
        .clone()
        .or_else(|| lookup(&descriptor.home_var).map(|v| expand_home(&v)))
        .or_else(|| file_vars.home.as_deref().map(expand_home));
    let zip = overrides
        .zip
        .clone()
        .or_else(|| lookup(&descriptor.zip_var).map(|v| expand_home(&v)))
        .or_else(|| file_vars.zip.as_deref().map(expand_home));
    let activation = overrides
        .activation
        .clone()
        .or_else(|| lookup(&descriptor.activation_var))
        .or(file_vars.activation);

    let software_root = overrides
        .software_root
        .clone()
        .or_else(|| lookup(SOFTWARE_ROOT_VAR).map(|v| expand_home(&v)))
        .or_else(|| file_config.software_root.as_deref().map(expand_home))
        .unwrap_or_else(|| defaults.software_root.clone());

    let conda_file = file_config.conda.unwrap_or_default();
    let base = CondaSettings::default();
    let conda = CondaSettings {
        executable: conda_file.executable.unwrap_or(base.executable),
        hook: conda_file.hook.unwrap_or(base.hook),
        python_version: conda_file.python_version.unwrap_or(base.python_version),
        requirements_file: conda_file
            .requirements_file
            .unwrap_or(base.requirements_file),
        pinned_requirement: conda_file
            .pinned_requirement
            .unwrap_or(base.pinned_requirement),
    };

    let mut builder = PluginConfigBuilder::new()
        .descriptor(descriptor)
        .software_root(software_root)
        .home(home)
        .zip(zip)
        .activation(activation)
        .conda(conda);

    let runtime = file_config.runtime.unwrap_or_default();
    if let Some(shell) = runtime.shell {
        builder = builder.shell(shell);
    }
    if let Some(interpreter) = runtime.interpreter {
        builder = builder.interpreter(interpreter);
    }

    Ok(builder.build()?)
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return PathBuf::from(raw),
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::{FileRuntimeConfig, FileVariables};
    use bepipred::core::config::DEFAULT_SHELL;
    use std::collections::HashMap;
    use std::path::Path;

    fn defaults() -> DefaultsConfig {
        DefaultsConfig {
            software_root: PathBuf::from("/defaults/software"),
        }
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn file_with_variables(home: &str, activation: &str) -> FileConfig {
        FileConfig {
            software_root: Some("/file/software".to_string()),
            variables: Some(FileVariables {
                home: Some(home.to_string()),
                zip: None,
                activation: Some(activation.to_string()),
            }),
            ..FileConfig::default()
        }
    }

    #[test]
    fn empty_layers_fall_back_to_defaults() {
        let config = build_config(
            &Overrides::default(),
            FileConfig::default(),
            &defaults(),
            env_from(&[]),
        )
        .unwrap();

        assert_eq!(config.software_root, Path::new("/defaults/software"));
        assert_eq!(config.variables.home, None);
        assert_eq!(config.variables.activation, None);
        assert_eq!(config.shell, DEFAULT_SHELL);
        assert_eq!(config.conda, CondaSettings::default());
    }

    #[test]
    fn file_values_are_used_when_nothing_else_is_set() {
        let config = build_config(
            &Overrides::default(),
            file_with_variables("/file/home", "source activate bp"),
            &defaults(),
            env_from(&[]),
        )
        .unwrap();

        assert_eq!(config.software_root, Path::new("/file/software"));
        assert_eq!(config.variables.home, Some(PathBuf::from("/file/home")));
        assert_eq!(
            config.variables.activation.as_deref(),
            Some("source activate bp")
        );
    }

    #[test]
    fn environment_beats_file_and_cli_beats_environment() {
        let env = env_from(&[
            ("BEPIPRED_HOME", "/env/home"),
            ("ACT_COMMAND", "conda activate env-bp"),
            ("EM_ROOT", "/env/software"),
        ]);
        let overrides = Overrides {
            home: Some(PathBuf::from("/cli/home")),
            ..Overrides::default()
        };

        let config = build_config(
            &overrides,
            file_with_variables("/file/home", "source activate bp"),
            &defaults(),
            env,
        )
        .unwrap();

        assert_eq!(config.variables.home, Some(PathBuf::from("/cli/home")));
        assert_eq!(
            config.variables.activation.as_deref(),
            Some("conda activate env-bp")
        );
        assert_eq!(config.software_root, Path::new("/env/software"));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let config = build_config(
            &Overrides::default(),
            file_with_variables("/file/home", "source activate bp"),
            &defaults(),
            env_from(&[("BEPIPRED_HOME", ""), ("ACT_COMMAND", "   ")]),
        )
        .unwrap();

        assert_eq!(config.variables.home, Some(PathBuf::from("/file/home")));
        assert_eq!(
            config.variables.activation.as_deref(),
            Some("source activate bp")
        );
    }

    #[test]
    fn runtime_section_overrides_shell() {
        let file_config = FileConfig {
            runtime: Some(FileRuntimeConfig {
                shell: Some("zsh".to_string()),
                interpreter: None,
            }),
            ..FileConfig::default()
        };

        let config =
            build_config(&Overrides::default(), file_config, &defaults(), env_from(&[])).unwrap();
        assert_eq!(config.shell, "zsh");
    }

    #[test]
    fn tilde_is_expanded_only_at_the_start() {
        assert_eq!(expand_home("/abs/~/x"), PathBuf::from("/abs/~/x"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(expand_home("~/soft"), dirs.home_dir().join("soft"));
            assert_eq!(expand_home("~"), dirs.home_dir().to_path_buf());
        }
    }
}
