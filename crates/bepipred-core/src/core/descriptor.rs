use serde::Deserialize;

pub const DEFAULT_NAME: &str = "BepiPred";
pub const DEFAULT_VERSION: &str = "3.0";

/// Identifies one external-tool installation target.
///
/// A descriptor is built once at start-up and never mutated. The three variable names are
/// the keys under which the host's configuration store holds the tool home, the source
/// archive and the activation command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ToolDescriptor {
    pub name: String,
    pub version: String,
    pub home_var: String,
    pub zip_var: String,
    pub activation_var: String,
}

impl ToolDescriptor {
    pub fn bepipred() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            version: DEFAULT_VERSION.to_string(),
            home_var: "BEPIPRED_HOME".to_string(),
            zip_var: "ZIP_PATH".to_string(),
            activation_var: "ACT_COMMAND".to_string(),
        }
    }

    /// Name of the isolated conda environment, e.g. `BepiPred-3.0`.
    pub fn env_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Marker file written into the home directory once installation succeeded.
    pub fn sentinel_name(&self) -> String {
        format!("{}_installed", self.name)
    }

    pub fn default_activation(&self) -> String {
        format!("conda activate {}", self.env_name())
    }

    pub fn variable_names(&self) -> [&str; 3] {
        [&self.home_var, &self.zip_var, &self.activation_var]
    }
}

impl Default for ToolDescriptor {
    fn default() -> Self {
        Self::bepipred()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names_follow_name_and_version() {
        let descriptor = ToolDescriptor::bepipred();
        assert_eq!(descriptor.env_name(), "BepiPred-3.0");
        assert_eq!(descriptor.sentinel_name(), "BepiPred_installed");
        assert_eq!(
            descriptor.default_activation(),
            "conda activate BepiPred-3.0"
        );
    }

    #[test]
    fn variable_names_are_reported_in_home_zip_activation_order() {
        let descriptor = ToolDescriptor::bepipred();
        assert_eq!(
            descriptor.variable_names(),
            ["BEPIPRED_HOME", "ZIP_PATH", "ACT_COMMAND"]
        );
    }

    #[test]
    fn custom_descriptor_deserializes_from_kebab_case_keys() {
        let descriptor: ToolDescriptor = serde::Deserialize::deserialize(
            serde::de::value::MapDeserializer::<_, serde::de::value::Error>::new(
                [
                    ("name", "Tool"),
                    ("version", "1.2"),
                    ("home-var", "TOOL_HOME"),
                    ("zip-var", "TOOL_ZIP"),
                    ("activation-var", "TOOL_ACT"),
                ]
                .into_iter(),
            ),
        )
        .unwrap();
        assert_eq!(descriptor.env_name(), "Tool-1.2");
        assert_eq!(descriptor.home_var, "TOOL_HOME");
    }
}
