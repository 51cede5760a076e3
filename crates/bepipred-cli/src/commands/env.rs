use crate::config::builder::SOFTWARE_ROOT_VAR;
use crate::error::Result;
use bepipred::core::config::PluginConfig;
use bepipred::workflows::plugin::{BepiPredPlugin, Plugin};

const UNSET: &str = "<unset>";

pub fn run(config: PluginConfig) -> Result<()> {
    let plugin = BepiPredPlugin::new(config);
    let config = plugin.config();
    let descriptor = &config.descriptor;

    println!("{} {}", descriptor.name, descriptor.version);
    println!(
        "  {:<16} {}",
        SOFTWARE_ROOT_VAR,
        config.software_root.display()
    );
    for variable in plugin.define_variables() {
        println!(
            "  {:<16} {}",
            variable.name,
            variable.value.as_deref().unwrap_or(UNSET)
        );
    }

    let resolved = plugin.resolve()?;
    let sentinel = config.sentinel_path(&resolved.home_path);
    println!();
    println!("  {:<16} {}", "environment", descriptor.env_name());
    println!("  {:<16} {}", "home exists", yes_no(resolved.home_exists()));
    println!("  {:<16} {}", "archive exists", yes_no(resolved.zip_exists()));
    println!("  {:<16} {}", "installed", yes_no(sentinel.exists()));
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
