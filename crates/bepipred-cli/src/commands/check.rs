use crate::error::{CliError, Result};
use bepipred::core::config::PluginConfig;
use bepipred::workflows::plugin::{BepiPredPlugin, Plugin};
use tracing::info;

pub fn run(config: PluginConfig) -> Result<()> {
    let plugin = BepiPredPlugin::new(config);
    let name = plugin.config().descriptor.env_name();

    let report = plugin.validate_installation();
    if report.is_ready() {
        info!("Validation passed for {}.", name);
        println!("✓ {} is installed and ready.", name);
        return Ok(());
    }

    println!("✗ {} is not ready:", name);
    let count = report.len();
    for problem in report {
        for (i, line) in problem.lines().enumerate() {
            let bullet = if i == 0 { "-" } else { " " };
            println!("  {} {}", bullet, line);
        }
    }
    Err(CliError::NotReady(count))
}
