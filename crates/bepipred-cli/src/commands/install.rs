use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use bepipred::core::config::PluginConfig;
use bepipred::core::plan::InstallationPlan;
use bepipred::engine::progress::ProgressReporter;
use bepipred::workflows::plugin::{BepiPredPlugin, Plugin};
use tracing::info;

pub fn run(config: PluginConfig, dry_run: bool) -> Result<()> {
    let plugin = BepiPredPlugin::new(config);

    if dry_run {
        match plugin.define_binaries()? {
            Some(plan) => print_plan(&plan),
            None => report_nothing_to_do(&plugin)?,
        }
        return Ok(());
    }

    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.get_callback());

    match plugin.install(&reporter)? {
        Some(plan) => {
            info!("Installation finished in {:?}", plan.home);
            println!("✓ Installed {} into {}", plan.env_name, plan.home.display());
            println!(
                "  Activate it with: {}  (set {} to override)",
                plan.activation_command,
                plugin.config().descriptor.activation_var
            );
            Ok(())
        }
        None => report_nothing_to_do(&plugin),
    }
}

fn report_nothing_to_do(plugin: &BepiPredPlugin) -> Result<()> {
    let report = plugin.validate_installation();
    if report.is_ready() {
        println!(
            "✓ {} is already installed; nothing to do.",
            plugin.config().descriptor.env_name()
        );
        return Ok(());
    }

    println!("✗ Nothing to install from:");
    let count = report.len();
    for problem in report {
        println!("  {}", problem);
    }
    Err(CliError::NotReady(count))
}

fn print_plan(plan: &InstallationPlan) {
    println!(
        "Installation plan for {} in {}:",
        plan.env_name,
        plan.home.display()
    );
    for (i, step) in plan.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    if !plan.needed_programs.is_empty() {
        println!("Requires on PATH: {}", plan.needed_programs.join(", "));
    }
    println!("Afterwards activate with: {}", plan.activation_command);
}
