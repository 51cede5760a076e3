use crate::cli::RunArgs;
use crate::error::Result;
use crate::utils::jobs::LoggedJobRunner;
use bepipred::core::config::PluginConfig;
use bepipred::engine::launch::LaunchMode;
use bepipred::workflows::plugin::{BepiPredPlugin, Plugin};

pub fn run(config: PluginConfig, args: RunArgs) -> Result<()> {
    let plugin = BepiPredPlugin::new(config);
    let cwd = args.cwd.as_deref();

    if args.direct {
        plugin.run_script(&args.script, &args.args, cwd, LaunchMode::Direct)?;
    } else {
        let mut runner = LoggedJobRunner::new();
        plugin.run_script(
            &args.script,
            &args.args,
            cwd,
            LaunchMode::Managed(&mut runner),
        )?;
    }
    Ok(())
}
