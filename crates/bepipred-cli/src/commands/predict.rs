use crate::cli::{Method, PredictArgs};
use crate::error::Result;
use crate::utils::jobs::LoggedJobRunner;
use bepipred::core::config::PluginConfig;
use bepipred::engine::launch::LaunchMode;
use bepipred::workflows::plugin::BepiPredPlugin;
use bepipred::workflows::predict::{self, PredictionMethod, PredictionOutcome, PredictionRequest};
use std::path;

const JOB_LOG: &str = "bepipred.log";

impl From<Method> for PredictionMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Vt => PredictionMethod::VoteThreshold,
            Method::Mjv => PredictionMethod::MajorityVote,
        }
    }
}

pub fn run(config: PluginConfig, args: PredictArgs) -> Result<()> {
    let outcome = predict_with(config, &args)?;

    println!(
        "✓ Prediction written to {}",
        outcome.output_dir.display()
    );
    for file in &outcome.files {
        if let Some(name) = file.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
    Ok(())
}

/// Runs the prediction and returns what the tool produced. The managed job log lives in the
/// output directory but is not part of the result.
fn predict_with(config: PluginConfig, args: &PredictArgs) -> Result<PredictionOutcome> {
    let plugin = BepiPredPlugin::new(config);

    let mut request = PredictionRequest::new(&args.input, &args.output);
    request.method = args.method.into();
    request.threshold = args.threshold;
    request.top = args.top;
    request.rolling_window_size = args.rolling_window_size;
    request.plot_linear_epitope = args.plot_linear_epitope;

    if args.direct {
        return Ok(predict::run(&plugin, &request, LaunchMode::Direct)?);
    }

    let job_log = path::absolute(args.output.join(JOB_LOG))?;
    let mut runner = LoggedJobRunner::with_log_file(&job_log);
    let mut outcome = predict::run(&plugin, &request, LaunchMode::Managed(&mut runner))?;
    outcome.files.retain(|file| file != &job_log);
    Ok(outcome)
}
