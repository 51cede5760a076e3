use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Carlos Oscar Sorzano, Daniel Del Hoyo Gomez, Martín Salinas Antón",
    version,
    about = "BepiPred plugin CLI - locate, install, validate and run the BepiPred B-cell epitope predictor.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to the plugin configuration file in TOML format.
    /// Defaults to the stored location (see `bepipred config path`).
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Values that take precedence over the environment and the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Directory containing the BepiPred sources and requirements.txt (BEPIPRED_HOME).
    #[arg(long, global = true, value_name = "PATH")]
    pub home: Option<PathBuf>,

    /// BepiPred source archive to install from when no home exists (ZIP_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub zip: Option<PathBuf>,

    /// Shell fragment that activates the BepiPred environment (ACT_COMMAND).
    #[arg(long, global = true, value_name = "COMMAND")]
    pub activation: Option<String>,

    /// Directory under which installed software lives (EM_ROOT).
    #[arg(long, global = true, value_name = "PATH")]
    pub software_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether BepiPred is installed and its environment activates.
    Check,
    /// Install the BepiPred environment from its home directory or source archive.
    Install {
        /// Print the installation plan without executing it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the plugin variables and what they currently resolve to.
    Env,
    /// Predict B-cell epitopes for the sequences in a FASTA file.
    Predict(PredictArgs),
    /// Run one of the BepiPred scripts inside the activated environment.
    Run(RunArgs),
    /// Manage the location of the plugin configuration file.
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Variable-threshold prediction
    Vt,
    /// Majority-vote prediction
    Mjv,
}

/// Arguments for the `predict` subcommand.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Input protein sequences in FASTA format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory the prediction results are written to.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Prediction strategy.
    #[arg(short, long, value_enum, default_value_t = Method::Vt)]
    pub method: Method,

    /// Epitope score threshold (vt only).
    #[arg(short, long, value_name = "FLOAT")]
    pub threshold: Option<f64>,

    /// Fraction of top-scoring residues reported as linear epitope candidates.
    #[arg(long, value_name = "FLOAT")]
    pub top: Option<f64>,

    /// Window size used to smooth scores for linear epitope candidates.
    #[arg(long, value_name = "INT")]
    pub rolling_window_size: Option<u32>,

    /// Also plot linear epitope candidates.
    #[arg(long)]
    pub plot_linear_epitope: bool,

    /// Run the script as a plain subprocess instead of a managed job.
    #[arg(long)]
    pub direct: bool,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Script name, relative to the BepiPred home.
    #[arg(required = true)]
    pub script: String,

    /// Arguments passed to the script unchanged.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Working directory for the script.
    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Run the script as a plain subprocess instead of a managed job.
    #[arg(long)]
    pub direct: bool,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the absolute path of the configuration file in use.
    Path,
    /// Store a custom absolute path for the configuration file.
    SetPath {
        /// The configuration file to use from now on.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Reset the configuration file path to its default, OS-specific location.
    ResetPath,
}
