use super::plugin::Plugin;
use crate::engine::error::EngineError;
use crate::engine::launch::LaunchMode;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{self, Path, PathBuf};
use tracing::{info, instrument, warn};

pub const CLI_SCRIPT: &str = "bepipred3_CLI.py";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictionMethod {
    /// Variable-threshold prediction on the averaged ensemble score.
    #[default]
    VoteThreshold,
    /// Majority vote across the ensemble models.
    MajorityVote,
}

impl PredictionMethod {
    pub fn as_flag(&self) -> &'static str {
        match self {
            PredictionMethod::VoteThreshold => "vt_pred",
            PredictionMethod::MajorityVote => "mjv_pred",
        }
    }
}

impl fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// An opaque protein sequence handed through to the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub residues: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub method: PredictionMethod,
    /// Epitope score threshold, only meaningful for [`PredictionMethod::VoteThreshold`].
    pub threshold: Option<f64>,
    /// Fraction of top-scoring residues reported as linear epitope candidates.
    pub top: Option<f64>,
    pub rolling_window_size: Option<u32>,
    pub plot_linear_epitope: bool,
}

impl PredictionRequest {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            method: PredictionMethod::default(),
            threshold: None,
            top: None,
            rolling_window_size: None,
            plot_linear_epitope: false,
        }
    }

    /// Anchors `input` and `output_dir` to the current directory.
    ///
    /// The tool runs from inside the output directory, so relative paths would otherwise be
    /// resolved against the wrong place.
    pub fn to_absolute(&self) -> Result<Self, EngineError> {
        let input = path::absolute(&self.input).map_err(EngineError::io(&self.input))?;
        let output_dir =
            path::absolute(&self.output_dir).map_err(EngineError::io(&self.output_dir))?;
        Ok(Self {
            input,
            output_dir,
            ..self.clone()
        })
    }

    pub fn check(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidRequest(msg));
        if !self.input.is_file() {
            return invalid(format!("input FASTA not found: {}", self.input.display()));
        }
        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return invalid(format!("threshold must lie in [0, 1], got {}", t));
            }
        }
        if let Some(top) = self.top {
            if !(top > 0.0 && top <= 1.0) {
                return invalid(format!("top fraction must lie in (0, 1], got {}", top));
            }
        }
        if self.rolling_window_size == Some(0) {
            return invalid("rolling window size must be positive".to_string());
        }
        Ok(())
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            self.input.display().to_string(),
            "-o".to_string(),
            self.output_dir.display().to_string(),
            "-pred".to_string(),
            self.method.as_flag().to_string(),
        ];
        if let Some(t) = self.threshold {
            args.extend(["-t".to_string(), t.to_string()]);
        }
        if let Some(top) = self.top {
            args.extend(["-top".to_string(), top.to_string()]);
        }
        if let Some(size) = self.rolling_window_size {
            args.extend(["-rolling_window_size".to_string(), size.to_string()]);
        }
        if self.plot_linear_epitope {
            args.push("-plot_linear_epitope".to_string());
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionOutcome {
    pub output_dir: PathBuf,
    /// Files the tool left in the output directory, sorted by name.
    pub files: Vec<PathBuf>,
}

pub fn write_fasta(records: &[SequenceRecord], path: &Path) -> Result<(), EngineError> {
    let io_err = EngineError::io(path);
    let write = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for record in records {
            writeln!(writer, ">{}", record.id)?;
            for chunk in record.residues.as_bytes().chunks(60) {
                writer.write_all(chunk)?;
                writer.write_all(b"\n")?;
            }
        }
        writer.flush()
    };
    write().map_err(io_err)
}

/// Runs a BepiPred prediction after checking that the installation is usable.
///
/// # Errors
///
/// Returns [`EngineError::NotReady`] with the validation report when the tool is not
/// installed, [`EngineError::InvalidRequest`] for bad parameters, and any launch error.
#[instrument(skip_all, name = "prediction_workflow", fields(input = %request.input.display()))]
pub fn run<P: Plugin + ?Sized>(
    plugin: &P,
    request: &PredictionRequest,
    mode: LaunchMode<'_>,
) -> Result<PredictionOutcome, EngineError> {
    let report = plugin.validate_installation();
    if !report.is_ready() {
        return Err(EngineError::NotReady(report.to_string()));
    }
    let request = request.to_absolute()?;
    request.check()?;
    if request.method == PredictionMethod::MajorityVote && request.threshold.is_some() {
        warn!("A threshold has no effect with majority-vote prediction.");
    }

    fs::create_dir_all(&request.output_dir).map_err(EngineError::io(&request.output_dir))?;
    info!("Writing predictions to {:?}", request.output_dir);

    plugin.run_script(
        CLI_SCRIPT,
        &request.to_args(),
        Some(&request.output_dir),
        mode,
    )?;

    let mut files = fs::read_dir(&request.output_dir)
        .and_then(|entries| entries.map(|e| e.map(|e| e.path())).collect::<Result<Vec<_>, _>>())
        .map_err(EngineError::io(&request.output_dir))?;
    files.sort();
    info!("Prediction produced {} file(s).", files.len());

    Ok(PredictionOutcome {
        output_dir: request.output_dir.clone(),
        files,
    })
}

/// Writes `records` to `<output_dir>/input.fasta` and predicts on them.
pub fn run_on_sequences<P: Plugin + ?Sized>(
    plugin: &P,
    records: &[SequenceRecord],
    mut request: PredictionRequest,
    mode: LaunchMode<'_>,
) -> Result<PredictionOutcome, EngineError> {
    if records.is_empty() {
        return Err(EngineError::InvalidRequest(
            "at least one sequence is required".to_string(),
        ));
    }
    fs::create_dir_all(&request.output_dir).map_err(EngineError::io(&request.output_dir))?;
    let fasta = request.output_dir.join("input.fasta");
    write_fasta(records, &fasta)?;
    request.input = fasta;
    run(plugin, &request, mode)
}
