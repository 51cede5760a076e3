use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::command::CommandSpec;
use crate::core::plan::{InstallStep, InstallationPlan};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, trace, warn};
use zip::ZipArchive;

/// Runs every step of `plan` in order, stopping at the first failure.
///
/// Needed programs are checked before anything is touched, and an advisory lock next to the
/// home keeps a second installer from running the same plan concurrently. A failed step leaves
/// no sentinel behind, so the next run starts over from planning.
///
/// # Errors
///
/// Returns [`EngineError::MissingProgram`] or [`EngineError::InstallInProgress`] before any
/// step runs, and the failing step's error otherwise.
#[instrument(skip_all, name = "install", fields(env = %plan.env_name))]
pub fn execute(plan: &InstallationPlan, reporter: &ProgressReporter) -> Result<(), EngineError> {
    for program in &plan.needed_programs {
        let found = which::which(program).map_err(|_| EngineError::MissingProgram {
            program: program.clone(),
        })?;
        debug!("Found required program '{}' at {:?}", program, found);
    }

    let _lock = InstallLock::acquire(plan.lock_path())?;

    reporter.report(Progress::InstallStart {
        env_name: plan.env_name.clone(),
        total_steps: plan.steps.len() as u64,
    });

    for (index, step) in plan.steps.iter().enumerate() {
        info!("Step {}/{}: {}", index + 1, plan.steps.len(), step);
        reporter.report(Progress::StepStart {
            index,
            label: step.label(),
            detail: step.to_string(),
        });
        run_step(step, reporter)?;
        reporter.report(Progress::StepFinish);
    }

    reporter.report(Progress::InstallFinish);
    info!("{} installed into {:?}", plan.env_name, plan.home);
    Ok(())
}

fn run_step(step: &InstallStep, reporter: &ProgressReporter) -> Result<(), EngineError> {
    match step {
        InstallStep::Extract {
            archive,
            destination,
        } => extract_zip(archive, destination),
        InstallStep::Flatten { directory } => {
            if !flatten_single_directory(directory)? {
                reporter.report(Progress::Message(format!(
                    "{} has no single wrapping directory, left as is",
                    directory.display()
                )));
            }
            Ok(())
        }
        InstallStep::DisablePin {
            manifest,
            requirement,
        } => disable_pin(manifest, requirement),
        InstallStep::Run(spec) => run_command(spec),
        InstallStep::MarkInstalled { sentinel } => File::create(sentinel)
            .map(|_| ())
            .map_err(EngineError::io(sentinel)),
    }
}

fn run_command(spec: &CommandSpec) -> Result<(), EngineError> {
    let output = spec
        .to_command()
        .output()
        .map_err(|e| EngineError::StepFailed {
            step: spec.to_string(),
            reason: e.to_string(),
        })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        trace!(target: "bepipred::install::stdout", "{}", line);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        debug!(target: "bepipred::install::stderr", "{}", line);
    }

    if output.status.success() {
        return Ok(());
    }
    let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
    let tail: Vec<&str> = tail.into_iter().rev().collect();
    Err(EngineError::StepFailed {
        step: spec.to_string(),
        reason: if tail.is_empty() {
            output.status.to_string()
        } else {
            format!("{}\n{}", output.status, tail.join("\n"))
        },
    })
}

fn disable_pin(manifest: &Path, requirement: &str) -> Result<(), EngineError> {
    let content = fs::read_to_string(manifest).map_err(EngineError::io(manifest))?;
    let (patched, count) = comment_out_requirement(&content, requirement);
    if count == 0 {
        warn!("No '{}' line found in {:?}", requirement, manifest);
        return Ok(());
    }
    debug!("Commented out {} '{}' line(s) in {:?}", count, requirement, manifest);
    fs::write(manifest, patched).map_err(EngineError::io(manifest))
}

/// Prefixes with `#` every line that starts with `requirement`; other lines are untouched.
pub fn comment_out_requirement(content: &str, requirement: &str) -> (String, usize) {
    let mut count = 0;
    let patched = content
        .split_inclusive('\n')
        .map(|line| {
            if line.starts_with(requirement) {
                count += 1;
                format!("#{}", line)
            } else {
                line.to_string()
            }
        })
        .collect();
    (patched, count)
}

/// Moves the contents of the only directory inside `dir` up into `dir`.
///
/// Returns `false` and leaves `dir` untouched unless it holds exactly one entry which is a
/// directory.
pub fn flatten_single_directory(dir: &Path) -> Result<bool, EngineError> {
    let entries = list_dir(dir)?;
    let [wrapper] = entries.as_slice() else {
        return Ok(false);
    };
    if !wrapper.is_dir() {
        return Ok(false);
    }

    // The wrapper may contain an entry with its own name, so move it aside first.
    let staging = dir.join(format!(".flatten-{}", std::process::id()));
    fs::rename(wrapper, &staging).map_err(EngineError::io(wrapper))?;
    for child in list_dir(&staging)? {
        let Some(name) = child.file_name() else {
            continue;
        };
        let target = dir.join(name);
        fs::rename(&child, &target).map_err(EngineError::io(&child))?;
    }
    fs::remove_dir(&staging).map_err(EngineError::io(&staging))?;
    debug!("Flattened {:?} into {:?}", wrapper, dir);
    Ok(true)
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    fs::read_dir(dir)
        .and_then(|entries| entries.map(|e| e.map(|e| e.path())).collect())
        .map_err(EngineError::io(dir))
}

fn extract_zip(archive_path: &Path, destination: &Path) -> Result<(), EngineError> {
    let archive_error = |source: zip::result::ZipError| EngineError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };
    let file = File::open(archive_path).map_err(EngineError::io(archive_path))?;
    let mut archive = ZipArchive::new(file).map_err(archive_error)?;
    fs::create_dir_all(destination).map_err(EngineError::io(destination))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_error)?;
        let raw = entry.name().replace('\\', "/");
        let Some(rel) = sanitize_entry_path(Path::new(&raw)) else {
            warn!("Skipping archive entry outside the destination: {}", raw);
            continue;
        };
        let out = destination.join(&rel);
        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(EngineError::io(&out))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(EngineError::io(parent))?;
        }
        let mut out_file = File::create(&out).map_err(EngineError::io(&out))?;
        io::copy(&mut entry, &mut out_file).map_err(EngineError::io(&out))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out, fs::Permissions::from_mode(mode & 0o7777))
                .map_err(EngineError::io(&out))?;
        }
    }
    info!("Extracted {} entries into {:?}", archive.len(), destination);
    Ok(())
}

fn sanitize_entry_path(path: &Path) -> Option<PathBuf> {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => return None,
            Component::CurDir => {}
            Component::Normal(part) => cleaned.push(part),
        }
    }
    (!cleaned.as_os_str().is_empty()).then_some(cleaned)
}

/// Exclusive lock file, removed when dropped.
#[derive(Debug)]
struct InstallLock {
    path: PathBuf,
}

impl InstallLock {
    fn acquire(path: PathBuf) -> Result<Self, EngineError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(EngineError::InstallInProgress { lock: path });
            }
            Err(e) => return Err(EngineError::io(path)(e)),
        };
        writeln!(file, "{}", std::process::id()).map_err(EngineError::io(&path))?;
        debug!("Acquired install lock {:?}", path);
        Ok(Self { path })
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove install lock {:?}: {}", self.path, e);
        }
    }
}
