/// Events emitted while an installation plan executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    InstallStart { env_name: String, total_steps: u64 },
    StepStart {
        index: usize,
        label: &'static str,
        detail: String,
    },
    StepFinish,
    InstallFinish,

    /// Free-form note, e.g. a skipped step.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::Message("ignored".to_string()));
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(event);
        }));

        reporter.report(Progress::InstallStart {
            env_name: "BepiPred-3.0".to_string(),
            total_steps: 3,
        });
        reporter.report(Progress::StepFinish);
        drop(reporter);

        let seen = seen.into_inner().unwrap();
        assert_eq!(
            seen,
            vec![
                Progress::InstallStart {
                    env_name: "BepiPred-3.0".to_string(),
                    total_steps: 3,
                },
                Progress::StepFinish,
            ]
        );
    }
}
