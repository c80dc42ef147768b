// Sequential batch runner. One encoder process at a time: the encoder
// already saturates the CPU/GPU, parallel jobs would only contend.

use std::path::PathBuf;
use tracing::{error, info, warn};

use super::{EncodingProfile, JobDriver, JobError, JobEvent, ProgressSink, TranscodeJob};

/// Per-file outcomes of a finished batch
#[derive(Debug, Default, Clone)]
pub struct BatchSummary {
    /// `(source, final output)` for every placed file
    pub completed: Vec<(PathBuf, PathBuf)>,
    /// `(source, error message)` for every failed file
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}

pub struct BatchRunner<'a> {
    driver: &'a JobDriver,
    profile: &'a EncodingProfile,
}

impl<'a> BatchRunner<'a> {
    pub fn new(driver: &'a JobDriver, profile: &'a EncodingProfile) -> Self {
        Self { driver, profile }
    }

    /// Run every source in order. A failed file is reported and skipped;
    /// an interruption stops the batch and is returned to the caller.
    pub fn run(
        &self,
        sources: &[PathBuf],
        sink: &mut dyn ProgressSink,
    ) -> Result<BatchSummary, JobError> {
        let mut summary = BatchSummary::default();
        let count = sources.len();

        for (index, source) in sources.iter().enumerate() {
            let mut job = TranscodeJob::new(source.clone(), &self.profile.extension);
            info!(
                "Compressing {} of {}: {}",
                index + 1,
                count,
                source.display()
            );
            sink.on_event(&JobEvent::Started {
                job_id: job.id,
                index,
                count,
                source: source.clone(),
            });

            match self.driver.run(&mut job, self.profile, sink) {
                Ok(()) => {
                    let output = job.output.clone().unwrap_or_else(|| source.clone());
                    sink.on_event(&JobEvent::Completed {
                        job_id: job.id,
                        output: output.clone(),
                    });
                    summary.completed.push((source.clone(), output));
                }
                Err(JobError::Interrupted) => {
                    warn!(source = %source.display(), "batch interrupted");
                    sink.on_event(&JobEvent::Failed {
                        job_id: job.id,
                        error: JobError::Interrupted.to_string(),
                    });
                    return Err(JobError::Interrupted);
                }
                Err(e) => {
                    error!(source = %source.display(), "{}", e);
                    let message = match e.output_tail(10) {
                        Some(tail) => format!("{}\n{}", e, tail),
                        None => e.to_string(),
                    };
                    sink.on_event(&JobEvent::Failed {
                        job_id: job.id,
                        error: message.clone(),
                    });
                    summary.failed.push((source.clone(), message));
                }
            }
        }

        Ok(summary)
    }
}
