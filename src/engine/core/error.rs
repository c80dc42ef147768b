use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Terminal failure of a single transcode job
#[derive(Debug, Error)]
pub enum JobError {
    /// Encoder exited unsuccessfully; the temp output has been removed
    #[error("Encoding failed with {}", describe_exit(.exit_code))]
    EncodeFailed {
        exit_code: Option<i32>,
        output: String,
    },

    /// Run was cancelled. During encoding the child was reaped and the temp
    /// output removed; during placement the temp output is kept.
    #[error("Interrupted")]
    Interrupted,

    #[error("Failed to run encoder: {0}")]
    Spawn(#[source] io::Error),

    /// Placement failed for a reason other than a locked file
    #[error("Failed to place output at {}: {source}", path.display())]
    Placement {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl JobError {
    /// Last `lines` lines of the captured encoder output, if any
    pub fn output_tail(&self, lines: usize) -> Option<String> {
        match self {
            JobError::EncodeFailed { output, .. } => {
                let all: Vec<&str> = output.lines().collect();
                let start = all.len().saturating_sub(lines);
                Some(all[start..].join("\n"))
            }
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
