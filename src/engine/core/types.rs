use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Probing,
    Encoding,
    Placing,
    Done,
    Failed,
    Aborted,
}

/// One input file moving through probe, encode and placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeJob {
    pub id: Uuid,
    pub source: PathBuf,
    /// Scratch file the encoder writes to, next to the source
    pub temp_output: PathBuf,
    pub state: JobState,

    /// 0 when the probe could not count frames
    pub total_frames: u64,
    pub frames_done: u64,

    /// Final location once placed
    pub output: Option<PathBuf>,
    pub last_error: Option<String>,
}

impl TranscodeJob {
    /// Create a pending job with a fresh temp output name
    pub fn new(source: PathBuf, extension: &str) -> Self {
        let id = Uuid::new_v4();
        let temp_output = temp_output_path(&source, id, extension);
        Self {
            id,
            source,
            temp_output,
            state: JobState::Pending,
            total_frames: 0,
            frames_done: 0,
            output: None,
            last_error: None,
        }
    }

    /// Record a parsed frame number. The counter never goes backwards and
    /// never passes a known total. Returns the new counter value.
    pub fn record_frames(&mut self, parsed: u64) -> u64 {
        let bounded = if self.total_frames > 0 {
            parsed.min(self.total_frames)
        } else {
            parsed
        };
        self.frames_done = self.frames_done.max(bounded);
        self.frames_done
    }

    /// Completed fraction in percent, `None` while the total is unknown
    pub fn progress_pct(&self) -> Option<f64> {
        if self.total_frames == 0 {
            return None;
        }
        Some((self.frames_done as f64 / self.total_frames as f64 * 100.0).min(100.0))
    }
}

fn temp_output_path(source: &Path, id: Uuid, extension: &str) -> PathBuf {
    let dir = source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(format!("{}.{}", id.simple(), extension))
}

/// Parser for the encoder's human-readable status lines, e.g.
/// `frame=  120 fps= 30 q=28.0 size=  1024kB time=00:00:04.00 ...`
#[derive(Debug, Default, Clone)]
pub struct ProgressParser {
    pub frame: Option<u64>,
    pub lines_seen: u64,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one status line. Returns the frame number when the line has the
    /// `frame=<n> ... fps=` shape; any other line is ignored.
    pub fn parse_line(&mut self, line: &str) -> Option<u64> {
        self.lines_seen += 1;
        let frame = parse_frame_field(line)?;
        self.frame = Some(frame);
        Some(frame)
    }
}

/// Extract `<n>` from a line starting with `frame=<n>` followed later by `fps=`
pub fn parse_frame_field(line: &str) -> Option<u64> {
    let rest = line.trim_start().strip_prefix("frame=")?;
    let (number, _) = rest.split_once("fps=")?;
    number.trim().parse().ok()
}

/// Notification emitted while jobs run
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Job picked up by the batch runner (`index` is 0-based)
    Started {
        job_id: Uuid,
        index: usize,
        count: usize,
        source: PathBuf,
    },

    StateChanged { job_id: Uuid, state: JobState },

    /// Frame counter moved; `total_frames` is 0 when unknown
    Progress {
        job_id: Uuid,
        frames_done: u64,
        total_frames: u64,
    },

    Completed { job_id: Uuid, output: PathBuf },

    Failed { job_id: Uuid, error: String },
}

/// Receiver of job events. Display cadence is the sink's business.
pub trait ProgressSink {
    fn on_event(&mut self, event: &JobEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&JobEvent),
{
    fn on_event(&mut self, event: &JobEvent) {
        self(event)
    }
}
