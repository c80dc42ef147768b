use super::error::JobError;
use super::ffmpeg_info::probe_frame_count;
use super::log::DebugLog;
use super::place::Placer;
use super::profile::EncodingProfile;
use super::types::{JobEvent, JobState, ProgressParser, ProgressSink, TranscodeJob};
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_ENCODER: &str = "ffmpeg";

/// How often the abort flag is checked while the encoder is silent
const ABORT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Split the rendered command line with shell rules so quoted filter
/// expressions survive as single arguments.
fn apply_command_line(cmd: &mut Command, command_line: &str) {
    if command_line.is_empty() {
        return;
    }

    if let Some(args) = shlex::split(command_line) {
        cmd.args(args);
    } else {
        // Unbalanced quotes: fall back to plain whitespace splitting
        cmd.args(command_line.split_whitespace());
    }
}

/// Build the encode command: hardware init flags, overwrite flag, input,
/// profile flags, then the temp output path.
pub fn build_encode_cmd(program: &str, job: &TranscodeJob, profile: &EncodingProfile) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(profile.input_args());
    cmd.arg("-y");
    cmd.arg("-i").arg(&job.source);
    apply_command_line(&mut cmd, &profile.command_line());
    cmd.arg(&job.temp_output);
    cmd
}

/// Format a command as a shell-safe string for display and logs
pub fn format_cmd(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| {
            let s = arg.to_string_lossy();
            match shlex::try_quote(&s) {
                Ok(quoted) => quoted.into_owned(),
                Err(_) => s.into_owned(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read `reader` to the end, calling `on_line` for every non-empty line.
/// Both `\n` and `\r` end a line: the encoder redraws its status line with
/// bare carriage returns.
pub fn read_status_lines<R: Read>(reader: R, mut on_line: impl FnMut(String)) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        let len = buf.len();
        for &byte in buf {
            if byte == b'\n' || byte == b'\r' {
                if !pending.is_empty() {
                    on_line(String::from_utf8_lossy(&pending).into_owned());
                    pending.clear();
                }
            } else {
                pending.push(byte);
            }
        }
        reader.consume(len);
    }

    if !pending.is_empty() {
        on_line(String::from_utf8_lossy(&pending).into_owned());
    }
    Ok(())
}

fn spawn_reader<R>(stream: R, tx: Sender<String>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let _ = read_status_lines(stream, |line| {
            let _ = tx.send(line);
        });
    })
}

fn remove_temp(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed temp output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp output"),
    }
}

/// Runs one transcode job at a time: probe, encode, stream progress, place
pub struct JobDriver {
    program: String,
    placer: Placer,
    debug_log: Option<DebugLog>,
    abort: Arc<AtomicBool>,
}

impl JobDriver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            placer: Placer::default(),
            debug_log: None,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_placer(mut self, placer: Placer) -> Self {
        self.placer = placer;
        self
    }

    pub fn with_debug_log(mut self, debug_log: DebugLog) -> Self {
        self.debug_log = Some(debug_log);
        self
    }

    /// Share a cancellation flag (typically set from a Ctrl+C handler)
    pub fn with_abort_flag(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = abort;
        self
    }

    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }

    fn debug_log(&self, message: &str) {
        if let Some(log) = &self.debug_log {
            if let Err(e) = log.write(message) {
                debug!(error = %e, "debug log write failed");
            }
        }
    }

    fn set_state(&self, job: &mut TranscodeJob, state: JobState, sink: &mut dyn ProgressSink) {
        job.state = state;
        sink.on_event(&JobEvent::StateChanged {
            job_id: job.id,
            state,
        });
    }

    /// Run `job` to a terminal state.
    ///
    /// On failure or interruption the temp output is gone and the source is
    /// untouched. A placement error keeps the temp output, since the source
    /// may already have been removed.
    pub fn run(
        &self,
        job: &mut TranscodeJob,
        profile: &EncodingProfile,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), JobError> {
        if self.is_aborted() {
            self.set_state(job, JobState::Aborted, sink);
            return Err(JobError::Interrupted);
        }

        self.set_state(job, JobState::Probing, sink);
        job.total_frames = match probe_frame_count(&self.program, &job.source) {
            Ok(frames) => frames,
            Err(e) => {
                warn!(source = %job.source.display(), "probe failed, progress total unknown: {:#}", e);
                0
            }
        };
        debug!(source = %job.source.display(), total_frames = job.total_frames, "probed");

        if self.is_aborted() {
            self.set_state(job, JobState::Aborted, sink);
            return Err(JobError::Interrupted);
        }

        self.set_state(job, JobState::Encoding, sink);
        let cmd = build_encode_cmd(&self.program, job, profile);
        let cmd_string = format_cmd(&cmd);
        info!(command = %cmd_string, "encoding");
        self.debug_log(&format!(
            "\n=== Encoding Job ===\n{}\n{}\n",
            job.source.display(),
            cmd_string
        ));

        if let Err(e) = self.encode(cmd, job, sink) {
            remove_temp(&job.temp_output);
            job.last_error = Some(e.to_string());
            let state = if matches!(e, JobError::Interrupted) {
                JobState::Aborted
            } else {
                JobState::Failed
            };
            self.set_state(job, state, sink);
            return Err(e);
        }

        self.set_state(job, JobState::Placing, sink);
        match self
            .placer
            .place(&job.source, &job.temp_output, profile, &self.abort)
        {
            Ok(target) => {
                self.debug_log(&format!("✓ Success: {}\n", target.display()));
                job.output = Some(target);
                self.set_state(job, JobState::Done, sink);
                Ok(())
            }
            Err(e) => {
                // The source may already be gone: the temp file is the only copy
                warn!(temp = %job.temp_output.display(), "output kept at temp path: {}", e);
                job.last_error = Some(e.to_string());
                let state = if matches!(e, JobError::Interrupted) {
                    JobState::Aborted
                } else {
                    JobState::Failed
                };
                self.set_state(job, state, sink);
                Err(e)
            }
        }
    }

    fn encode(
        &self,
        mut cmd: Command,
        job: &mut TranscodeJob,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), JobError> {
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(JobError::Spawn)?;

        // Both pipes feed one channel: the merged output stream
        let (tx, rx) = mpsc::channel::<String>();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, tx.clone()));
        }
        drop(tx);

        let mut parser = ProgressParser::new();
        let mut captured = String::new();
        let mut killed = false;

        loop {
            if !killed && self.is_aborted() {
                debug!("abort requested, stopping encoder");
                let _ = child.kill();
                killed = true;
            }

            match rx.recv_timeout(ABORT_POLL_INTERVAL) {
                Ok(line) => {
                    if let Some(frame) = parser.parse_line(&line) {
                        let frames_done = job.record_frames(frame);
                        sink.on_event(&JobEvent::Progress {
                            job_id: job.id,
                            frames_done,
                            total_frames: job.total_frames,
                        });
                    }
                    captured.push_str(&line);
                    captured.push('\n');
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let status = reap(&mut child)?;
        for reader in readers {
            let _ = reader.join();
        }

        if killed || self.is_aborted() {
            return Err(JobError::Interrupted);
        }

        if !status.success() {
            self.debug_log(&format!(
                "✗ Encoding failed: {}\nStatus: {}\nEncoder output:\n{}\n",
                job.source.display(),
                status,
                captured
            ));
            return Err(JobError::EncodeFailed {
                exit_code: status.code(),
                output: captured,
            });
        }

        Ok(())
    }
}

/// Wait for the child so it never outlives the job
fn reap(child: &mut Child) -> Result<ExitStatus, JobError> {
    child.wait().map_err(JobError::Spawn)
}
