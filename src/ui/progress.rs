// Single-line console progress display fed by job events

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::engine::{JobEvent, JobState, ProgressSink};

const BAR_WIDTH: usize = 30;
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Text progress bar, filled proportionally to `percent`
pub fn render_bar(percent: f64, width: usize) -> String {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let filled = (width as f64 * ratio).round() as usize;
    let mut bar = String::with_capacity(width * 3);
    for x in 0..width {
        bar.push(if x < filled { '█' } else { '░' });
    }
    bar
}

/// Progress line for a completed/total frame count (total 0 = unknown)
pub fn render_progress(frames_done: u64, total_frames: u64) -> String {
    if total_frames == 0 {
        return format!("{} frames", frames_done);
    }
    let percent = frames_done as f64 / total_frames as f64 * 100.0;
    format!(
        "{} {:5.1}% {}/{} frames",
        render_bar(percent, BAR_WIDTH),
        percent.min(100.0),
        frames_done,
        total_frames
    )
}

/// Prints job events to a writer, redrawing the progress line in place
pub struct ConsoleProgress<W: Write> {
    out: W,
    last_draw: Option<Instant>,
    line_open: bool,
}

impl ConsoleProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_draw: None,
            line_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn close_line(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }

    fn draw(&mut self, frames_done: u64, total_frames: u64, force: bool) -> io::Result<()> {
        let due = self
            .last_draw
            .is_none_or(|at| at.elapsed() >= REDRAW_INTERVAL);
        if !force && !due {
            return Ok(());
        }
        write!(self.out, "\r{}", render_progress(frames_done, total_frames))?;
        self.out.flush()?;
        self.last_draw = Some(Instant::now());
        self.line_open = true;
        Ok(())
    }

    fn handle(&mut self, event: &JobEvent) -> io::Result<()> {
        match event {
            JobEvent::Started {
                index,
                count,
                source,
                ..
            } => {
                self.close_line()?;
                writeln!(
                    self.out,
                    "Compressing {} of {}: {}",
                    index + 1,
                    count,
                    source.display()
                )?;
                self.last_draw = None;
            }
            JobEvent::StateChanged { state, .. } => {
                if *state == JobState::Placing {
                    self.close_line()?;
                }
            }
            JobEvent::Progress {
                frames_done,
                total_frames,
                ..
            } => {
                let finished = *total_frames > 0 && frames_done >= total_frames;
                self.draw(*frames_done, *total_frames, finished)?;
            }
            JobEvent::Completed { output, .. } => {
                self.close_line()?;
                writeln!(self.out, "✓ Saved: {}", output.display())?;
            }
            JobEvent::Failed { error, .. } => {
                self.close_line()?;
                writeln!(self.out, "✗ {}", error)?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> ProgressSink for ConsoleProgress<W> {
    fn on_event(&mut self, event: &JobEvent) {
        // Display errors (closed stdout) must not fail the job
        let _ = self.handle(event);
    }
}
