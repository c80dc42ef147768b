// Interactive prompts: the timed "customize?" key wait and line input

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::{Duration, Instant};

use crate::engine::Prompter;

/// Wait up to `timeout` for any key press. Returns false on timeout or when
/// stdin is not a terminal.
pub fn wait_for_key(timeout: Duration) -> io::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    enable_raw_mode()?;
    let pressed = poll_for_key(timeout);
    disable_raw_mode()?;
    pressed
}

fn poll_for_key(timeout: Duration) -> io::Result<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }
        if event::poll(remaining)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(true);
                }
            }
        }
    }
}

/// Line-based prompter over any reader/writer pair
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `label` and read one line. `None` on end of input.
    pub fn read_line(&mut self, label: &str) -> Option<String> {
        write!(self.output, "{}", label).ok()?;
        self.output.flush().ok()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    /// Ask a yes/no question. Anything but `y`/`yes` (including end of
    /// input) means no.
    pub fn confirm(&mut self, question: &str) -> bool {
        self.read_line(&format!("{} [y/N] ", question))
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, question: &str, current: &str) -> Option<String> {
        let _ = writeln!(self.output, "default: {}", current);
        self.read_line(&format!("{}: ", question))
    }
}
