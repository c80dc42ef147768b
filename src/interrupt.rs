// Ctrl+C handling: the first press asks the running job to stop, a second
// one forces the process out

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Exit status after Ctrl+C, as a shell reports SIGINT
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Abort flag raised; the driver winds the current job down
    Stop,
    /// Second request: the caller should exit right away
    ForceExit,
}

/// State shared with the signal handler
#[derive(Debug, Clone)]
pub struct InterruptState {
    abort: Arc<AtomicBool>,
    lock_path: Option<PathBuf>,
}

impl InterruptState {
    pub fn new(abort: Arc<AtomicBool>) -> Self {
        Self {
            abort,
            lock_path: None,
        }
    }

    /// Lock file to remove before a forced exit, which skips destructors
    pub fn with_lock_path(mut self, path: PathBuf) -> Self {
        self.lock_path = Some(path);
        self
    }

    pub fn trigger(&self) -> Interrupt {
        if !self.abort.swap(true, Ordering::SeqCst) {
            return Interrupt::Stop;
        }
        if let Some(path) = &self.lock_path {
            let _ = std::fs::remove_file(path);
        }
        Interrupt::ForceExit
    }
}

/// Install the process-wide Ctrl+C handler
pub fn install(state: InterruptState) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || match state.trigger() {
        Interrupt::Stop => eprintln!("\nStopping, press Ctrl+C again to force exit"),
        Interrupt::ForceExit => std::process::exit(EXIT_INTERRUPTED),
    })
}
