use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEBUG_LOG_NAME: &str = "ffcrush.log";

/// Append-only file receiving command lines and full encoder output of failures
#[derive(Debug, Clone)]
pub struct DebugLog {
    path: PathBuf,
}

impl DebugLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Log file named `ffcrush.log` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEBUG_LOG_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped entry, creating the file if needed
    pub fn write(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open debug log {}", self.path.display()))?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }
}
