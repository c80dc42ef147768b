// Optional single-instance lock held for the whole run

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const LOCK_FILE_NAME: &str = ".ffcrush.lock";

/// Removes the lock file when dropped
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    /// Create `.ffcrush.lock` in `dir`; fails if it already exists
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => anyhow::bail!(
                "Another instance is already running in {} (remove {} if it is stale)",
                dir.display(),
                path.display()
            ),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create lock file {}", path.display()));
            }
        };

        writeln!(file, "{}", std::process::id())
            .with_context(|| format!("Failed to write lock file {}", path.display()))?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
