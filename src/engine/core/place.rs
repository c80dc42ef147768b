//! Crash-safe placement of a finished temp output.
//!
//! The temp file is only moved once the encoder has exited successfully.
//! When the filesystem reports the target as locked the move is retried
//! forever with a fixed delay.

use super::error::JobError;
use super::profile::{EncodingProfile, RenamePolicy};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Blocking delay between placement attempts
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Filesystem operations used during placement
pub trait FileOps {
    fn exists(&self, path: &Path) -> bool;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileOps for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    /// Rename, or copy and delete when source and target are on different devices
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
            other => other,
        }
    }
}

/// True when the error means another process holds the file
pub fn is_locked(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy
    ) {
        return true;
    }
    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}

pub struct Placer {
    fs: Box<dyn FileOps>,
    sleeper: Box<dyn Sleeper>,
    retry_delay: Duration,
}

impl Default for Placer {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

impl Placer {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            fs: Box::new(RealFs),
            sleeper: Box::new(ThreadSleeper),
            retry_delay,
        }
    }

    pub fn with_fs(mut self, fs: impl FileOps + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Move `temp` to its final location according to the rename policy and
    /// return that location. Locked files are retried until they succeed or
    /// `abort` is set, in which case `temp` is left where it is.
    pub fn place(
        &self,
        source: &Path,
        temp: &Path,
        profile: &EncodingProfile,
        abort: &AtomicBool,
    ) -> Result<PathBuf, JobError> {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match self.try_place(source, temp, profile) {
                Ok(target) => {
                    debug!(target = %target.display(), attempt, "placed output");
                    return Ok(target);
                }
                Err((_, err)) if is_locked(&err) => {
                    if abort.load(Ordering::SeqCst) {
                        warn!(
                            temp = %temp.display(),
                            "placement interrupted, encoded output kept at temp path"
                        );
                        return Err(JobError::Interrupted);
                    }
                    warn!(
                        source = %source.display(),
                        error = %err,
                        "target locked, retrying in {}s",
                        self.retry_delay.as_secs_f64()
                    );
                    self.sleeper.sleep(self.retry_delay);
                }
                Err((path, source)) => return Err(JobError::Placement { path, source }),
            }
        }
    }

    fn try_place(
        &self,
        source: &Path,
        temp: &Path,
        profile: &EncodingProfile,
    ) -> Result<PathBuf, (PathBuf, io::Error)> {
        let target = match &profile.rename_policy {
            RenamePolicy::ReplaceInPlace => {
                // A previous attempt may already have removed it
                match self.fs.remove_file(source) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err((source.to_path_buf(), e)),
                }
                with_suffix_and_extension(source, "", &profile.extension)
            }
            RenamePolicy::KeepOriginal { suffix } => {
                free_target(self.fs.as_ref(), source, suffix, &profile.extension)
            }
        };

        self.fs
            .move_file(temp, &target)
            .map_err(|e| (target.clone(), e))?;
        Ok(target)
    }
}

/// `<dir>/<stem><suffix>.<extension>` where stem drops the last extension
pub fn with_suffix_and_extension(source: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut name: OsString = source.with_extension("").into_os_string();
    name.push(suffix);
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// First of `<stem><suffix>.<ext>`, `<stem><suffix>1.<ext>`, `<stem><suffix>2.<ext>`, ...
/// that does not exist yet
pub fn free_target(fs: &dyn FileOps, source: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut candidate = with_suffix_and_extension(source, suffix, extension);
    let mut counter: u64 = 1;
    while fs.exists(&candidate) {
        candidate = with_suffix_and_extension(source, &format!("{}{}", suffix, counter), extension);
        counter += 1;
    }
    candidate
}
