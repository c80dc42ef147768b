use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Video file extensions picked up from the command line and directory walks
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mpg", "mpeg", "wmv", "mov", "webm"];

/// Check if a path has a video file extension
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Scan a directory recursively for video files, sorted for a stable order
pub fn scan(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_video_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Expand command-line paths into the list of video files to process.
/// Directories are walked recursively; files without a video extension and
/// paths that do not exist are dropped. Results are absolute when possible.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut videos = Vec::new();
    for path in paths {
        if path.is_dir() {
            videos.extend(scan(path)?);
        } else if path.is_file() && is_video_file(path) {
            videos.push(path.clone());
        } else {
            debug!(path = %path.display(), "skipping non-video path");
        }
    }

    Ok(videos
        .into_iter()
        .map(|p| std::path::absolute(&p).unwrap_or(p))
        .collect())
}
