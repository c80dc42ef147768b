#![allow(dead_code)] // Not every test binary uses every helper

use ffcrush::engine::{JobEvent, JobState, ProgressSink};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Answers the frame-count probe, then streams three status lines with bare
/// carriage returns and writes the output file
pub const SUCCESS_ENCODER: &str = r#"#!/bin/sh
for last; do :; done
case " $* " in
  *" -version "*)
    echo "ffmpeg version stub"
    exit 0
    ;;
  *" -f null "*)
    echo "frame=  120 fps=0.0 q=-1.0 Lsize=N/A time=00:00:04.00 bitrate=N/A speed= 900x" >&2
    exit 0
    ;;
esac
printf 'frame=   40 fps= 20 q=28.0 size=     256kB time=00:00:01.33\r' >&2
printf 'frame=   80 fps= 20 q=28.0 size=     512kB time=00:00:02.66\r' >&2
printf 'frame=  120 fps= 20 q=28.0 size=    1024kB time=00:00:04.00\n' >&2
printf 'encoded' > "$last"
exit 0
"#;

/// Like SUCCESS_ENCODER, but the frame-count pass reports no `frame=` marker
pub const SILENT_PROBE_ENCODER: &str = r#"#!/bin/sh
for last; do :; done
case " $* " in
  *" -version "*)
    echo "ffmpeg version stub"
    exit 0
    ;;
  *" -f null "*)
    echo "Input #0, matroska,webm, from 'clip.mkv':" >&2
    exit 0
    ;;
esac
printf 'frame=   40 fps= 20 q=28.0 size=     256kB\r' >&2
printf 'frame=   80 fps= 20 q=28.0 size=     512kB\r' >&2
printf 'frame=  120 fps= 20 q=28.0 size=    1024kB\n' >&2
printf 'encoded' > "$last"
exit 0
"#;

/// Appends each argument list to `calls.log` next to the script, then
/// behaves like SUCCESS_ENCODER
pub const CALL_LOGGING_ENCODER: &str = r#"#!/bin/sh
for last; do :; done
case " $* " in
  *" -version "*)
    echo "ffmpeg version stub"
    exit 0
    ;;
esac
echo "$*" >> "$(dirname "$0")/calls.log"
case " $* " in
  *" -f null "*)
    echo "frame=  120 fps=0.0 q=-1.0 Lsize=N/A" >&2
    exit 0
    ;;
esac
printf 'frame=  120 fps= 20 q=28.0 size=    1024kB\n' >&2
printf 'encoded' > "$last"
exit 0
"#;

/// Leaves a partial output behind and exits nonzero
pub const FAILING_ENCODER: &str = r#"#!/bin/sh
for last; do :; done
case " $* " in
  *" -version "*)
    echo "ffmpeg version stub"
    exit 0
    ;;
  *" -f null "*)
    echo "frame=  120 fps=0.0 q=-1.0 Lsize=N/A time=00:00:04.00" >&2
    exit 0
    ;;
esac
printf 'partial' > "$last"
echo "Error while opening encoder for output stream #0:0" >&2
echo "Conversion failed!" >&2
exit 1
"#;

/// Fails only for sources whose name contains "broken"
pub const SELECTIVE_ENCODER: &str = r#"#!/bin/sh
for last; do :; done
case " $* " in
  *" -version "*)
    echo "ffmpeg version stub"
    exit 0
    ;;
  *" -f null "*)
    echo "frame=   10 fps=0.0 q=-1.0 Lsize=N/A" >&2
    exit 0
    ;;
  *broken*)
    echo "Invalid data found when processing input" >&2
    exit 1
    ;;
esac
printf 'frame=   10 fps= 10 q=28.0 size=       1kB\n' >&2
printf 'encoded' > "$last"
exit 0
"#;

/// Reports one status line, then hangs until killed
pub const HANGING_ENCODER: &str = r#"#!/bin/sh
for last; do :; done
case " $* " in
  *" -version "*)
    echo "ffmpeg version stub"
    exit 0
    ;;
  *" -f null "*)
    echo "frame=  500 fps=0.0 q=-1.0 Lsize=N/A" >&2
    exit 0
    ;;
esac
printf 'partial' > "$last"
printf 'frame=    5 fps=  5 q=28.0 size=       1kB\r' >&2
exec sleep 30
"#;

/// Write an executable stub encoder script into `dir`
#[cfg(unix)]
pub fn install_encoder(dir: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    wait_until_executable(&path);
    path
}

/// A script that was just written can briefly fail with ETXTBSY while
/// another test thread forks. Spin until it runs.
#[cfg(unix)]
fn wait_until_executable(path: &Path) {
    const ETXTBSY: i32 = 26;
    for _ in 0..50 {
        match Command::new(path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Err(e) if e.raw_os_error() == Some(ETXTBSY) => {
                thread::sleep(Duration::from_millis(20))
            }
            _ => return,
        }
    }
}

/// Create a fake source video with some content
pub fn write_source(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"original video bytes").unwrap();
    path
}

/// Files in `dir` other than the stub encoder, sorted by name
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != "fake-ffmpeg")
        .collect();
    names.sort();
    names
}

/// Collects every event a job emits
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<JobEvent>,
}

impl ProgressSink for Recorder {
    fn on_event(&mut self, event: &JobEvent) {
        self.events.push(event.clone());
    }
}

impl Recorder {
    pub fn states(&self) -> Vec<JobState> {
        self.events
            .iter()
            .filter_map(|e| match e {
                JobEvent::StateChanged { state, .. } => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<(u64, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                JobEvent::Progress {
                    frames_done,
                    total_frames,
                    ..
                } => Some((*frames_done, *total_frames)),
                _ => None,
            })
            .collect()
    }
}
