use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Marker preceding the frame count in the encoder's status output
const FRAME_MARKER: &str = "frame=";

pub fn null_output_target() -> &'static str {
    if cfg!(windows) { "NUL" } else { "/dev/null" }
}

/// Check if the encoder is available and return its version line
pub fn ffmpeg_version(program: &str) -> Result<String> {
    let output = Command::new(program)
        .arg("-version")
        .output()
        .with_context(|| format!("Failed to execute {}. Is it installed and in PATH?", program))?;

    if !output.status.success() {
        anyhow::bail!("{} -version failed with status: {}", program, output.status);
    }

    let version_output = String::from_utf8_lossy(&output.stdout);
    let first_line = version_output.lines().next().unwrap_or("Unknown version");

    Ok(first_line.to_string())
}

/// Build the throwaway decode pass used to count frames
pub fn build_probe_cmd(program: &str, path: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.arg("-hide_banner").arg("-nostdin");
    cmd.arg("-i").arg(path);
    cmd.args(["-map", "0:v:0", "-c", "copy", "-f", "null", "-y"]);
    cmd.arg(null_output_target());
    cmd
}

/// Count the frames of the first video stream by stream-copying it to the
/// null muxer. Errors when the encoder cannot be run or prints no count.
pub fn probe_frame_count(program: &str, path: &Path) -> Result<u64> {
    let output = build_probe_cmd(program, path)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute {} for probing", program))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    parse_frame_count(&text)
        .with_context(|| format!("No frame count in probe output for {}", path.display()))
}

/// Parse the number between the last `frame=` marker and the following `fps`
pub fn parse_frame_count(output: &str) -> Option<u64> {
    let start = output.rfind(FRAME_MARKER)? + FRAME_MARKER.len();
    let rest = &output[start..];
    let (number, _) = rest.split_once("fps")?;
    number.trim().parse().ok()
}
