// The ffcrush binary run without paths: the working directory is listed and
// nothing is touched unless the user says yes

use crate::common::write_source;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Run ffcrush in `work` with config kept under `home`, feeding `input` on stdin
fn run_ffcrush(work: &Path, home: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ffcrush"))
        .args(args)
        .current_dir(work)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_no_paths_without_answer_changes_nothing() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let source = write_source(work.path(), "clip.mkv");

    for input in ["", "n\n", "maybe\n"] {
        let output = run_ffcrush(work.path(), home.path(), &[], input);

        assert_eq!(output.status.code(), Some(1), "input {:?}", input);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("clip.mkv"), "{}", stdout);
        assert!(stdout.contains("Compress these 1 file(s)? [y/N]"), "{}", stdout);
        assert_eq!(
            fs::read_to_string(&source).unwrap(),
            "original video bytes"
        );
    }
    assert!(!work.path().join("clip.mp4").exists());
}

#[test]
fn test_no_paths_with_no_prompt_is_refused() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let source = write_source(work.path(), "clip.mkv");

    let output = run_ffcrush(work.path(), home.path(), &["--no-prompt"], "y\n");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no paths given"), "{}", stderr);
    assert_eq!(
        fs::read_to_string(&source).unwrap(),
        "original video bytes"
    );
}

#[cfg(unix)]
#[test]
fn test_no_paths_confirmed_compresses_directory() {
    use crate::common::{SUCCESS_ENCODER, install_encoder};

    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config").join("ffcrush");
    fs::create_dir_all(&config_dir).unwrap();
    let encoder = install_encoder(home.path(), SUCCESS_ENCODER);
    fs::write(
        config_dir.join("config.toml"),
        format!(
            "[encoder]\nprogram = {:?}\n\n[run]\ndebug_log = false\n",
            encoder.to_string_lossy()
        ),
    )
    .unwrap();
    write_source(work.path(), "clip.mkv");

    let output = run_ffcrush(work.path(), home.path(), &["+24"], "y\n");

    assert_eq!(
        output.status.code(),
        Some(0),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Done: 1 compressed, 0 failed"));
    assert_eq!(
        fs::read_to_string(work.path().join("clip.mp4")).unwrap(),
        "encoded"
    );
    assert!(!work.path().join("clip.mkv").exists());
}
