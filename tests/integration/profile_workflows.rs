// Option strings and config defaults resolved into encoder commands

use ffcrush::config::{Config, DefaultsConfig};
use ffcrush::engine::{
    Codec, EncodingProfile, NoPrompt, Prompter, RenamePolicy, ScaleTarget, TranscodeJob,
    build_encode_cmd, collect_inputs, decode, format_cmd,
};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Replays canned answers in order
struct Scripted(VecDeque<&'static str>);

impl Prompter for Scripted {
    fn ask(&mut self, _question: &str, _current: &str) -> Option<String> {
        self.0.pop_front().map(str::to_string)
    }
}

fn args_of(profile: &EncodingProfile) -> Vec<String> {
    let job = TranscodeJob::new(PathBuf::from("/videos/in.mkv"), &profile.extension);
    build_encode_cmd("ffmpeg", &job, profile)
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_hardware_hevc_workflow() {
    let profile = decode("HEhn24HD", &EncodingProfile::default(), &mut NoPrompt);

    assert_eq!(profile.codec, Codec::Hevc);
    assert_eq!(profile.quality, 24);
    assert_eq!(profile.scale, Some(ScaleTarget::Hd));
    assert_eq!(profile.rename_policy, RenamePolicy::keep_original());

    let args = args_of(&profile);
    assert_eq!(
        &args[..7],
        &[
            "-hwaccel",
            "cuda",
            "-hwaccel_output_format",
            "cuda",
            "-y",
            "-i",
            "/videos/in.mkv"
        ]
    );
    assert_eq!(
        &args[7..args.len() - 1],
        &[
            "-vcodec",
            "hevc_nvenc",
            "-acodec",
            "aac",
            "-cq:v",
            "24",
            "-vf",
            "scale_cuda=-1:720"
        ]
    );
    assert!(args[args.len() - 1].starts_with("/videos/"));
    assert!(args[args.len() - 1].ends_with(".mp4"));
}

#[test]
fn test_av1_software_filters_workflow() {
    let profile = decode("AVfaSD40", &EncodingProfile::default(), &mut NoPrompt);

    assert_eq!(
        profile.command_line(),
        "-vcodec libaom-av1 -acodec aac -crf 40 -vf scale=-1:480,fps=30 -af loudnorm"
    );
    assert!(profile.input_args().is_empty());
}

#[test]
fn test_custom_command_workflow() {
    let mut prompter = Scripted(VecDeque::from([".mkv", "-c:v copy -metadata title='My clip'"]));
    let profile = decode("hc", &EncodingProfile::default(), &mut prompter);

    assert_eq!(profile.extension, "mkv");
    assert!(profile.input_args().is_empty());

    let args = args_of(&profile);
    assert_eq!(&args[..3], &["-y", "-i", "/videos/in.mkv"]);
    assert_eq!(
        &args[3..args.len() - 1],
        &["-c:v", "copy", "-metadata", "title=My clip"]
    );
    assert!(args[args.len() - 1].ends_with(".mkv"));
}

#[test]
fn test_config_defaults_feed_decoder() {
    let defaults = DefaultsConfig {
        codec: Codec::Hevc,
        quality: 30,
        keep_original: true,
        ..DefaultsConfig::default()
    };
    let base = defaults.profile();

    let unchanged = decode("", &base, &mut NoPrompt);
    assert_eq!(unchanged, base);

    let av1 = decode("AV55", &base, &mut NoPrompt);
    assert_eq!(av1.codec, Codec::Av1);
    assert_eq!(av1.quality, 55);
    assert_eq!(av1.rename_policy, RenamePolicy::keep_original());
}

#[test]
fn test_config_file_overrides() {
    let config: Config = toml::from_str(
        r#"
[encoder]
program = "/opt/ffmpeg/bin/ffmpeg"

[defaults]
codec = "av1"
hardware_acceleration = true

[run]
lock_file = true
"#,
    )
    .unwrap();

    assert_eq!(config.encoder.program, "/opt/ffmpeg/bin/ffmpeg");
    assert!(config.run.lock_file);
    assert_eq!(
        config.defaults.profile().command_line(),
        "-vcodec av1_nvenc -acodec aac -cq:v 24"
    );
}

#[test]
fn test_dry_run_command_is_shell_safe() {
    let profile = decode("n", &EncodingProfile::default(), &mut NoPrompt);
    let job = TranscodeJob::new(PathBuf::from("/videos/my clip.mkv"), &profile.extension);
    let line = format_cmd(&build_encode_cmd("ffmpeg", &job, &profile));

    let split = shlex::split(&line).unwrap();
    assert_eq!(split[0], "ffmpeg");
    assert!(split.contains(&"/videos/my clip.mkv".to_string()));
}

#[test]
fn test_collect_inputs_mixes_files_and_dirs() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("season 1");
    fs::create_dir_all(&nested).unwrap();
    for name in ["b.mkv", "a.MP4", "notes.txt"] {
        fs::write(nested.join(name), b"x").unwrap();
    }
    let single = dir.path().join("single.webm");
    fs::write(&single, b"x").unwrap();
    let ignored = dir.path().join("cover.jpg");
    fs::write(&ignored, b"x").unwrap();

    let inputs = collect_inputs(&[
        nested.clone(),
        single.clone(),
        ignored,
        dir.path().join("missing.mkv"),
    ])
    .unwrap();

    assert_eq!(
        inputs,
        vec![nested.join("a.MP4"), nested.join("b.mkv"), single]
    );
}
