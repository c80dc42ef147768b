use crate::cli::{Cli, Commands, OPTION_MARKER, split_inputs};
use ffcrush::engine::{self, EncodingProfile, JobError, VideoCodec};
use ffcrush::interrupt::{self, EXIT_INTERRUPTED, InterruptState};
use ffcrush::{config, lock, ui};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::Level;

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config() -> config::Config {
    match config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("Using default config: {:#}", e);
            config::Config::default()
        }
    }
}

pub fn run(cli: Cli) {
    init_logging(cli.verbose);

    // Handle subcommands first
    if let Some(command) = cli.command {
        let cfg = load_config();
        match command {
            Commands::CheckFfmpeg => handle_check_ffmpeg(&cfg),
            Commands::Probe { file } => handle_probe(&cfg, file),
            Commands::DryRun { inputs } => handle_dry_run(&cfg, &inputs),
            Commands::Profile { options } => handle_profile(&cfg, options),
            Commands::InitConfig => handle_init_config(),
        }
        return;
    }

    let cfg = load_config();
    let (options, paths) = split_inputs(&cli.inputs);
    if paths.is_empty() && cli.no_prompt {
        eprintln!(
            "Error: no paths given. Pass files or directories ('.' for the current directory)"
        );
        process::exit(1);
    }

    let profile = resolve_profile(&cfg, options.as_deref(), cli.no_prompt);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let sources = match gather_sources(&paths, &cwd) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("Error scanning inputs: {:#}", e);
            process::exit(1);
        }
    };
    if sources.is_empty() {
        println!("No video files found");
        process::exit(0);
    }
    if paths.is_empty() && !confirm_directory_batch(&cwd, &sources) {
        println!("Nothing compressed");
        process::exit(1);
    }

    let lock_guard = if cfg.run.lock_file {
        match lock::LockGuard::acquire(&cwd) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                process::exit(1);
            }
        }
    } else {
        None
    };

    let abort = Arc::new(AtomicBool::new(false));
    let mut interrupt_state = InterruptState::new(Arc::clone(&abort));
    if let Some(guard) = &lock_guard {
        interrupt_state = interrupt_state.with_lock_path(guard.path().to_path_buf());
    }
    if let Err(e) = interrupt::install(interrupt_state) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let mut driver = engine::JobDriver::new(cfg.encoder.program.clone())
        .with_placer(engine::Placer::new(cfg.run.placement_retry_delay()))
        .with_abort_flag(abort);
    if cfg.run.debug_log {
        driver = driver.with_debug_log(engine::DebugLog::in_dir(&cwd));
    }

    let mut console = ui::ConsoleProgress::stdout();
    let runner = engine::BatchRunner::new(&driver, &profile);
    let code = match runner.run(&sources, &mut console) {
        Ok(summary) => {
            println!();
            println!(
                "Done: {} compressed, {} failed",
                summary.completed.len(),
                summary.failed.len()
            );
            for (source, _) in &summary.failed {
                println!("  ✗ {}", source.display());
            }
            0
        }
        Err(JobError::Interrupted) => {
            eprintln!("Interrupted");
            EXIT_INTERRUPTED
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    // process::exit skips destructors
    drop(lock_guard);
    process::exit(code);
}

fn gather_sources(paths: &[PathBuf], cwd: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if paths.is_empty() {
        return engine::collect_inputs(&[cwd.to_path_buf()]);
    }
    engine::collect_inputs(paths)
}

/// Without explicit paths every video under the working directory would be
/// replaced: list them and ask first
fn confirm_directory_batch(cwd: &Path, sources: &[PathBuf]) -> bool {
    println!("No paths given, found under {}:", cwd.display());
    for source in sources {
        println!("  {}", source.strip_prefix(cwd).unwrap_or(source).display());
    }
    ui::LinePrompter::stdio().confirm(&format!("Compress these {} file(s)?", sources.len()))
}

/// Decode the option string, or offer to type one when none was given
fn resolve_profile(
    cfg: &config::Config,
    options: Option<&str>,
    no_prompt: bool,
) -> EncodingProfile {
    let defaults = cfg.defaults.profile();

    let options = match options {
        Some(options) => Some(options.to_string()),
        None => {
            println!("Default parameters: {}", defaults.display_command());
            if no_prompt {
                None
            } else {
                let timeout = cfg.defaults.prompt_timeout();
                println!(
                    "Press any key within {}s to customize...",
                    timeout.as_secs()
                );
                match ui::wait_for_key(timeout) {
                    Ok(true) => {
                        println!("{}", engine::params::usage());
                        ui::LinePrompter::stdio().read_line("Options: ")
                    }
                    Ok(false) => None,
                    Err(e) => {
                        tracing::warn!("Key wait failed, using defaults: {}", e);
                        None
                    }
                }
            }
        }
    };

    let profile = match options {
        Some(options) => {
            let options = options.trim_start_matches(OPTION_MARKER);
            let profile = engine::decode(options, &defaults, &mut ui::LinePrompter::stdio());
            println!("New parameters: {}", profile.display_command());
            profile
        }
        None => defaults,
    };

    if profile.custom_command.is_none()
        && profile.video_codec() == VideoCodec::Software(engine::Codec::Av1)
    {
        tracing::warn!(
            "libaom-av1 software encoding is very slow, consider 'h' for hardware acceleration"
        );
    }

    profile
}

fn handle_check_ffmpeg(cfg: &config::Config) {
    match engine::ffmpeg_version(&cfg.encoder.program) {
        Ok(version) => {
            println!("{} found: {}", cfg.encoder.program, version);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_probe(cfg: &config::Config, file: PathBuf) {
    match engine::probe_frame_count(&cfg.encoder.program, &file) {
        Ok(frames) => {
            println!("Frames: {}", frames);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_dry_run(cfg: &config::Config, inputs: &[PathBuf]) {
    let (options, paths) = split_inputs(inputs);
    let defaults = cfg.defaults.profile();
    let profile = match options {
        Some(options) => engine::decode(&options, &defaults, &mut engine::NoPrompt),
        None => defaults,
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match gather_sources(&paths, &cwd) {
        Ok(sources) => {
            println!("Dry run: {} file(s)", sources.len());
            for source in sources {
                let job = engine::TranscodeJob::new(source, &profile.extension);
                let cmd = engine::build_encode_cmd(&cfg.encoder.program, &job, &profile);
                println!("{}", engine::format_cmd(&cmd));
            }
        }
        Err(e) => {
            eprintln!("Error scanning inputs: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_profile(cfg: &config::Config, options: Option<String>) {
    let defaults = cfg.defaults.profile();
    let profile = match options {
        Some(options) => engine::decode(
            options.trim_start_matches(OPTION_MARKER),
            &defaults,
            &mut engine::NoPrompt,
        ),
        None => defaults,
    };

    match serde_json::to_string_pretty(&profile) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_init_config() {
    match config::Config::load() {
        Ok(cfg) => {
            match config::Config::config_path() {
                Ok(path) => println!("Config loaded successfully from {}", path.display()),
                Err(e) => println!("Config loaded, but config path unknown: {:#}", e),
            }
            println!("{:#?}", cfg);
        }
        Err(e) => {
            println!("Config missing or invalid: {:#}", e);
            println!("Creating default config...");

            let cfg = config::Config::default();
            if let Err(err) = cfg.save() {
                eprintln!("Failed to save default config: {:#}", err);
                process::exit(1);
            }
            match config::Config::config_path() {
                Ok(path) => println!("Default config saved to {}", path.display()),
                Err(e) => println!("Default config saved (path unknown): {:#}", e),
            }
        }
    }
}
