/// Option mini-language decoder.
///
/// Turns a short user-typed string such as `HEhn24HD` into a fully resolved
/// [`EncodingProfile`]. Decoding never fails: characters that are not part of
/// any token are ignored, and an out-of-range quality value keeps the default.
pub mod types;

pub use types::{SCALE_TOKENS, TOKEN_TABLE, Token, quality_digits, scale_target};

use crate::engine::core::{Codec, EncodingProfile, RenamePolicy};
use types::{FIXED_FRAME_RATE_FILTER, NORMALIZE_AUDIO_FILTER};

/// Interactive collaborator used by the `c` token
pub trait Prompter {
    /// Ask a question showing the current value. `None` means no answer.
    fn ask(&mut self, question: &str, current: &str) -> Option<String>;
}

/// Prompter that never answers (non-interactive runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn ask(&mut self, _question: &str, _current: &str) -> Option<String> {
        None
    }
}

/// Decode an option string on top of `defaults`
pub fn decode(
    options: &str,
    defaults: &EncodingProfile,
    prompter: &mut dyn Prompter,
) -> EncodingProfile {
    let mut profile = defaults.clone();

    for token in TOKEN_TABLE.iter().copied() {
        if token.matches(options) {
            apply(token, options, &mut profile, prompter);
        }
    }

    profile.finalize()
}

fn apply(
    token: Token,
    options: &str,
    profile: &mut EncodingProfile,
    prompter: &mut dyn Prompter,
) {
    match token {
        Token::Hevc => profile.codec = Codec::Hevc,
        Token::Av1 => profile.codec = Codec::Av1,
        Token::Quality => {
            if let Some(quality) = quality_digits(options) {
                if quality < profile.codec.max_quality() {
                    profile.quality = quality;
                }
            }
        }
        Token::FixedFrameRate => profile
            .video_filters
            .push(FIXED_FRAME_RATE_FILTER.to_string()),
        Token::NormalizeAudio => profile
            .audio_filters
            .push(NORMALIZE_AUDIO_FILTER.to_string()),
        Token::HardwareAcceleration => profile.hardware_acceleration = true,
        Token::Scale => profile.scale = scale_target(options),
        Token::KeepOriginal => profile.rename_policy = RenamePolicy::keep_original(),
        Token::CustomCommand => apply_custom(profile, prompter),
    }
}

/// Single-character answers are treated as "keep current"
fn apply_custom(profile: &mut EncodingProfile, prompter: &mut dyn Prompter) {
    if let Some(extension) = prompter.ask("Video final extension", &profile.extension) {
        let extension = extension.trim().trim_start_matches('.');
        if extension.len() > 1 {
            profile.extension = extension.to_string();
        }
    }

    let current = profile.command_line();
    if let Some(command) = prompter.ask("Command", &current) {
        let command = command.trim();
        if command.len() > 1 {
            profile.custom_command = Some(command.to_string());
        }
    }
}

/// Help text listing the tokens
pub fn usage() -> String {
    let mut lines: Vec<String> = TOKEN_TABLE
        .iter()
        .map(|token| format!("  {:<10}{}", token.to_string(), token.description()))
        .collect();
    lines.push(String::new());
    lines.push("Tokens combine, for example HEhn24HD".to_string());
    lines.push(
        "24 is good HD quality and 42 is acceptable SD quality for h264 and HEVC".to_string(),
    );
    lines.join("\n")
}
