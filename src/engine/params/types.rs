/// Token table for the option mini-language.
///
/// Every token is a case-sensitive substring check against the whole option
/// string. Tokens are independent of each other and of their position, but
/// they are applied in table order: the codec must be known before the
/// quality digits are range-checked, and the custom command prompt shows the
/// command rendered from everything before it.
use crate::engine::core::ScaleTarget;
use std::fmt;

/// One entry of the mini-language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `HE` selects HEVC
    Hevc,
    /// `AV` selects AV1, overriding `HE`
    Av1,
    /// All decimal digits, concatenated, as the quality value
    Quality,
    /// `f` appends a fixed frame rate filter
    FixedFrameRate,
    /// `a` appends loudness normalization
    NormalizeAudio,
    /// `h` switches to the CUDA/NVENC path
    HardwareAcceleration,
    /// `FHD`, `HD` or `SD`, first match wins
    Scale,
    /// `n` keeps the source and writes a suffixed copy
    KeepOriginal,
    /// `c` asks for a custom extension and command
    CustomCommand,
}

/// Application order
pub const TOKEN_TABLE: &[Token] = &[
    Token::Hevc,
    Token::Av1,
    Token::Quality,
    Token::FixedFrameRate,
    Token::NormalizeAudio,
    Token::HardwareAcceleration,
    Token::Scale,
    Token::KeepOriginal,
    Token::CustomCommand,
];

/// Scale literals in priority order (`HD` is a substring of `FHD`)
pub const SCALE_TOKENS: &[(&str, ScaleTarget)] = &[
    ("FHD", ScaleTarget::Fhd),
    ("HD", ScaleTarget::Hd),
    ("SD", ScaleTarget::Sd),
];

pub const FIXED_FRAME_RATE_FILTER: &str = "fps=30";
pub const NORMALIZE_AUDIO_FILTER: &str = "loudnorm";

impl Token {
    /// Literal substring for simple tokens
    pub fn literal(self) -> Option<&'static str> {
        match self {
            Token::Hevc => Some("HE"),
            Token::Av1 => Some("AV"),
            Token::FixedFrameRate => Some("f"),
            Token::NormalizeAudio => Some("a"),
            Token::HardwareAcceleration => Some("h"),
            Token::KeepOriginal => Some("n"),
            Token::CustomCommand => Some("c"),
            Token::Quality | Token::Scale => None,
        }
    }

    /// One-line help text
    pub fn description(self) -> &'static str {
        match self {
            Token::Hevc => "HEVC/h265 (default h264)",
            Token::Av1 => "AV1",
            Token::Quality => "CRF value, 0-50 (0-62 for AV1)",
            Token::FixedFrameRate => "set framerate to 30fps",
            Token::NormalizeAudio => "normalize audio",
            Token::HardwareAcceleration => "hardware acceleration (CUDA)",
            Token::Scale => "rescale to 1080p, 720p or 480p",
            Token::KeepOriginal => "create a new file instead of replacing the source",
            Token::CustomCommand => "set a custom extension and command",
        }
    }

    pub fn matches(self, options: &str) -> bool {
        match self {
            Token::Quality => options.chars().any(|c| c.is_ascii_digit()),
            Token::Scale => scale_target(options).is_some(),
            _ => self.literal().is_some_and(|lit| options.contains(lit)),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Quality => write!(f, "0-9"),
            Token::Scale => write!(f, "FHD/HD/SD"),
            other => write!(f, "{}", other.literal().unwrap_or_default()),
        }
    }
}

/// Resolve the scale token, honoring priority order
pub fn scale_target(options: &str) -> Option<ScaleTarget> {
    SCALE_TOKENS
        .iter()
        .find(|(lit, _)| options.contains(lit))
        .map(|(_, target)| *target)
}

/// Every ASCII digit in the string, concatenated, parsed as an integer.
/// Returns `None` when there are no digits or the number overflows.
pub fn quality_digits(options: &str) -> Option<u32> {
    let digits: String = options.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
