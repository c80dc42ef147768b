use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware init flags for the CUDA path. These are input options and must
/// come before `-i`.
const CUDA_INIT_ARGS: &[&str] = &["-hwaccel", "cuda", "-hwaccel_output_format", "cuda"];

const AUDIO_CODEC: &str = "aac";

/// Codec family selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    H264,
    Hevc,
    Av1,
}

impl Codec {
    /// Exclusive upper bound for the quality value
    pub fn max_quality(self) -> u32 {
        match self {
            Codec::Av1 => 63,
            Codec::H264 | Codec::Hevc => 51,
        }
    }
}

/// Concrete encoder after hardware acceleration has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    Software(Codec),
    Nvenc(Codec),
}

impl VideoCodec {
    pub fn encoder_name(self) -> &'static str {
        match self {
            VideoCodec::Software(Codec::H264) => "h264",
            VideoCodec::Software(Codec::Hevc) => "libx265",
            VideoCodec::Software(Codec::Av1) => "libaom-av1",
            VideoCodec::Nvenc(Codec::H264) => "h264_nvenc",
            VideoCodec::Nvenc(Codec::Hevc) => "hevc_nvenc",
            VideoCodec::Nvenc(Codec::Av1) => "av1_nvenc",
        }
    }

    pub fn is_hardware(self) -> bool {
        matches!(self, VideoCodec::Nvenc(_))
    }

    /// Flag carrying the quality value (`-crf` for software, `-cq:v` for NVENC)
    pub fn quality_flag(self) -> &'static str {
        if self.is_hardware() { "-cq:v" } else { "-crf" }
    }

    /// Name of the scale filter matching the frame location (CPU or GPU memory)
    pub fn scale_filter(self) -> &'static str {
        if self.is_hardware() {
            "scale_cuda"
        } else {
            "scale"
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encoder_name())
    }
}

/// Output height presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleTarget {
    Sd,
    Hd,
    Fhd,
}

impl ScaleTarget {
    pub fn height(self) -> u32 {
        match self {
            ScaleTarget::Sd => 480,
            ScaleTarget::Hd => 720,
            ScaleTarget::Fhd => 1080,
        }
    }

    /// Filter expression keeping the aspect ratio: width derived, height fixed.
    /// Both the CPU and CUDA scalers take `w:h`, so the axis order is the same.
    pub fn filter(self, codec: VideoCodec) -> String {
        format!("{}=-1:{}", codec.scale_filter(), self.height())
    }
}

/// What happens to the source file after a successful encode
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RenamePolicy {
    #[default]
    ReplaceInPlace,
    KeepOriginal { suffix: String },
}

impl RenamePolicy {
    pub fn keep_original() -> Self {
        RenamePolicy::KeepOriginal {
            suffix: "_copy".to_string(),
        }
    }
}

/// Fully resolved encoding settings, built once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingProfile {
    pub codec: Codec,
    pub quality: u32,
    pub scale: Option<ScaleTarget>,
    #[serde(default)]
    pub video_filters: Vec<String>,
    #[serde(default)]
    pub audio_filters: Vec<String>,
    pub hardware_acceleration: bool,
    pub extension: String,
    pub rename_policy: RenamePolicy,
    /// Raw argument string replacing everything rendered from the fields above
    #[serde(default)]
    pub custom_command: Option<String>,
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self {
            codec: Codec::H264,
            quality: 24,
            scale: None,
            video_filters: Vec::new(),
            audio_filters: Vec::new(),
            hardware_acceleration: false,
            extension: "mp4".to_string(),
            rename_policy: RenamePolicy::ReplaceInPlace,
            custom_command: None,
        }
    }
}

impl EncodingProfile {
    pub fn video_codec(&self) -> VideoCodec {
        if self.hardware_acceleration {
            VideoCodec::Nvenc(self.codec)
        } else {
            VideoCodec::Software(self.codec)
        }
    }

    /// Clamp the quality value into `[0, max)` for the resolved codec
    pub fn finalize(mut self) -> Self {
        let max = self.codec.max_quality();
        if self.quality >= max {
            self.quality = max - 1;
        }
        self
    }

    /// Arguments that must precede the input file
    pub fn input_args(&self) -> Vec<String> {
        if self.custom_command.is_some() || !self.hardware_acceleration {
            return Vec::new();
        }
        CUDA_INIT_ARGS.iter().map(|s| s.to_string()).collect()
    }

    /// Main flag set, rendered as one string and later split with shell rules.
    ///
    /// Order: video codec, audio codec, quality, video filter chain (scale
    /// first), audio filter chain.
    pub fn command_line(&self) -> String {
        if let Some(custom) = &self.custom_command {
            return custom.clone();
        }

        let codec = self.video_codec();
        let mut parts = vec![
            format!("-vcodec {}", codec.encoder_name()),
            format!("-acodec {}", AUDIO_CODEC),
            format!("{} {}", codec.quality_flag(), self.quality),
        ];

        let mut video_chain: Vec<String> = Vec::new();
        if let Some(scale) = self.scale {
            video_chain.push(scale.filter(codec));
        }
        video_chain.extend(self.video_filters.iter().cloned());
        if !video_chain.is_empty() {
            parts.push(format!("-vf {}", video_chain.join(",")));
        }

        if !self.audio_filters.is_empty() {
            parts.push(format!("-af {}", self.audio_filters.join(",")));
        }

        parts.join(" ")
    }

    /// Human-readable summary of the flags as the encoder will see them
    pub fn display_command(&self) -> String {
        let mut parts = self.input_args();
        parts.push("-y".to_string());
        parts.push(self.command_line());
        parts.join(" ")
    }
}
