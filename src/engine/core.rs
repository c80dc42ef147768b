mod error;
mod ffmpeg_cmd;
mod ffmpeg_info;
mod log;
mod place;
mod profile;
mod scan;
mod types;

pub use error::JobError;
pub use ffmpeg_cmd::{
    DEFAULT_ENCODER, JobDriver, build_encode_cmd, format_cmd, read_status_lines,
};
pub use ffmpeg_info::{
    build_probe_cmd, ffmpeg_version, null_output_target, parse_frame_count, probe_frame_count,
};
pub use log::{DEBUG_LOG_NAME, DebugLog};
pub use place::{
    DEFAULT_RETRY_DELAY, FileOps, Placer, RealFs, Sleeper, ThreadSleeper, free_target, is_locked,
    with_suffix_and_extension,
};
pub use profile::{Codec, EncodingProfile, RenamePolicy, ScaleTarget, VideoCodec};
pub use scan::{VIDEO_EXTENSIONS, collect_inputs, is_video_file, scan};
pub use types::{
    JobEvent, JobState, ProgressParser, ProgressSink, TranscodeJob, parse_frame_field,
};
