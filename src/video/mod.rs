//! Video I/O: ffmpeg discovery, metadata probing, frame decoding, encoding.

pub mod decoder;
pub mod encoder;
pub mod ffmpeg;
pub mod probe;

pub use decoder::{FfmpegFrameSource, Frame, FrameSource};
pub use encoder::{FfmpegEncoder, FrameSink};
pub use ffmpeg::{find_ffmpeg, find_ffprobe};
pub use probe::VideoMetadata;
