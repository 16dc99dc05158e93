//! Sequential frame source backed by an FFmpeg decode process.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Stdio};

use image::RgbImage;

use crate::error::{CursorFlowError, CursorFlowResult};

use super::ffmpeg::{create_hidden_command, find_ffmpeg};
use super::probe::VideoMetadata;

/// One decoded video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Sequence index, starting at 0.
    pub index: u32,
    pub image: RgbImage,
}

/// Sequential decoder yielding ordered raw frames plus stream metadata.
///
/// The pipeline is strictly sequential: frame N is fully consumed before
/// frame N+1 is requested.
pub trait FrameSource {
    fn metadata(&self) -> &VideoMetadata;

    /// Next frame in order, or `None` at end of stream.
    fn next_frame(&mut self) -> CursorFlowResult<Option<Frame>>;
}

/// FFmpeg-backed frame source decoding raw rgb24 over a child-process pipe.
pub struct FfmpegFrameSource {
    process: Child,
    metadata: VideoMetadata,
    current_frame: u32,
    frame_size: usize,
}

impl FfmpegFrameSource {
    /// Probe the input and start a decode process.
    pub fn open(path: &Path) -> CursorFlowResult<Self> {
        let metadata = VideoMetadata::from_file(path)?;
        let ffmpeg_path = find_ffmpeg().ok_or(CursorFlowError::FfmpegNotFound)?;

        log::info!(
            "[DECODE] Starting: {} {}x{} @ {} fps, ~{} frames",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.frame_count
        );

        let process = create_hidden_command(&ffmpeg_path)
            .args([
                "-i",
                &path.to_string_lossy(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                CursorFlowError::InputUnreadable(format!("failed to start FFmpeg: {}", e))
            })?;

        let frame_size = (metadata.width * metadata.height * 3) as usize;

        Ok(Self {
            process,
            metadata,
            current_frame: 0,
            frame_size,
        })
    }
}

impl FrameSource for FfmpegFrameSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> CursorFlowResult<Option<Frame>> {
        let stdout = self
            .process
            .stdout
            .as_mut()
            .ok_or_else(|| CursorFlowError::DecodeError("no decoder stdout".to_string()))?;

        let mut buffer = vec![0u8; self.frame_size];
        match stdout.read_exact(&mut buffer) {
            Ok(()) => {
                let image = RgbImage::from_raw(self.metadata.width, self.metadata.height, buffer)
                    .ok_or_else(|| {
                        CursorFlowError::DecodeError("frame buffer size mismatch".to_string())
                    })?;
                let frame = Frame {
                    index: self.current_frame,
                    image,
                };
                self.current_frame += 1;
                Ok(Some(frame))
            },
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                log::debug!("[DECODE] End of stream after {} frames", self.current_frame);
                Ok(None)
            },
            Err(e) => Err(CursorFlowError::DecodeError(format!("read error: {}", e))),
        }
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
