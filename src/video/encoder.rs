//! Encoder adapter writing ordered composited frames to FFmpeg.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Stdio};

use image::RgbImage;

use crate::config::QualityTier;
use crate::error::{CursorFlowError, CursorFlowResult};

use super::ffmpeg::{create_hidden_command, find_ffmpeg};

/// Opaque sink for ordered composited frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> CursorFlowResult<()>;

    /// Flush and finalize the output. Must be called exactly once; an
    /// abnormal encoder exit is fatal and leaves no partial output behind.
    fn finish(self: Box<Self>) -> CursorFlowResult<()>;
}

/// FFmpeg/libx264 encoder fed raw rgb24 frames over stdin.
pub struct FfmpegEncoder {
    process: Option<Child>,
    stdin: Option<ChildStdin>,
    output_path: PathBuf,
    frames_written: u64,
}

impl FfmpegEncoder {
    /// Spawn the encoder for a `width` x `height` input at `fps`.
    ///
    /// Odd output dimensions are decremented by one per axis for yuv420p
    /// compatibility; the input frames keep their original size and ffmpeg
    /// scales.
    pub fn start(
        output_path: &Path,
        width: u32,
        height: u32,
        fps: u32,
        quality: QualityTier,
    ) -> CursorFlowResult<Self> {
        let ffmpeg_path = find_ffmpeg().ok_or(CursorFlowError::FfmpegNotFound)?;

        let (out_width, out_height) = even_dimensions(width, height);

        log::info!(
            "[EXPORT] Encoder: libx264 (preset: {}, crf: {}), {}x{} @ {} fps -> {}",
            quality.preset(),
            quality.crf(),
            out_width,
            out_height,
            fps,
            output_path.display()
        );

        let mut process = create_hidden_command(&ffmpeg_path)
            .args([
                "-y",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", width, height),
                "-r",
                &fps.to_string(),
                "-i",
                "-",
                "-vf",
                &format!("scale={}:{}", out_width, out_height),
                "-c:v",
                "libx264",
                "-preset",
                quality.preset(),
                "-crf",
                &quality.crf().to_string(),
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
                &output_path.to_string_lossy(),
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CursorFlowError::EncodingFailed(format!("failed to start FFmpeg: {}", e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| CursorFlowError::EncodingFailed("no encoder stdin".to_string()))?;

        Ok(Self {
            process: Some(process),
            stdin: Some(stdin),
            output_path: output_path.to_path_buf(),
            frames_written: 0,
        })
    }

    fn discard_partial_output(&self) {
        if self.output_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.output_path) {
                log::warn!(
                    "[EXPORT] Could not remove partial output {}: {}",
                    self.output_path.display(),
                    e
                );
            }
        }
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, frame: &RgbImage) -> CursorFlowResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CursorFlowError::EncodingFailed("encoder already closed".to_string()))?;

        if let Err(e) = stdin.write_all(frame.as_raw()) {
            self.discard_partial_output();
            return Err(CursorFlowError::EncodingFailed(format!(
                "FFmpeg write failed: {}",
                e
            )));
        }
        self.frames_written += 1;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> CursorFlowResult<()> {
        // Close stdin to signal EOF, then wait for the encoder to finalize.
        drop(self.stdin.take());

        let process = self
            .process
            .take()
            .ok_or_else(|| CursorFlowError::EncodingFailed("encoder already closed".to_string()))?;
        let output = process
            .wait_with_output()
            .map_err(|e| CursorFlowError::EncodingFailed(format!("wait failed: {}", e)))?;

        if !output.status.success() {
            self.discard_partial_output();
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(5)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(CursorFlowError::EncodingFailed(format!(
                "FFmpeg exited with {}: {}",
                output.status, tail
            )));
        }

        log::info!(
            "[EXPORT] Encoded {} frames to {}",
            self.frames_written,
            self.output_path.display()
        );
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}

/// Decrement each odd axis by one; yuv420p requires even dimensions.
fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width - (width % 2), height - (height % 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_dimensions() {
        assert_eq!(even_dimensions(1920, 1080), (1920, 1080));
        assert_eq!(even_dimensions(1921, 1080), (1920, 1080));
        assert_eq!(even_dimensions(1920, 1081), (1920, 1080));
        assert_eq!(even_dimensions(641, 481), (640, 480));
    }
}
