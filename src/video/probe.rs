//! Video metadata via ffprobe.

use std::path::Path;

use crate::error::{CursorFlowError, CursorFlowResult};

use super::ffmpeg::{create_hidden_command, find_ffprobe};

/// Stream-level metadata for a video file.
#[derive(Debug, Clone, Copy)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Frames per second, rounded to an integer rate.
    pub fps: u32,
    pub duration_ms: u64,
    /// Total frame count, derived from duration and fps when the container
    /// does not carry it.
    pub frame_count: u32,
}

impl VideoMetadata {
    /// Probe a video file with ffprobe.
    ///
    /// Any probe failure (missing file, unreadable container, no video
    /// stream) is `InputUnreadable`, surfaced before any per-frame work.
    pub fn from_file(path: &Path) -> CursorFlowResult<Self> {
        let ffprobe_path = find_ffprobe().ok_or(CursorFlowError::FfmpegNotFound)?;

        let output = create_hidden_command(&ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .output()
            .map_err(|e| CursorFlowError::InputUnreadable(format!("ffprobe failed: {}", e)))?;

        if !output.status.success() {
            return Err(CursorFlowError::InputUnreadable(
                path.to_string_lossy().to_string(),
            ));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| CursorFlowError::InputUnreadable(format!("bad ffprobe output: {}", e)))?;

        let stream = json["streams"]
            .as_array()
            .and_then(|s| s.first())
            .ok_or_else(|| {
                CursorFlowError::InputUnreadable(format!(
                    "no video stream in {}",
                    path.to_string_lossy()
                ))
            })?;

        let width = stream["width"].as_u64().unwrap_or(0) as u32;
        let height = stream["height"].as_u64().unwrap_or(0) as u32;
        if width == 0 || height == 0 {
            return Err(CursorFlowError::InputUnreadable(format!(
                "zero-sized video stream in {}",
                path.to_string_lossy()
            )));
        }

        let duration_secs = json["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        let duration_ms = (duration_secs * 1000.0) as u64;

        let fps_str = stream["r_frame_rate"]
            .as_str()
            .or_else(|| stream["avg_frame_rate"].as_str())
            .unwrap_or("30/1");
        let fps = parse_frame_rate(fps_str);

        let frame_count = stream["nb_frames"]
            .as_str()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or_else(|| (duration_secs * fps as f64).ceil() as u32);

        Ok(Self {
            width,
            height,
            fps,
            duration_ms,
            frame_count,
        })
    }
}

/// Parse an ffprobe frame rate ("30/1", "30000/1001", or plain "29.97").
/// Zero or missing rates fall back to 30.
fn parse_frame_rate(fps_str: &str) -> u32 {
    let fps = if let Some((num, den)) = fps_str.split_once('/') {
        let n: f64 = num.parse().unwrap_or(30.0);
        let d: f64 = den.parse().unwrap_or(1.0);
        if d > 0.0 {
            (n / d).round()
        } else {
            30.0
        }
    } else {
        fps_str.parse::<f64>().unwrap_or(30.0).round()
    };

    if fps < 1.0 {
        30
    } else {
        fps as u32
    }
}
