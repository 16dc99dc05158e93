//! Per-video processing passes.
//!
//! Both passes are strictly sequential and single-threaded: frame N's
//! output completes before frame N+1 is requested, because the motion and
//! continuity logic depends on the immediately preceding frame and
//! position. Independent videos may run as separate pipeline instances in
//! parallel; nothing here holds shared mutable state.

use std::path::Path;

use crate::compose::composite_glyph;
use crate::config::RenderOptions;
use crate::detect::{rgb_to_gray, DetectorBank};
use crate::error::CursorFlowResult;
use crate::glyph::{BuiltinGlyphs, GlyphProvider};
use crate::trajectory::{position_at_time, smooth_waypoints, validate_waypoints, Waypoint};
use crate::video::{FfmpegEncoder, FfmpegFrameSource, FrameSink, FrameSource};

/// Fire-and-forget progress callback taking a fraction in [0, 1].
pub type ProgressFn<'a> = dyn Fn(f32) + Send + Sync + 'a;

/// Report progress every this many frames.
const PROGRESS_CADENCE: u32 = 10;

/// Share of a render job spent compositing; encoding takes the rest.
const COMPOSITE_PROGRESS_SHARE: f32 = 0.8;

/// Smoothing factor for dense interactive traces.
pub const SMOOTH_ALPHA_INTERACTIVE: f64 = 0.35;

/// Smoothing factor for noisier detected traces.
pub const SMOOTH_ALPHA_DETECTED: f64 = 0.5;

// ============================================================================
// Known-trajectory pass
// ============================================================================

/// Render a replacement cursor onto every frame of `input`, writing the
/// encoded result to `output`.
///
/// The trajectory is validated before any per-frame work and optionally
/// smoothed. One sequential decode -> interpolate -> composite -> encode
/// pass; a failure at any point is terminal and leaves no partial output.
pub fn render_with_cursor(
    input: &Path,
    output: &Path,
    waypoints: &[Waypoint],
    options: &RenderOptions,
    progress: Option<&ProgressFn>,
) -> CursorFlowResult<()> {
    validate_waypoints(waypoints)?;

    let mut source = FfmpegFrameSource::open(input)?;
    let meta = *source.metadata();
    let sink = Box::new(FfmpegEncoder::start(
        output,
        meta.width,
        meta.height,
        meta.fps,
        options.quality,
    )?);

    render_frames(&mut source, sink, waypoints, options, progress)
}

/// Core of the render pass, generic over the frame source and sink.
pub fn render_frames(
    source: &mut dyn FrameSource,
    sink: Box<dyn FrameSink>,
    waypoints: &[Waypoint],
    options: &RenderOptions,
    progress: Option<&ProgressFn>,
) -> CursorFlowResult<()> {
    validate_waypoints(waypoints)?;

    let smoothed;
    let points: &[Waypoint] = if options.smooth && waypoints.len() > 1 {
        smoothed = smooth_waypoints(waypoints, SMOOTH_ALPHA_INTERACTIVE);
        &smoothed
    } else {
        waypoints
    };

    let glyph = BuiltinGlyphs.glyph(options.cursor_style, options.cursor_size, options.cursor_color);

    let meta = *source.metadata();
    let total = meta.frame_count.max(1);
    let mut sink = sink;
    let mut frame_idx = 0u32;

    while let Some(frame) = source.next_frame()? {
        let t = frame.index as f64 / meta.fps as f64;
        let pos = position_at_time(points, t, meta.width, meta.height);
        let composited = composite_glyph(&frame.image, &glyph, pos);
        sink.write_frame(&composited)?;

        frame_idx += 1;
        if frame_idx % PROGRESS_CADENCE == 0 {
            if let Some(report) = progress {
                report(frame_idx as f32 / total as f32 * COMPOSITE_PROGRESS_SHARE);
            }
        }
    }

    log::info!("[RENDER] Composited {} frames, finalizing encode", frame_idx);
    sink.finish()?;

    if let Some(report) = progress {
        report(1.0);
    }
    Ok(())
}

// ============================================================================
// Detection pass
// ============================================================================

/// Detect cursor positions in a video with no ground-truth coordinates.
///
/// Returns one normalized waypoint per frame where a position was
/// resolved; frames with neither a detector result nor a carried-over
/// position are omitted, never null-filled. The detected trace is
/// smoothed before being returned.
pub fn detect_cursor_positions(
    input: &Path,
    progress: Option<&ProgressFn>,
) -> CursorFlowResult<Vec<Waypoint>> {
    let mut source = FfmpegFrameSource::open(input)?;
    let bank = DetectorBank::new();
    detect_frames(&mut source, &bank, progress)
}

/// Core of the detection pass, generic over the frame source.
pub fn detect_frames(
    source: &mut dyn FrameSource,
    bank: &DetectorBank,
    progress: Option<&ProgressFn>,
) -> CursorFlowResult<Vec<Waypoint>> {
    let meta = *source.metadata();
    let total = meta.frame_count.max(1);

    let mut positions: Vec<Waypoint> = Vec::new();
    let mut prev_gray = None;
    let mut prev_position = None;
    let mut frame_idx = 0u32;

    while let Some(frame) = source.next_frame()? {
        let gray = rgb_to_gray(&frame.image);

        if let Some(pos) = bank.detect(&gray, prev_gray.as_ref(), prev_position) {
            positions.push(Waypoint {
                x: pos.x as f64 / meta.width as f64,
                y: pos.y as f64 / meta.height as f64,
                time: frame.index as f64 / meta.fps as f64,
            });
            prev_position = Some(pos);
        }

        prev_gray = Some(gray);
        frame_idx += 1;
        if frame_idx % PROGRESS_CADENCE == 0 {
            if let Some(report) = progress {
                report(frame_idx as f32 / total as f32);
            }
        }
    }

    log::info!(
        "[DETECT] Resolved {} of {} frames",
        positions.len(),
        frame_idx
    );

    if positions.len() > 1 {
        positions = smooth_waypoints(&positions, SMOOTH_ALPHA_DETECTED);
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CursorColor, CursorStyle};
    use crate::error::CursorFlowError;
    use crate::video::{Frame, VideoMetadata};
    use image::{Luma, Rgb, RgbImage};
    use std::sync::{Arc, Mutex};

    struct VecFrameSource {
        meta: VideoMetadata,
        frames: Vec<RgbImage>,
        next: usize,
    }

    impl VecFrameSource {
        fn new(frames: Vec<RgbImage>, fps: u32) -> Self {
            let (w, h) = frames
                .first()
                .map(|f| (f.width(), f.height()))
                .unwrap_or((64, 48));
            Self {
                meta: VideoMetadata {
                    width: w,
                    height: h,
                    fps,
                    duration_ms: frames.len() as u64 * 1000 / fps as u64,
                    frame_count: frames.len() as u32,
                },
                frames,
                next: 0,
            }
        }
    }

    impl FrameSource for VecFrameSource {
        fn metadata(&self) -> &VideoMetadata {
            &self.meta
        }

        fn next_frame(&mut self) -> CursorFlowResult<Option<Frame>> {
            if self.next >= self.frames.len() {
                return Ok(None);
            }
            let frame = Frame {
                index: self.next as u32,
                image: self.frames[self.next].clone(),
            };
            self.next += 1;
            Ok(Some(frame))
        }
    }

    #[derive(Default)]
    struct CaptureSink {
        frames: Arc<Mutex<Vec<RgbImage>>>,
        finished: Arc<Mutex<bool>>,
    }

    impl FrameSink for CaptureSink {
        fn write_frame(&mut self, frame: &RgbImage) -> CursorFlowResult<()> {
            self.frames.lock().unwrap().push(frame.clone());
            Ok(())
        }

        fn finish(self: Box<Self>) -> CursorFlowResult<()> {
            *self.finished.lock().unwrap() = true;
            Ok(())
        }
    }

    fn gray_frames(count: usize, w: u32, h: u32) -> Vec<RgbImage> {
        (0..count)
            .map(|_| RgbImage::from_pixel(w, h, Rgb([100, 100, 100])))
            .collect()
    }

    fn dot_options() -> RenderOptions {
        RenderOptions {
            cursor_style: CursorStyle::Dot,
            cursor_size: 8,
            cursor_color: CursorColor::Red,
            smooth: false,
            quality: Default::default(),
        }
    }

    #[test]
    fn test_render_composites_every_frame() {
        let mut source = VecFrameSource::new(gray_frames(5, 64, 48), 30);
        let sink = CaptureSink::default();
        let frames = sink.frames.clone();
        let finished = sink.finished.clone();

        let waypoints = vec![
            Waypoint { x: 0.5, y: 0.5, time: 0.0 },
            Waypoint { x: 0.5, y: 0.5, time: 1.0 },
        ];
        render_frames(&mut source, Box::new(sink), &waypoints, &dot_options(), None).unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 5);
        assert!(*finished.lock().unwrap());

        // Glyph top-left at (32, 24): the dot center carries the color.
        let first = &frames[0];
        assert_eq!(first.get_pixel(36, 28).0, [255, 0, 0]);
        // Far corner untouched
        assert_eq!(first.get_pixel(0, 0).0, [100, 100, 100]);
    }

    #[test]
    fn test_render_rejects_malformed_waypoints_before_any_frame() {
        let mut source = VecFrameSource::new(gray_frames(3, 64, 48), 30);
        let sink = CaptureSink::default();
        let frames = sink.frames.clone();

        let bad = vec![
            Waypoint { x: 0.5, y: 0.5, time: 2.0 },
            Waypoint { x: 0.5, y: 0.5, time: 1.0 },
        ];
        let err =
            render_frames(&mut source, Box::new(sink), &bad, &dot_options(), None).unwrap_err();
        assert!(matches!(err, CursorFlowError::MalformedWaypoints(_)));
        assert!(frames.lock().unwrap().is_empty());
    }

    #[test]
    fn test_render_progress_reaches_one() {
        let mut source = VecFrameSource::new(gray_frames(25, 32, 32), 30);
        let sink = CaptureSink::default();
        let reported: Arc<Mutex<Vec<f32>>> = Arc::default();
        let reported_clone = reported.clone();
        let report = move |p: f32| reported_clone.lock().unwrap().push(p);

        render_frames(
            &mut source,
            Box::new(sink),
            &[],
            &dot_options(),
            Some(&report),
        )
        .unwrap();

        let reported = reported.lock().unwrap();
        // Cadence of 10 over 25 frames, then the final 1.0.
        assert_eq!(reported.len(), 3);
        assert!(reported[0] > 0.0 && reported[0] <= 0.8);
        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*reported.last().unwrap(), 1.0);
    }

    #[test]
    fn test_detect_omits_unresolved_frames() {
        // Featureless frames: no detector output, no carried position, so
        // the detected trajectory is empty rather than null-filled.
        let mut source = VecFrameSource::new(gray_frames(4, 80, 80), 30);
        let bank = DetectorBank::new();
        let detected = detect_frames(&mut source, &bank, None).unwrap();
        assert!(detected.is_empty());
    }

    #[test]
    fn test_detect_tracks_moving_block() {
        // A bright block hops to the right a few pixels per frame.
        let mut frames = Vec::new();
        for i in 0..6u32 {
            let mut img = RgbImage::from_pixel(120, 120, Rgb([90, 90, 90]));
            let x0 = 30 + i * 4;
            for y in 50..62 {
                for x in x0..x0 + 12 {
                    img.put_pixel(x, y, Rgb([250, 250, 250]));
                }
            }
            frames.push(img);
        }

        let mut source = VecFrameSource::new(frames, 30);
        let bank = DetectorBank::new();
        let detected = detect_frames(&mut source, &bank, None).unwrap();

        assert!(!detected.is_empty());
        // Normalized, in range, with non-decreasing times.
        for wp in &detected {
            assert!((0.0..=1.0).contains(&wp.x));
            assert!((0.0..=1.0).contains(&wp.y));
        }
        assert!(detected.windows(2).all(|w| w[0].time <= w[1].time));
        // The smoothed track trends rightward with the block.
        if detected.len() >= 2 {
            assert!(detected.last().unwrap().x >= detected[0].x);
        }
    }

    #[test]
    fn test_detect_gray_conversion_helper() {
        let img = RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]));
        let gray = rgb_to_gray(&img);
        assert_eq!(gray.get_pixel(0, 0), &Luma([76]));
    }
}
