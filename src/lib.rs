//! Cursor tracking and replacement for screen recordings.
//!
//! Two entry points cover the core workflows:
//! - [`pipeline::render_with_cursor`] composites a replacement cursor glyph
//!   onto a video along a known trajectory.
//! - [`pipeline::detect_cursor_positions`] recovers a trajectory from a
//!   video with no coordinate data, via template matching, frame
//!   differencing, and edge analysis fused by a continuity arbiter.
//!
//! The [`job`] module wraps both in a queue-backed runner for callers that
//! want submit-and-poll semantics instead of a blocking call.

pub mod compose;
pub mod config;
pub mod detect;
pub mod error;
pub mod glyph;
pub mod job;
pub mod pipeline;
pub mod trajectory;
pub mod video;

pub use config::{CursorColor, CursorStyle, QualityTier, RenderOptions};
pub use error::{CursorFlowError, CursorFlowResult};
pub use job::{InMemoryJobStore, JobRunner, JobState, JobStatus, JobStore};
pub use pipeline::{detect_cursor_positions, render_with_cursor};
pub use trajectory::Waypoint;
