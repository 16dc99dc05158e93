//! Job-state store and fire-and-forget runner.
//!
//! Submission returns a job id immediately; worker threads consume a
//! channel-backed queue, drive the pipeline, and report progress and
//! outcome through the [`JobStore`] only. The store is an injected
//! collaborator rather than a process-wide singleton, so tests and
//! embedders can supply their own.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Sender};
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RenderOptions;
use crate::error::{CursorFlowError, CursorFlowResult};
use crate::pipeline;
use crate::trajectory::Waypoint;

// ============================================================================
// Job state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    Queued,
    Processing,
    Detecting,
    Completed,
    Failed,
}

/// Snapshot of a job as reported to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    pub status: JobStatus,
    /// Whole percent, 0..=100.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Detected trajectory, present once a detection job completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_data: Option<Vec<Waypoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobState {
    fn queued() -> Self {
        Self {
            status: JobStatus::Queued,
            progress: 0,
            output_path: None,
            cursor_data: None,
            error: None,
            created_at: Utc::now(),
        }
    }
}

/// Keyed job-state storage shared between submitters, workers, and pollers.
pub trait JobStore: Send + Sync {
    fn get(&self, id: &str) -> Option<JobState>;
    fn set(&self, id: &str, state: JobState);
    /// Returns whether the id was present.
    fn delete(&self, id: &str) -> bool;
}

/// Default store backed by a `parking_lot::RwLock<HashMap>`.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, JobState>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn get(&self, id: &str) -> Option<JobState> {
        self.jobs.read().get(id).cloned()
    }

    fn set(&self, id: &str, state: JobState) {
        self.jobs.write().insert(id.to_string(), state);
    }

    fn delete(&self, id: &str) -> bool {
        self.jobs.write().remove(id).is_some()
    }
}

/// Generate a unique job id: hex millisecond timestamp plus a random suffix.
pub(crate) fn generate_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0))
        .as_millis();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}{:06x}", timestamp, random & 0xFFFFFF)
}

// ============================================================================
// Runner
// ============================================================================

enum JobRequest {
    Render {
        id: String,
        input: PathBuf,
        output: PathBuf,
        waypoints: Vec<Waypoint>,
        options: RenderOptions,
    },
    Detect {
        id: String,
        input: PathBuf,
    },
}

/// Queue-backed runner. Dropping it closes the queue; in-flight jobs run
/// to completion on their detached worker threads.
pub struct JobRunner {
    store: Arc<dyn JobStore>,
    queue: Sender<JobRequest>,
}

impl JobRunner {
    pub fn new(store: Arc<dyn JobStore>, workers: usize) -> Self {
        let (tx, rx) = unbounded::<JobRequest>();
        for worker in 0..workers.max(1) {
            let rx = rx.clone();
            let store = store.clone();
            std::thread::spawn(move || {
                for request in rx.iter() {
                    run_job(store.as_ref(), request);
                }
                log::debug!("[JOB] Worker {} exiting, queue closed", worker);
            });
        }
        Self { store, queue: tx }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Queue a render job. Returns the job id immediately; poll the store
    /// for progress and outcome.
    pub fn submit_render(
        &self,
        input: PathBuf,
        output: PathBuf,
        waypoints: Vec<Waypoint>,
        options: RenderOptions,
    ) -> CursorFlowResult<String> {
        let id = generate_id();
        self.store.set(&id, JobState::queued());
        log::info!("[JOB] Queued render job {} for {:?}", id, input);
        self.queue
            .send(JobRequest::Render {
                id: id.clone(),
                input,
                output,
                waypoints,
                options,
            })
            .map_err(|_| CursorFlowError::Other("job queue closed".to_string()))?;
        Ok(id)
    }

    /// Queue a detection job over a video with no known trajectory.
    pub fn submit_detect(&self, input: PathBuf) -> CursorFlowResult<String> {
        let id = generate_id();
        self.store.set(&id, JobState::queued());
        log::info!("[JOB] Queued detection job {} for {:?}", id, input);
        self.queue
            .send(JobRequest::Detect {
                id: id.clone(),
                input,
            })
            .map_err(|_| CursorFlowError::Other("job queue closed".to_string()))?;
        Ok(id)
    }
}

fn run_job(store: &dyn JobStore, request: JobRequest) {
    match request {
        JobRequest::Render {
            id,
            input,
            output,
            waypoints,
            options,
        } => {
            update(store, &id, |s| {
                s.status = JobStatus::Processing;
            });
            let progress = progress_reporter(store, &id);
            let result = pipeline::render_with_cursor(
                &input,
                &output,
                &waypoints,
                &options,
                Some(&progress),
            );
            match result {
                Ok(()) => {
                    log::info!("[JOB] Render job {} completed", id);
                    update(store, &id, |s| {
                        s.status = JobStatus::Completed;
                        s.progress = 100;
                        s.output_path = Some(output.to_string_lossy().into_owned());
                    });
                }
                Err(e) => {
                    log::error!("[JOB] Render job {} failed: {}", id, e);
                    update(store, &id, |s| {
                        s.status = JobStatus::Failed;
                        s.error = Some(e.to_string());
                    });
                }
            }
        }
        JobRequest::Detect { id, input } => {
            update(store, &id, |s| {
                s.status = JobStatus::Detecting;
            });
            let progress = progress_reporter(store, &id);
            match pipeline::detect_cursor_positions(&input, Some(&progress)) {
                Ok(waypoints) => {
                    log::info!(
                        "[JOB] Detection job {} completed with {} waypoints",
                        id,
                        waypoints.len()
                    );
                    update(store, &id, |s| {
                        s.status = JobStatus::Completed;
                        s.progress = 100;
                        s.cursor_data = Some(waypoints);
                    });
                }
                Err(e) => {
                    log::error!("[JOB] Detection job {} failed: {}", id, e);
                    update(store, &id, |s| {
                        s.status = JobStatus::Failed;
                        s.error = Some(e.to_string());
                    });
                }
            }
        }
    }
}

fn update(store: &dyn JobStore, id: &str, apply: impl FnOnce(&mut JobState)) {
    if let Some(mut state) = store.get(id) {
        apply(&mut state);
        store.set(id, state);
    }
}

fn progress_reporter<'a>(
    store: &'a dyn JobStore,
    id: &'a str,
) -> impl Fn(f32) + Send + Sync + 'a {
    move |fraction: f32| {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0) as u8;
        update(store, id, |s| s.progress = percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_store_round_trip() {
        let store = InMemoryJobStore::new();
        assert!(store.get("missing").is_none());

        store.set("a", JobState::queued());
        let state = store.get("a").unwrap();
        assert_eq!(state.status, JobStatus::Queued);
        assert_eq!(state.progress, 0);

        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_generate_id_is_hex_and_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(a.len() > 6);
    }

    #[test]
    fn test_state_serializes_camel_case_and_skips_absent_fields() {
        let state = JobState::queued();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "queued");
        assert_eq!(json["progress"], 0);
        assert!(json.get("outputPath").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_progress_reporter_clamps_to_percent() {
        let store = InMemoryJobStore::new();
        store.set("p", JobState::queued());
        let report = progress_reporter(&store, "p");
        report(0.437);
        assert_eq!(store.get("p").unwrap().progress, 43);
        report(1.5);
        assert_eq!(store.get("p").unwrap().progress, 100);
    }

    #[test]
    fn test_unreadable_input_marks_job_failed() {
        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let runner = JobRunner::new(store.clone(), 1);
        let id = runner
            .submit_detect(PathBuf::from("/nonexistent/clip.mp4"))
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let state = store.get(&id).unwrap();
            if state.status == JobStatus::Failed {
                assert!(state.error.is_some());
                break;
            }
            assert!(Instant::now() < deadline, "job never failed: {:?}", state);
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}
