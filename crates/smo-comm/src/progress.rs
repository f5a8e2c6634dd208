use crate::job::{JobHandle, JobState};

/// Snapshot handed to progress callbacks after every job response.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProgressEvent {
    pub state: JobState,
    pub current: f64,
    pub total: f64,
    pub fraction: Option<f64>,
    pub label: Option<String>,
    /// `checkProgress` requests sent so far.
    pub polls: u32,
    pub elapsed_wall_s: f64,
}

impl JobProgressEvent {
    pub fn from_job(job: &JobHandle, polls: u32, elapsed_wall_s: f64) -> Self {
        Self {
            state: job.state,
            current: job.current,
            total: job.total,
            fraction: job.fraction(),
            label: job.progress_label(),
            polls,
            elapsed_wall_s,
        }
    }
}
