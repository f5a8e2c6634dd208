//! Background compute jobs driven to completion by polling.
//!
//! The backend answers `startCompute` with a job id and a state. While the
//! state is PENDING, STARTED or PROGRESS the client asks again with
//! `checkProgress` after a fixed delay. The next poll is scheduled only when
//! the previous answer has been handled, so there is never more than one
//! request in flight for a job and a slow network slows the polling down.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::communicator::Communicator;
use crate::error::{CommError, CommResult};
use crate::job::{JobHandle, JobState};
use crate::progress::JobProgressEvent;
use crate::protocol::{Action, ResponseData};

/// Why a job task ended without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Server reported FAILURE.
    JobFailure,
    /// Server reported REVOKED.
    JobRevoked,
    /// Server answered `errStatus: true`.
    ServerError,
    /// No usable response.
    TransportError,
    /// `max_polls` reached while the job was still running.
    PollLimit,
}

/// Client-side status of the current job task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskStatus {
    /// No compute request issued yet.
    #[default]
    Idle,
    Pending,
    Resolved,
    Rejected(Rejection),
    /// Polling stopped by the client; the server job may still be running.
    Cancelled,
}

impl TaskStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected(_) | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between an answer and the next `checkProgress`.
    pub interval: Duration,
    /// Give up after this many `checkProgress` requests; `None` polls forever.
    pub max_polls: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_polls: None,
        }
    }
}

/// Communicator for models that compute in the background.
///
/// Owns one [`JobHandle`] at a time. A new [`compute_async`](Self::compute_async)
/// replaces the previous job. The invoking control (compute button) is
/// disabled from the start request until the task settles.
#[derive(Debug)]
pub struct AsyncCommunicator {
    comm: Communicator,
    config: PollConfig,
    job: JobHandle,
    status: TaskStatus,
    next_poll_at: Option<Instant>,
    polls: u32,
    control_enabled: bool,
}

impl AsyncCommunicator {
    pub fn new(comm: Communicator, config: PollConfig) -> Self {
        Self {
            comm,
            config,
            job: JobHandle::default(),
            status: TaskStatus::Idle,
            next_poll_at: None,
            polls: 0,
            control_enabled: true,
        }
    }

    pub fn communicator(&self) -> &Communicator {
        &self.comm
    }

    /// Plain view actions go through the same communicator as job requests.
    pub fn communicator_mut(&mut self) -> &mut Communicator {
        &mut self.comm
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    pub fn job(&self) -> &JobHandle {
        &self.job
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Whether the compute control may be used.
    pub fn control_enabled(&self) -> bool {
        self.control_enabled
    }

    /// A follow-up `checkProgress` is waiting to go out.
    pub fn poll_scheduled(&self) -> bool {
        self.next_poll_at.is_some()
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Start a background computation with the given model parameters.
    pub async fn compute_async(&mut self, parameters: Value) -> TaskStatus {
        if self.status == TaskStatus::Pending {
            info!(job_id = ?self.job.job_id, "replacing running job task");
        }
        self.job = JobHandle::default();
        self.next_poll_at = None;
        self.polls = 0;
        self.status = TaskStatus::Pending;
        self.control_enabled = false;

        let result = self.comm.exchange(Action::StartCompute, parameters).await;
        self.handle_response(result)
    }

    /// Send the scheduled `checkProgress`, if there is one.
    ///
    /// Waits until the scheduled time, then sends. With nothing scheduled
    /// (task idle or settled) it returns the current status right away
    /// without touching the network.
    pub async fn poll_once(&mut self) -> TaskStatus {
        let Some(deadline) = self.next_poll_at else {
            return self.status;
        };
        sleep_until(deadline).await;

        // Consumed before sending: only the handler of this poll's answer can
        // schedule the next one.
        self.next_poll_at = None;
        self.polls += 1;
        debug!(job_id = ?self.job.job_id, poll = self.polls, "checking progress");

        let parameters = self.job_parameters();
        let result = self.comm.exchange(Action::CheckProgress, parameters).await;
        self.handle_response(result)
    }

    /// Poll until the task settles, reporting every answer.
    pub async fn run_until_terminal(
        &mut self,
        mut progress_cb: Option<&mut dyn FnMut(&JobProgressEvent)>,
    ) -> TaskStatus {
        let started = Instant::now();
        while self.poll_scheduled() {
            self.poll_once().await;
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(&JobProgressEvent::from_job(
                    &self.job,
                    self.polls,
                    started.elapsed().as_secs_f64(),
                ));
            }
        }
        self.status
    }

    /// [`compute_async`](Self::compute_async) followed by
    /// [`run_until_terminal`](Self::run_until_terminal).
    pub async fn compute_to_completion(
        &mut self,
        parameters: Value,
        mut progress_cb: Option<&mut dyn FnMut(&JobProgressEvent)>,
    ) -> TaskStatus {
        self.compute_async(parameters).await;
        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(&JobProgressEvent::from_job(&self.job, self.polls, 0.0));
        }
        self.run_until_terminal(progress_cb).await
    }

    /// Ask the backend to revoke the job.
    ///
    /// Only sends when a job id is known; returns whether a request went out.
    /// The job is not forced into a terminal state here: an immediate REVOKED
    /// answer settles it, otherwise the next poll reports it. A scheduled poll
    /// stays scheduled.
    pub async fn abort_async(&mut self) -> bool {
        let Some(job_id) = self.job.job_id.clone() else {
            return false;
        };
        info!(%job_id, "aborting job");

        let parameters = self.job_parameters();
        let result = self.comm.exchange(Action::Abort, parameters).await;
        match result {
            Ok(data) if self.status == TaskStatus::Pending && data.state.is_some() => {
                self.handle_response(Ok(data));
            }
            Ok(_) => {}
            Err(err) => warn!(%job_id, error = %err, "abort request failed"),
        }
        true
    }

    /// Stop polling on the client side. No request is sent.
    pub fn cancel(&mut self) -> TaskStatus {
        if self.status == TaskStatus::Pending {
            info!(job_id = ?self.job.job_id, "job task cancelled");
            self.settle(TaskStatus::Cancelled);
        }
        self.status
    }

    fn job_parameters(&self) -> Value {
        json!({ "jobID": self.job.job_id })
    }

    fn handle_response(&mut self, result: CommResult<ResponseData>) -> TaskStatus {
        let data = match result {
            Ok(data) => data,
            Err(CommError::Server { .. }) => {
                return self.settle(TaskStatus::Rejected(Rejection::ServerError));
            }
            Err(_) => return self.settle(TaskStatus::Rejected(Rejection::TransportError)),
        };

        // Start and poll answers must carry a state.
        if matches!(data.state, None | Some(JobState::None)) {
            return self.malformed();
        }

        self.job.apply(&data);
        debug!(job_id = ?self.job.job_id, state = %self.job.state, "job state");

        match self.job.state {
            JobState::Success => {
                info!(job_id = ?self.job.job_id, "job finished");
                self.comm.deliver(data);
                self.settle(TaskStatus::Resolved)
            }
            JobState::Failure => self.settle(TaskStatus::Rejected(Rejection::JobFailure)),
            JobState::Revoked => self.settle(TaskStatus::Rejected(Rejection::JobRevoked)),
            JobState::Pending | JobState::Started | JobState::Progress => self.schedule_poll(),
            JobState::None => self.malformed(),
        }
    }

    fn malformed(&mut self) -> TaskStatus {
        self.comm.mark_malformed("job response without a state");
        self.settle(TaskStatus::Rejected(Rejection::TransportError))
    }

    fn schedule_poll(&mut self) -> TaskStatus {
        if let Some(max) = self.config.max_polls {
            if self.polls >= max {
                warn!(job_id = ?self.job.job_id, polls = self.polls, "poll limit reached");
                return self.settle(TaskStatus::Rejected(Rejection::PollLimit));
            }
        }
        if self.next_poll_at.is_none() {
            self.next_poll_at = Some(Instant::now() + self.config.interval);
        }
        self.status
    }

    fn settle(&mut self, status: TaskStatus) -> TaskStatus {
        self.status = status;
        self.next_poll_at = None;
        self.control_enabled = true;
        status
    }
}
