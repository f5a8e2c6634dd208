//! Backend communication for model forms.
//!
//! This crate provides the request/response plumbing between a model form and
//! the compute backend:
//! - [`Communicator`]: one request, one response, status flags for the UI
//! - [`AsyncCommunicator`]: long-running jobs driven to completion by polling
//! - [`Transport`]: the network seam ([`HttpTransport`] for real use)
//! - [`RequestShaping`]: extra fields a form injects into every request

pub mod communicator;
pub mod config;
pub mod error;
pub mod job;
pub mod progress;
pub mod protocol;
pub mod shaping;
pub mod task;
pub mod transport;

pub use communicator::{CommStatus, Communicator, FetchOutcome, SaveOutcome, SavedRecord};
pub use config::CommConfig;
pub use error::{CommError, CommResult, TransportError};
pub use job::{JobHandle, JobState};
pub use progress::JobProgressEvent;
pub use protocol::{Action, RawResponse, Request, RequestData, ResponseData};
pub use shaping::{ModelShaping, PlainShaping, RequestShaping};
pub use task::{AsyncCommunicator, PollConfig, Rejection, TaskStatus};
pub use transport::{HttpTransport, Transport};
