//! Request/response communicator for model views.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CommError, CommResult, TransportError};
use crate::protocol::{Action, Request, RequestData, ResponseData};
use crate::shaping::{PlainShaping, RequestShaping};
use crate::transport::Transport;

/// Observable state of the last request, for the UI to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommStatus {
    /// Waiting for the server.
    pub loading: bool,
    /// No usable response (unreachable server, bad status, unparsable body).
    pub comm_error: bool,
    /// The server answered with `errStatus: true`.
    pub server_error: bool,
    /// Message for whichever error flag is set.
    pub error_msg: String,
    pub stack_trace: Option<String>,
    /// Data from the last request has been stored.
    pub data_received: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Received,
    ServerFailed,
    CommFailed,
}

/// Record id returned by a save action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRecord {
    pub model: String,
    pub view: String,
    pub id: String,
}

impl SavedRecord {
    /// Query string that reopens the saved record: `?model=..&view=..&id=..`.
    pub fn query_string(&self) -> String {
        format!("?model={}&view={}&id={}", self.model, self.view, self.id)
    }

    fn from_data(data: &ResponseData) -> Option<Self> {
        let field = |name: &str| -> Option<String> {
            match data.extra.get(name)? {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            }
        };
        Some(Self {
            model: field("model")?,
            view: field("view")?,
            id: field("id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub record: Option<SavedRecord>,
    pub message: String,
}

/// Sends view actions to the backend and keeps the latest form data.
///
/// Errors never escape: every failure ends up in [`CommStatus`].
pub struct Communicator {
    transport: Arc<dyn Transport>,
    shaping: Box<dyn RequestShaping>,
    status: CommStatus,
    data: ResponseData,
}

impl Communicator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            shaping: Box::new(PlainShaping),
            status: CommStatus::default(),
            data: ResponseData::default(),
        }
    }

    pub fn with_shaping(mut self, shaping: impl RequestShaping + 'static) -> Self {
        self.shaping = Box::new(shaping);
        self
    }

    pub fn status(&self) -> &CommStatus {
        &self.status
    }

    /// Everything received so far (definitions, values, actions, ...).
    pub fn data(&self) -> &ResponseData {
        &self.data
    }

    pub fn values(&self) -> Option<&Value> {
        self.data.values.as_ref()
    }

    /// Send `action` and store the answer.
    ///
    /// Once definitions have arrived, later responses only replace `values`;
    /// the form layout stays as it was.
    pub async fn fetch_data(&mut self, action: Action, parameters: Value) -> FetchOutcome {
        match self.exchange(action, parameters).await {
            Ok(data) => {
                self.deliver(data);
                FetchOutcome::Received
            }
            Err(CommError::Server { .. }) => FetchOutcome::ServerFailed,
            Err(_) => FetchOutcome::CommFailed,
        }
    }

    /// Post form values to a save action.
    ///
    /// Uses the current `values` unless `parameters` is given. Does not touch
    /// the status flags.
    pub async fn save_user_input(&self, action: Action, parameters: Option<Value>) -> SaveOutcome {
        let parameters = parameters
            .or_else(|| self.data.values.clone())
            .unwrap_or(Value::Null);

        let saved = match self.send(action, parameters).await {
            Ok(data) => SavedRecord::from_data(&data),
            Err(err) => {
                warn!(error = %err, "save failed");
                None
            }
        };

        match saved {
            Some(record) => SaveOutcome {
                record: Some(record),
                message: "Input data saved.".to_string(),
            },
            None => SaveOutcome {
                record: None,
                message: "Failed to save input data".to_string(),
            },
        }
    }

    fn request(&self, action: Action, parameters: Value) -> Request {
        let mut data = RequestData {
            parameters,
            ..RequestData::default()
        };
        self.shaping.shape(&mut data);
        Request { action, data }
    }

    async fn send(&self, action: Action, parameters: Value) -> CommResult<ResponseData> {
        let request = self.request(action, parameters);
        debug!(action = %request.action, "sending request");
        self.transport.send(&request).await?.into_result()
    }

    /// One request with full status bookkeeping; the payload is returned,
    /// not stored.
    pub(crate) async fn exchange(
        &mut self,
        action: Action,
        parameters: Value,
    ) -> CommResult<ResponseData> {
        self.status = CommStatus {
            loading: true,
            ..CommStatus::default()
        };

        let result = self.send(action, parameters).await;
        self.status.loading = false;

        if let Err(err) = &result {
            self.record_error(err);
        }
        result
    }

    /// The common success path: store the payload and mark data as received.
    pub(crate) fn deliver(&mut self, data: ResponseData) {
        if self.data.definitions.is_some() {
            self.data.values = data.values;
        } else {
            self.data = data;
        }
        self.status.data_received = true;
    }

    /// Flag a response that decoded but cannot be used.
    pub(crate) fn mark_malformed(&mut self, reason: &str) {
        let err = CommError::from(TransportError::Incomplete(reason.to_string()));
        self.record_error(&err);
    }

    fn record_error(&mut self, err: &CommError) {
        self.status.data_received = false;
        match err {
            CommError::Server {
                message,
                stack_trace,
            } => {
                warn!(%message, "server reported an error");
                self.status.server_error = true;
                self.status.comm_error = false;
                self.status.error_msg = message.clone();
                self.status.stack_trace = stack_trace.clone();
            }
            other => {
                warn!(error = %other, "communication failed");
                self.status.comm_error = true;
                self.status.server_error = false;
                self.status.error_msg = other.to_string();
            }
        }
    }
}

impl std::fmt::Debug for Communicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("status", &self.status)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}
