//! Scripted in-memory backend.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use smo_comm::{
    AsyncCommunicator, Communicator, PollConfig, RawResponse, Request, Transport, TransportError,
};
use tokio::time::Instant;

/// Answers requests from a queue and records what was sent, and when.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    sent: Mutex<Vec<(Request, Instant)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful response with the given `data` object.
    pub fn reply_data(&self, data: Value) {
        let raw: RawResponse =
            serde_json::from_value(serde_json::json!({"errStatus": false, "data": data}))
                .expect("scripted data should decode");
        self.replies.lock().unwrap().push_back(Ok(raw));
    }

    pub fn reply_server_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::failure(message, Some("trace".into()))));
    }

    pub fn reply_transport_error(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Status { code: 502 }));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.sent.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn actions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.action.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((request.clone(), Instant::now()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::NoResponse("script exhausted".into())))
    }
}

pub fn async_comm(transport: &Arc<ScriptedTransport>, config: PollConfig) -> AsyncCommunicator {
    AsyncCommunicator::new(Communicator::new(transport.clone()), config)
}
