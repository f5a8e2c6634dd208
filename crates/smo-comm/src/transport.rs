//! Network seam between communicators and the backend.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::{RawResponse, Request, decode_response};

/// Delivers one request and returns the decoded response envelope.
///
/// Implementations must not retry; a failed delivery is reported once and
/// handled by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<RawResponse, TransportError>;
}

/// JSON-over-HTTP POST to a single endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Transport without a request timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(url, None)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        debug!(url = %self.url, action = %request.action, "POST");
        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.text().await?;
        decode_response(&body)
    }
}
