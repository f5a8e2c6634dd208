//! Backend RPC wire format.
//!
//! Requests are `{action, data: {modelName?, viewName?, parameters}}`.
//! Responses are either `{errStatus: false, data: {...}}` or
//! `{errStatus: true, error, stackTrace?}`.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{CommError, CommResult, TransportError};
use crate::job::JobState;

/// Request action understood by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Launch a background job with the model parameters.
    StartCompute,
    /// Ask for the state of a running job.
    CheckProgress,
    /// Ask the backend to revoke a running job.
    Abort,
    /// Any other view action (`load`, `save`, `getQuantities`, ...).
    Named(String),
}

impl Action {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::StartCompute => "startCompute",
            Self::CheckProgress => "checkProgress",
            Self::Abort => "abort",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub action: Action,
    pub data: RequestData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,
    pub parameters: Value,
}

/// Response envelope as it comes off the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawResponse {
    #[serde(rename = "errStatus", default)]
    pub err_status: bool,
    #[serde(default)]
    pub data: Option<ResponseData>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "stackTrace", default)]
    pub stack_trace: Option<String>,
}

impl RawResponse {
    pub fn success(data: ResponseData) -> Self {
        Self {
            err_status: false,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>, stack_trace: Option<String>) -> Self {
        Self {
            err_status: true,
            error: Some(error.into()),
            stack_trace,
            ..Self::default()
        }
    }

    /// Split into payload or backend-reported failure.
    pub fn into_result(self) -> CommResult<ResponseData> {
        if self.err_status {
            Err(CommError::Server {
                message: self.error.unwrap_or_default(),
                stack_trace: self.stack_trace,
            })
        } else {
            Ok(self.data.unwrap_or_default())
        }
    }
}

/// Payload of a successful response.
///
/// Job fields are only present on `startCompute`, `checkProgress` and `abort`
/// answers; form fields (`values`, `definitions`, `actions`) on view actions.
/// Anything else the backend adds is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(rename = "jobID", skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(rename = "fractionOutput", skip_serializing_if = "Option::is_none")]
    pub fraction_output: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decode a response body.
///
/// The backend writes non-finite floats as bare `NaN`, `Infinity` and
/// `-Infinity`; they are read as `null`.
pub fn decode_response(body: &str) -> Result<RawResponse, TransportError> {
    Ok(serde_json::from_str(&relax_non_finite(body))?)
}

const NON_FINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Replace non-finite number tokens outside of string literals with `null`.
pub fn relax_non_finite(body: &str) -> Cow<'_, str> {
    if !NON_FINITE_TOKENS.iter().any(|token| body.contains(token)) {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        if !in_string {
            if let Some(token) = NON_FINITE_TOKENS.iter().find(|t| rest.starts_with(**t)) {
                out.push_str("null");
                rest = &rest[token.len()..];
                continue;
            }
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}
