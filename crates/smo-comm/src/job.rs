//! Server-side job lifecycle as seen by the client.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smo_core::format_number;

use crate::protocol::ResponseData;

/// Lifecycle stage of a background computation.
///
/// `None` is the client-side state before any compute request was answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    #[default]
    None,
    Pending,
    Started,
    Progress,
    Success,
    Failure,
    Revoked,
}

impl JobState {
    /// No further polling happens from a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Revoked)
    }

    /// Still queued or running; another poll follows.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Started | Self::Progress)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Pending => "PENDING",
            Self::Started => "STARTED",
            Self::Progress => "PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Client view of one outstanding compute request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobHandle {
    pub job_id: Option<String>,
    pub state: JobState,
    pub current: f64,
    pub total: f64,
    /// Show progress as `current / total` instead of a percentage.
    pub fraction_output: bool,
    pub suffix: String,
    /// `values` of the SUCCESS response.
    pub result_payload: Option<Value>,
}

impl JobHandle {
    /// Fold a job response into the handle. Absent fields keep their value.
    pub(crate) fn apply(&mut self, data: &ResponseData) {
        if let Some(job_id) = &data.job_id {
            self.job_id = Some(job_id.clone());
        }
        if let Some(state) = data.state {
            self.state = state;
        }
        if let Some(current) = data.current {
            self.current = current;
        }
        if let Some(total) = data.total {
            self.total = total;
        }
        if let Some(fraction_output) = data.fraction_output {
            self.fraction_output = fraction_output;
        }
        if let Some(suffix) = &data.suffix {
            self.suffix = suffix.clone();
        }
        if self.state == JobState::Success {
            self.result_payload = data.values.clone();
        }
    }

    /// `current / total`, if a total has been reported.
    pub fn fraction(&self) -> Option<f64> {
        (self.total > 0.0).then(|| self.current / self.total)
    }

    /// Progress text for a progress bar caption.
    ///
    /// `"5 / 10 day"` with fraction output, otherwise the percentage followed
    /// by the suffix (`"50%"`). `None` until a total is known.
    pub fn progress_label(&self) -> Option<String> {
        let fraction = self.fraction()?;
        let label = if self.fraction_output {
            format!(
                "{} / {} {}",
                format_number(self.current),
                format_number(self.total),
                self.suffix
            )
        } else {
            format!("{:.0}{}", fraction * 100.0, self.suffix)
        };
        Some(label.trim_end().to_string())
    }
}
