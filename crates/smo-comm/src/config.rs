//! Communicator configuration, read from YAML.
//!
//! ```yaml
//! url: http://localhost:8000/ThermoFluids/CompressedGasStorage/
//! model_name: CompressedGasStorage
//! view_name: resultView
//! poll_interval_ms: 1000
//! max_polls: 500
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::communicator::Communicator;
use crate::error::{CommError, CommResult};
use crate::shaping::{ModelShaping, PlainShaping};
use crate::task::{AsyncCommunicator, PollConfig};
use crate::transport::HttpTransport;

fn default_poll_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommConfig {
    /// Backend endpoint receiving all actions.
    pub url: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub view_name: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Unbounded when absent.
    #[serde(default)]
    pub max_polls: Option<u32>,
    /// No timeout when absent.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl CommConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model_name: None,
            view_name: None,
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: None,
            request_timeout_ms: None,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> CommResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> CommResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CommError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_polls: self.max_polls,
        }
    }

    pub fn http_transport(&self) -> CommResult<HttpTransport> {
        let timeout = self.request_timeout_ms.map(Duration::from_millis);
        Ok(HttpTransport::with_timeout(self.url.clone(), timeout)?)
    }

    /// Communicator over HTTP, tagged with model/view names when configured.
    pub fn communicator(&self) -> CommResult<Communicator> {
        let comm = Communicator::new(Arc::new(self.http_transport()?));
        if self.model_name.is_none() && self.view_name.is_none() {
            return Ok(comm.with_shaping(PlainShaping));
        }
        Ok(comm.with_shaping(ModelShaping {
            model_name: self.model_name.clone(),
            view_name: self.view_name.clone(),
        }))
    }

    pub fn async_communicator(&self) -> CommResult<AsyncCommunicator> {
        Ok(AsyncCommunicator::new(
            self.communicator()?,
            self.poll_config(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = CommConfig::from_yaml_str("url: http://localhost:8000/compute\n").unwrap();
        assert_eq!(config, CommConfig::new("http://localhost:8000/compute"));

        let poll = config.poll_config();
        assert_eq!(poll.interval, Duration::from_millis(1000));
        assert_eq!(poll.max_polls, None);
    }

    #[test]
    fn full_config() {
        let yaml = "\
url: http://localhost:8000/
model_name: CompressedGasStorage
view_name: resultView
poll_interval_ms: 250
max_polls: 500
request_timeout_ms: 30000
";
        let config = CommConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.model_name.as_deref(), Some("CompressedGasStorage"));
        assert_eq!(config.poll_config().interval, Duration::from_millis(250));
        assert_eq!(config.poll_config().max_polls, Some(500));
        assert_eq!(config.request_timeout_ms, Some(30_000));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CommConfig::from_yaml_str("url: x\npoll_every: 3\n").unwrap_err();
        assert!(matches!(err, CommError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CommConfig::load(Path::new("/nonexistent/smo.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/smo.yaml"));
    }
}
