use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One request issued against the QRS API, as seen by the service layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub params: Vec<(String, String)>,
    /// HTTP status, absent when the request never produced a response.
    pub status: Option<u16>,
    pub latency_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}
