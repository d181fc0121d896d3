use thiserror::Error;

use crate::client::ClientError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("server returned {status} for {method} {path}: {message}")]
    Server { method: String, path: String, status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn missing_id(entity: &str) -> Self {
        Self::Validation(format!("{entity} has no id"))
    }

    /// HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::Model(_) => 1002,
            ServiceError::Client(_) => 1101,
            ServiceError::Server { .. } => 1102,
            ServiceError::Decode(_) => 1201,
            ServiceError::Serialization(_) => 1202,
        }
    }
}
