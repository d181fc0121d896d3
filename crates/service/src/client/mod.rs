//! Transport seam between the services and the QRS server.
//!
//! Services only build `QrsRequest`s and read `QrsResponse`s; anything that
//! can execute them implements [`Client`]. Non-2xx statuses are ordinary
//! responses here, only failures to get a response at all are errors.

mod http;

use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use http::HttpClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_builder() {
            ClientError::Config(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the server base URL, e.g. `GET /qrs/stream`.
#[derive(Clone, Debug, PartialEq)]
pub struct QrsRequest {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl QrsRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), params: Vec::new(), body: None }
    }

    pub fn get(url: impl Into<String>) -> Self { Self::new(Method::Get, url) }
    pub fn post(url: impl Into<String>) -> Self { Self::new(Method::Post, url) }
    pub fn put(url: impl Into<String>) -> Self { Self::new(Method::Put, url) }
    pub fn delete(url: impl Into<String>) -> Self { Self::new(Method::Delete, url) }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    /// Add the parameter only when a value is present.
    pub fn param_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Comma-separated `privileges` parameter; omitted when empty.
    pub fn privileges<S: AsRef<str>>(self, privileges: &[S]) -> Self {
        if privileges.is_empty() {
            return self;
        }
        let csv = privileges.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
        self.param("privileges", csv)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QrsResponse {
    pub status: u16,
    pub body: String,
}

impl QrsResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

    pub fn is_not_found(&self) -> bool { self.status == 404 }

    pub fn is_empty(&self) -> bool { self.body.trim().is_empty() }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Executes QRS requests. Implementations own authentication and the
/// connection; services never see either.
#[async_trait]
pub trait Client: Send + Sync {
    async fn call(&self, request: QrsRequest) -> Result<QrsResponse, ClientError>;
}
