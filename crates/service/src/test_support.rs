#![cfg(test)]
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{Client, ClientError, QrsRequest, QrsResponse};

/// Scripted client: answers calls from a queue of canned responses and keeps
/// every request it received.
#[derive(Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<QrsResponse, ClientError>>>,
    requests: Mutex<Vec<QrsRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(QrsResponse::new(status, body)))
    }

    pub fn respond_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.push(Ok(QrsResponse::new(status, body.to_string())))
    }

    pub fn fail(&self, err: ClientError) -> &Self {
        self.push(Err(err))
    }

    pub fn requests(&self) -> Vec<QrsRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, response: Result<QrsResponse, ClientError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }
}

#[async_trait]
impl Client for MockClient {
    async fn call(&self, request: QrsRequest) -> Result<QrsResponse, ClientError> {
        let unexpected = format!("no scripted response for {} {}", request.method, request.url);
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::Transport(unexpected)))
    }
}
