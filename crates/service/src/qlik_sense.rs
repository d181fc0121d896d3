use std::sync::Arc;

use tracing::info;

use configs::{AppConfig, IdStrategy};

use crate::app_service::AppService;
use crate::base::ServiceContext;
use crate::client::{Client, ClientError, HttpClient};
use crate::request_log::RequestLog;
use crate::stream_service::StreamService;
use crate::user_service::UserService;

/// Entry point: owns the client and hands out one service per resource.
///
/// Services are cheap to build and share the same client, request log and
/// id strategy.
///
/// ```no_run
/// use service::{Filter, HttpClient, QlikSense, QueryOptions};
///
/// let client = HttpClient::with_header_auth("https://qlik.example.com/hdr", "X-Qlik-HeaderAuth", "admin").unwrap();
/// let qs = QlikSense::new(client);
/// let options = QueryOptions::new().filter(Filter::eq("name", "Everyone"));
/// let streams = tokio_test::block_on(qs.stream().query(&options)).unwrap();
/// ```
#[derive(Debug)]
pub struct QlikSense<C> {
    ctx: ServiceContext<C>,
}

impl<C> Clone for QlikSense<C> {
    fn clone(&self) -> Self {
        Self { ctx: self.ctx.clone() }
    }
}

impl QlikSense<HttpClient> {
    /// HTTP client built from configuration, with the configured id strategy.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ClientError> {
        let client = HttpClient::from_config(cfg)?;
        info!(base_url = %client.base_url(), id_strategy = ?cfg.client.id_strategy, "qrs_client_ready");
        Ok(Self::new(client).with_id_strategy(cfg.client.id_strategy))
    }
}

impl<C: Client> QlikSense<C> {
    pub fn new(client: C) -> Self {
        Self::from_shared(Arc::new(client))
    }

    pub fn from_shared(client: Arc<C>) -> Self {
        Self { ctx: ServiceContext::new(client) }
    }

    /// Record every request issued through this instance into `log`.
    pub fn with_request_log(mut self, log: Arc<RequestLog>) -> Self {
        self.ctx = self.ctx.with_request_log(log);
        self
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.ctx = self.ctx.with_id_strategy(strategy);
        self
    }

    pub fn stream(&self) -> StreamService<C> {
        StreamService::new(self.ctx.clone())
    }

    pub fn user(&self) -> UserService<C> {
        UserService::new(self.ctx.clone())
    }

    pub fn app(&self) -> AppService<C> {
        AppService::new(self.ctx.clone())
    }

    pub fn client(&self) -> &Arc<C> {
        self.ctx.client()
    }

    pub fn request_log(&self) -> Option<&Arc<RequestLog>> {
        self.ctx.request_log()
    }
}
