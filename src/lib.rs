//! Typed client for the Qlik Sense Repository Service (QRS) management API.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! qrs_client::init_logging_default();
//! let qs = qrs_client::connect_from_env()?;
//! let streams = qs.stream().query(&qrs_client::QueryOptions::new()).await?;
//! println!("{} streams", streams.len());
//! # Ok(())
//! # }
//! ```

pub use common::utils::logging::{init_logging_default, init_logging_json};
pub use configs::{AppConfig, AuthMode, IdStrategy};
pub use models::{
    App, AppCondensed, Attributed, Attribution, Identified, ModelError, QrsEntity, RecordedRequest, Stream,
    StreamCondensed, User, UserCondensed,
};
pub use service::{
    AppService, BaseService, Client, ClientError, Filter, HttpClient, Lookup, QlikSense, QrsRequest, QrsResponse,
    QueryOptions, RequestLog, ServiceError, StreamService, UserService,
};

/// Build a facade over HTTP from already validated configuration.
pub fn connect(cfg: &AppConfig) -> anyhow::Result<QlikSense<HttpClient>> {
    let qs = QlikSense::from_config(cfg)?;
    tracing::info!(host = %cfg.server.host, port = cfg.server.port, "qrs_connected");
    Ok(qs)
}

/// Load `.env` and `CONFIG_PATH`, apply `QRS_*` overrides, then connect.
pub fn connect_from_env() -> anyhow::Result<QlikSense<HttpClient>> {
    let cfg = AppConfig::load_and_validate()?;
    connect(&cfg)
}
