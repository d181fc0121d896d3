//! Service layer wrapping the QRS management API behind typed, per-resource
//! services.
//! - `client` is the transport seam: a `Client` trait plus the reqwest-backed
//!   `HttpClient`.
//! - `base` holds the request/response convention shared by every resource.
//! - `stream_service`, `user_service` and `app_service` bind it to one
//!   resource each and add resource-specific lookups.
//! - `QlikSense` is the entry point handing out the services.

pub mod errors;
pub mod client;
pub mod filter;
pub mod lookup;
pub mod request_log;
pub mod base;
pub mod stream_service;
pub mod user_service;
pub mod app_service;
pub mod qlik_sense;
#[cfg(test)]
pub mod test_support;

pub use base::{BaseService, QueryOptions, ServiceContext};
pub use client::{Client, ClientError, HttpClient, Method, QrsRequest, QrsResponse};
pub use configs::IdStrategy;
pub use errors::ServiceError;
pub use filter::Filter;
pub use lookup::Lookup;
pub use qlik_sense::QlikSense;
pub use request_log::RequestLog;
pub use stream_service::StreamService;
pub use user_service::UserService;
pub use app_service::AppService;
