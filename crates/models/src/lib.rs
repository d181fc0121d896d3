//! Typed records for the QRS resources wrapped by the service layer.
//!
//! Every resource comes as a condensed/full pair. The condensed record carries
//! identity fields only; the full record adds ownership and metadata and can
//! always be projected back to its condensed form.

pub mod errors;
pub mod entity;
pub mod shared;
pub mod stream;
pub mod user;
pub mod app;
pub mod request_log;

pub use entity::{Attributed, Attribution, Identified, QrsEntity};
pub use errors::ModelError;
pub use app::{App, AppCondensed};
pub use request_log::RecordedRequest;
pub use shared::{CustomPropertyDefinitionCondensed, CustomPropertyValue, TagCondensed};
pub use stream::{Stream, StreamCondensed};
pub use user::{User, UserAttribute, UserCondensed};
