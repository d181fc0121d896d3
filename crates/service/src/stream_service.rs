use tracing::{info, instrument};
use uuid::Uuid;

use models::{Attributed, Identified, Stream, StreamCondensed};

use crate::base::{BaseService, QueryOptions, ServiceContext};
use crate::client::Client;
use crate::errors::ServiceError;
use crate::filter::Filter;
use crate::lookup::Lookup;

pub type StreamRecord = Attributed<StreamCondensed, Stream>;

/// Streams under `/qrs/stream`.
pub struct StreamService<C> {
    base: BaseService<C, Stream>,
}

impl<C: Client> StreamService<C> {
    pub fn new(ctx: ServiceContext<C>) -> Self {
        Self { base: BaseService::new(ctx) }
    }

    pub fn base(&self) -> &BaseService<C, Stream> {
        &self.base
    }

    #[instrument(skip(self), fields(filter = options.filter.as_deref()))]
    pub async fn query(&self, options: &QueryOptions) -> Result<Vec<StreamRecord>, ServiceError> {
        self.base.query_attributed(options).await
    }

    /// First stream named `name`. Names are not unique on the server, so with
    /// duplicates any one of them may come back.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str, full_attribution: bool) -> Result<Lookup<StreamRecord>, ServiceError> {
        self.base.first(Filter::eq("name", name), full_attribution).await
    }

    #[instrument(skip(self, privileges))]
    pub async fn get(&self, id: Uuid, privileges: &[&str]) -> Result<Lookup<Stream>, ServiceError> {
        self.base.get(id, privileges).await
    }

    pub async fn get_template(&self, list_entries: bool) -> Result<Stream, ServiceError> {
        self.base.get_template(list_entries).await
    }

    /// Pre-allocate an id from a server template.
    pub async fn get_new_id(&self) -> Result<Uuid, ServiceError> {
        self.base.new_id().await
    }

    #[instrument(skip(self, stream, privileges), fields(name = %stream.name))]
    pub async fn create(&self, stream: Stream, privileges: &[&str]) -> Result<Stream, ServiceError> {
        let created = self.base.create(stream, privileges).await?;
        info!(id = ?created.id, name = %created.name, "stream_created");
        Ok(created)
    }

    #[instrument(skip_all, fields(count = streams.len()))]
    pub async fn create_many(&self, streams: Vec<Stream>, privileges: &[&str]) -> Result<Vec<Stream>, ServiceError> {
        let created = self.base.create_many(streams, privileges).await?;
        info!(count = created.len(), "streams_created");
        Ok(created)
    }

    #[instrument(skip(self, stream, privileges), fields(id = ?stream.id))]
    pub async fn update(&self, stream: &Stream, privileges: &[&str]) -> Result<Stream, ServiceError> {
        let updated = self.base.update(stream, privileges).await?;
        info!(id = ?updated.id, "stream_updated");
        Ok(updated)
    }

    #[instrument(skip_all, fields(id = ?stream.id()))]
    pub async fn delete<I: Identified + ?Sized>(&self, stream: &I) -> Result<(), ServiceError> {
        self.base.delete(stream).await?;
        info!(id = ?stream.id(), "stream_deleted");
        Ok(())
    }

    pub async fn count(&self, filter: Option<&str>) -> Result<u64, ServiceError> {
        self.base.count(filter).await
    }
}
