use tracing::{info, instrument};
use uuid::Uuid;

use models::{App, AppCondensed, Attributed, Identified};

use crate::base::{BaseService, QueryOptions, ServiceContext};
use crate::client::{Client, QrsRequest};
use crate::errors::ServiceError;
use crate::filter::Filter;
use crate::lookup::Lookup;

pub type AppRecord = Attributed<AppCondensed, App>;

/// Apps under `/qrs/app`. The server creates apps through import or copy,
/// so there is no plain create here.
pub struct AppService<C> {
    base: BaseService<C, App>,
}

impl<C: Client> AppService<C> {
    pub fn new(ctx: ServiceContext<C>) -> Self {
        Self { base: BaseService::new(ctx) }
    }

    pub fn base(&self) -> &BaseService<C, App> {
        &self.base
    }

    #[instrument(skip(self), fields(filter = options.filter.as_deref()))]
    pub async fn query(&self, options: &QueryOptions) -> Result<Vec<AppRecord>, ServiceError> {
        self.base.query_attributed(options).await
    }

    /// First app named `name`; not unique-safe.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str, full_attribution: bool) -> Result<Lookup<AppRecord>, ServiceError> {
        self.base.first(Filter::eq("name", name), full_attribution).await
    }

    #[instrument(skip(self, privileges))]
    pub async fn get(&self, id: Uuid, privileges: &[&str]) -> Result<Lookup<App>, ServiceError> {
        self.base.get(id, privileges).await
    }

    pub async fn get_template(&self, list_entries: bool) -> Result<App, ServiceError> {
        self.base.get_template(list_entries).await
    }

    /// Server-side copy of `app`, optionally renamed. The copy is unpublished
    /// and owned by the calling user.
    #[instrument(skip_all, fields(source = ?app.id(), name = ?name))]
    pub async fn copy<I: Identified + ?Sized>(&self, app: &I, name: Option<&str>) -> Result<App, ServiceError> {
        let id = app.id().ok_or_else(|| ServiceError::missing_id("app"))?;
        let request = QrsRequest::post(format!("{}/copy", self.base.entity_url(id))).param_opt("name", name);
        let copied: App = self.base.fetch(request).await?;
        info!(source = %id, id = ?copied.id, name = %copied.name, "app_copied");
        Ok(copied)
    }

    /// Publish `app` to `stream`, optionally renaming it on the way.
    #[instrument(skip_all, fields(app = ?app.id(), stream = ?stream.id()))]
    pub async fn publish<A, S>(&self, app: &A, stream: &S, name: Option<&str>) -> Result<App, ServiceError>
    where
        A: Identified + ?Sized,
        S: Identified + ?Sized,
    {
        let id = app.id().ok_or_else(|| ServiceError::missing_id("app"))?;
        let stream_id = stream.id().ok_or_else(|| ServiceError::missing_id("stream"))?;
        let request = QrsRequest::put(format!("{}/publish", self.base.entity_url(id)))
            .param("stream", stream_id.to_string())
            .param_opt("name", name);
        let published: App = self.base.fetch(request).await?;
        info!(id = %id, stream = %stream_id, "app_published");
        Ok(published)
    }

    #[instrument(skip(self, app, privileges), fields(id = ?app.id))]
    pub async fn update(&self, app: &App, privileges: &[&str]) -> Result<App, ServiceError> {
        let updated = self.base.update(app, privileges).await?;
        info!(id = ?updated.id, "app_updated");
        Ok(updated)
    }

    #[instrument(skip_all, fields(id = ?app.id()))]
    pub async fn delete<I: Identified + ?Sized>(&self, app: &I) -> Result<(), ServiceError> {
        self.base.delete(app).await?;
        info!(id = ?app.id(), "app_deleted");
        Ok(())
    }

    pub async fn count(&self, filter: Option<&str>) -> Result<u64, ServiceError> {
        self.base.count(filter).await
    }
}
