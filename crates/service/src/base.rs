//! Request/response convention shared by every QRS resource.
//!
//! `BaseService<C, E>` is bound to `/qrs/<E::ENTITY_TYPE>` and turns typed
//! calls into exactly one request each. Nothing is retried or cached.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use configs::IdStrategy;
use models::{Attributed, Attribution, Identified, QrsEntity, RecordedRequest};

use crate::client::{Client, Method, QrsRequest, QrsResponse};
use crate::errors::ServiceError;
use crate::lookup::Lookup;
use crate::request_log::RequestLog;

const MAX_ERROR_BODY: usize = 512;

/// What every service needs: the client, an optional request log and the id
/// strategy for creates.
#[derive(Debug)]
pub struct ServiceContext<C> {
    client: Arc<C>,
    request_log: Option<Arc<RequestLog>>,
    id_strategy: IdStrategy,
}

impl<C> Clone for ServiceContext<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            request_log: self.request_log.clone(),
            id_strategy: self.id_strategy,
        }
    }
}

impl<C> ServiceContext<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client, request_log: None, id_strategy: IdStrategy::default() }
    }

    pub fn with_request_log(mut self, log: Arc<RequestLog>) -> Self {
        self.request_log = Some(log);
        self
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn request_log(&self) -> Option<&Arc<RequestLog>> {
        self.request_log.as_ref()
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }
}

/// Collection query parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    /// Server-side filter expression, see [`crate::Filter`].
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub privileges: Vec<String>,
    pub attribution: Attribution,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn privileges<I, S>(mut self, privileges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.privileges = privileges.into_iter().map(Into::into).collect();
        self
    }

    pub fn full_attribution(mut self, full: bool) -> Self {
        self.attribution = Attribution::from_flag(full);
        self
    }
}

pub struct BaseService<C, E> {
    ctx: ServiceContext<C>,
    url: String,
    _entity: PhantomData<fn() -> E>,
}

impl<C: Client, E: QrsEntity> BaseService<C, E> {
    pub fn new(ctx: ServiceContext<C>) -> Self {
        Self { ctx, url: format!("/qrs/{}", E::ENTITY_TYPE), _entity: PhantomData }
    }

    /// Collection endpoint, e.g. `/qrs/stream`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn entity_url(&self, id: Uuid) -> String {
        format!("{}/{id}", self.url)
    }

    pub fn context(&self) -> &ServiceContext<C> {
        &self.ctx
    }

    /// One round trip. Transport failures propagate; any status is returned.
    pub async fn call(&self, request: QrsRequest) -> Result<QrsResponse, ServiceError> {
        let method = request.method;
        let path = request.url.clone();
        let params = request.params.clone();
        let started = Instant::now();
        let result = self.ctx.client.call(request).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(resp) => debug!(%method, %path, status = resp.status, latency_ms, "qrs_request"),
            Err(e) => warn!(%method, %path, latency_ms, error = %e, "qrs_request_failed"),
        }

        if let Some(log) = &self.ctx.request_log {
            let (status, success, error_message) = match &result {
                Ok(resp) if resp.is_success() => (Some(resp.status), true, None),
                Ok(resp) => (Some(resp.status), false, Some(truncate(&resp.body))),
                Err(e) => (None, false, Some(e.to_string())),
            };
            log.record(RecordedRequest {
                method: method.to_string(),
                path,
                params,
                status,
                latency_ms,
                success,
                error_message,
                timestamp: Utc::now(),
            });
        }

        Ok(result?)
    }

    /// `call`, turning any non-2xx status into `ServiceError::Server`.
    pub async fn call_ok(&self, request: QrsRequest) -> Result<QrsResponse, ServiceError> {
        let method = request.method;
        let path = request.url.clone();
        let resp = self.call(request).await?;
        if resp.is_success() {
            Ok(resp)
        } else {
            Err(server_error(method, &path, &resp))
        }
    }

    /// `call_ok` and decode a non-empty JSON body.
    pub async fn fetch<T: DeserializeOwned>(&self, request: QrsRequest) -> Result<T, ServiceError> {
        let path = request.url.clone();
        let resp = self.call_ok(request).await?;
        if resp.is_empty() {
            return Err(ServiceError::Decode(format!("empty response from {path}")));
        }
        decode(&path, &resp)
    }

    /// Query the collection in the view `T` (condensed or full record).
    pub async fn query<T: DeserializeOwned>(&self, options: &QueryOptions) -> Result<Vec<T>, ServiceError> {
        let url = match options.attribution {
            Attribution::Full => format!("{}/full", self.url),
            Attribution::Condensed => self.url.clone(),
        };
        let request = QrsRequest::get(url.clone())
            .param_opt("filter", options.filter.as_deref())
            .param_opt("orderby", options.order_by.as_deref())
            .privileges(&options.privileges);
        let resp = self.call_ok(request).await?;
        if resp.is_empty() {
            return Ok(Vec::new());
        }
        decode(&url, &resp)
    }

    /// Query with the view picked from `options.attribution`.
    pub async fn query_attributed(
        &self,
        options: &QueryOptions,
    ) -> Result<Vec<Attributed<E::Condensed, E>>, ServiceError> {
        Ok(match options.attribution {
            Attribution::Condensed => self
                .query::<E::Condensed>(options)
                .await?
                .into_iter()
                .map(Attributed::Condensed)
                .collect(),
            Attribution::Full => self.query::<E>(options).await?.into_iter().map(Attributed::Full).collect(),
        })
    }

    /// First record matching `filter`, if any. Not unique-safe: with several
    /// matches the server's first element wins.
    pub async fn first(
        &self,
        filter: impl Into<String>,
        full_attribution: bool,
    ) -> Result<Lookup<Attributed<E::Condensed, E>>, ServiceError> {
        let options = QueryOptions::new().filter(filter).full_attribution(full_attribution);
        Ok(self.query_attributed(&options).await?.into_iter().next().into())
    }

    pub async fn get(&self, id: Uuid, privileges: &[&str]) -> Result<Lookup<E>, ServiceError> {
        let path = self.entity_url(id);
        let resp = self.call(QrsRequest::get(path.clone()).privileges(privileges)).await?;
        if resp.is_not_found() {
            return Ok(Lookup::NotFound);
        }
        if !resp.is_success() {
            return Err(server_error(Method::Get, &path, &resp));
        }
        decode(&path, &resp).map(Lookup::Found)
    }

    /// Server default instance of `E`. With `list_entries` nested references
    /// are populated with defaults instead of left null.
    pub async fn get_template(&self, list_entries: bool) -> Result<E, ServiceError> {
        let request = QrsRequest::get(format!("/qrs/about/api/default/{}", E::ENTITY_TYPE))
            .param("listentries", list_entries.to_string());
        self.fetch(request).await
    }

    /// Fresh id taken from a server template.
    pub async fn new_id(&self) -> Result<Uuid, ServiceError> {
        self.get_template(false)
            .await?
            .id()
            .ok_or_else(|| ServiceError::Decode(format!("{} template carries no id", E::ENTITY_TYPE)))
    }

    /// Give an id-less entity an id according to the configured strategy.
    pub async fn assign_id(&self, entity: &mut E) -> Result<(), ServiceError> {
        if entity.id().is_some() {
            return Ok(());
        }
        let id = match self.ctx.id_strategy {
            IdStrategy::Client => Uuid::new_v4(),
            IdStrategy::Template => self.new_id().await?,
        };
        entity.set_id(id);
        Ok(())
    }

    pub async fn create(&self, mut entity: E, privileges: &[&str]) -> Result<E, ServiceError> {
        entity.validate()?;
        self.assign_id(&mut entity).await?;
        let request = QrsRequest::post(self.url.clone()).privileges(privileges).json(&entity)?;
        self.fetch(request).await
    }

    /// Batch create; the result keeps the order of `entities`. A reply with a
    /// different number of records is a `ServiceError::Decode`.
    pub async fn create_many(&self, mut entities: Vec<E>, privileges: &[&str]) -> Result<Vec<E>, ServiceError> {
        for entity in &entities {
            entity.validate()?;
        }
        for entity in entities.iter_mut() {
            self.assign_id(entity).await?;
        }
        let request = QrsRequest::post(format!("{}/many", self.url)).privileges(privileges).json(&entities)?;
        let created: Vec<E> = self.fetch(request).await?;
        if created.len() != entities.len() {
            warn!(sent = entities.len(), received = created.len(), entity = E::ENTITY_TYPE, "create_many_count_mismatch");
            return Err(ServiceError::Decode(format!(
                "{}/many: sent {} records, received {}",
                self.url,
                entities.len(),
                created.len()
            )));
        }
        Ok(created)
    }

    /// Full replace of the entity stored under its id.
    pub async fn update(&self, entity: &E, privileges: &[&str]) -> Result<E, ServiceError> {
        entity.validate()?;
        let id = entity.id().ok_or_else(|| ServiceError::missing_id(E::ENTITY_TYPE))?;
        let request = QrsRequest::put(self.entity_url(id)).privileges(privileges).json(entity)?;
        self.fetch(request).await
    }

    /// Delete by id. A missing resource surfaces as `ServiceError::Server`.
    pub async fn delete<I: Identified + ?Sized>(&self, entity: &I) -> Result<(), ServiceError> {
        let id = entity.id().ok_or_else(|| ServiceError::missing_id(E::ENTITY_TYPE))?;
        self.call_ok(QrsRequest::delete(self.entity_url(id))).await?;
        Ok(())
    }

    /// Number of records matching `filter` (all when `None`).
    pub async fn count(&self, filter: Option<&str>) -> Result<u64, ServiceError> {
        let request = QrsRequest::get(format!("{}/count", self.url)).param_opt("filter", filter);
        let value: serde_json::Value = self.fetch(request).await?;
        value
            .as_u64()
            .or_else(|| value.get("value").and_then(serde_json::Value::as_u64))
            .ok_or_else(|| ServiceError::Decode(format!("unexpected count payload: {value}")))
    }
}

fn decode<T: DeserializeOwned>(path: &str, resp: &QrsResponse) -> Result<T, ServiceError> {
    resp.json().map_err(|e| ServiceError::Decode(format!("{path}: {e}")))
}

fn server_error(method: Method, path: &str, resp: &QrsResponse) -> ServiceError {
    ServiceError::Server {
        method: method.to_string(),
        path: path.to_string(),
        status: resp.status,
        message: truncate(&resp.body),
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
