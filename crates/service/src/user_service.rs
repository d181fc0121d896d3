use tracing::{info, instrument};
use uuid::Uuid;

use models::{Attributed, Identified, User, UserCondensed};

use crate::base::{BaseService, QueryOptions, ServiceContext};
use crate::client::Client;
use crate::errors::ServiceError;
use crate::filter::Filter;
use crate::lookup::Lookup;

pub type UserRecord = Attributed<UserCondensed, User>;

/// Users under `/qrs/user`.
pub struct UserService<C> {
    base: BaseService<C, User>,
}

impl<C: Client> UserService<C> {
    pub fn new(ctx: ServiceContext<C>) -> Self {
        Self { base: BaseService::new(ctx) }
    }

    pub fn base(&self) -> &BaseService<C, User> {
        &self.base
    }

    #[instrument(skip(self), fields(filter = options.filter.as_deref()))]
    pub async fn query(&self, options: &QueryOptions) -> Result<Vec<UserRecord>, ServiceError> {
        self.base.query_attributed(options).await
    }

    /// Look a user up by login name within a directory.
    #[instrument(skip(self))]
    pub async fn get_by_user_name(
        &self,
        user_directory: &str,
        user_name: &str,
        full_attribution: bool,
    ) -> Result<Lookup<UserRecord>, ServiceError> {
        let filter = Filter::eq("userId", user_name).and(Filter::eq("userDirectory", user_directory));
        self.base.first(filter, full_attribution).await
    }

    #[instrument(skip(self, privileges))]
    pub async fn get(&self, id: Uuid, privileges: &[&str]) -> Result<Lookup<User>, ServiceError> {
        self.base.get(id, privileges).await
    }

    pub async fn get_template(&self, list_entries: bool) -> Result<User, ServiceError> {
        self.base.get_template(list_entries).await
    }

    pub async fn get_new_id(&self) -> Result<Uuid, ServiceError> {
        self.base.new_id().await
    }

    #[instrument(skip(self, user, privileges), fields(user = %user.qualified_name()))]
    pub async fn create(&self, user: User, privileges: &[&str]) -> Result<User, ServiceError> {
        let created = self.base.create(user, privileges).await?;
        info!(id = ?created.id, user = %created.qualified_name(), "user_created");
        Ok(created)
    }

    #[instrument(skip_all, fields(count = users.len()))]
    pub async fn create_many(&self, users: Vec<User>, privileges: &[&str]) -> Result<Vec<User>, ServiceError> {
        let created = self.base.create_many(users, privileges).await?;
        info!(count = created.len(), "users_created");
        Ok(created)
    }

    #[instrument(skip(self, user, privileges), fields(id = ?user.id))]
    pub async fn update(&self, user: &User, privileges: &[&str]) -> Result<User, ServiceError> {
        let updated = self.base.update(user, privileges).await?;
        info!(id = ?updated.id, "user_updated");
        Ok(updated)
    }

    #[instrument(skip_all, fields(id = ?user.id()))]
    pub async fn delete<I: Identified + ?Sized>(&self, user: &I) -> Result<(), ServiceError> {
        self.base.delete(user).await?;
        info!(id = ?user.id(), "user_deleted");
        Ok(())
    }

    pub async fn count(&self, filter: Option<&str>) -> Result<u64, ServiceError> {
        self.base.count(filter).await
    }
}
