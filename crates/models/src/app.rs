use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Identified, QrsEntity};
use crate::errors::ModelError;
use crate::shared::{CustomPropertyValue, TagCondensed};
use crate::stream::StreamCondensed;
use crate::user::UserCondensed;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppCondensed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamCondensed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_in_product_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamCondensed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_in_product_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserCondensed>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reload_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by_user_name: Option<String>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub custom_properties: Vec<CustomPropertyValue>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub tags: Vec<TagCondensed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,
}

impl Identified for AppCondensed {
    fn id(&self) -> Option<Uuid> { self.id }
}

impl Identified for App {
    fn id(&self) -> Option<Uuid> { self.id }
}

impl QrsEntity for App {
    type Condensed = AppCondensed;

    const ENTITY_TYPE: &'static str = "app";

    fn set_id(&mut self, id: Uuid) { self.id = Some(id); }

    fn condensed(&self) -> AppCondensed {
        AppCondensed {
            id: self.id,
            name: self.name.clone(),
            app_id: self.app_id.clone(),
            publish_time: self.publish_time,
            published: self.published,
            stream: self.stream.clone(),
            saved_in_product_version: self.saved_in_product_version.clone(),
            availability_status: self.availability_status,
            privileges: self.privileges.clone(),
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::required("app", "name"));
        }
        Ok(())
    }
}

impl From<&App> for AppCondensed {
    fn from(app: &App) -> Self { app.condensed() }
}
