use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Identified, QrsEntity};
use crate::errors::ModelError;
use crate::shared::{CustomPropertyValue, TagCondensed};
use crate::user::UserCondensed;

/// Limited attribution view of a stream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCondensed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<String>>,
}

/// Full attribution view of a stream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserCondensed>,
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

impl Stream {
    /// A new, id-less stream; the id is assigned on create.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_owner(mut self, owner: impl Into<UserCondensed>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl Identified for StreamCondensed {
    fn id(&self) -> Option<Uuid> { self.id }
}

impl Identified for Stream {
    fn id(&self) -> Option<Uuid> { self.id }
}

impl QrsEntity for Stream {
    type Condensed = StreamCondensed;

    const ENTITY_TYPE: &'static str = "stream";

    fn set_id(&mut self, id: Uuid) { self.id = Some(id); }

    fn condensed(&self) -> StreamCondensed {
        StreamCondensed { id: self.id, name: self.name.clone(), privileges: self.privileges.clone() }
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::required("stream", "name"));
        }
        Ok(())
    }
}

impl From<&Stream> for StreamCondensed {
    fn from(stream: &Stream) -> Self { stream.condensed() }
}

impl From<Stream> for StreamCondensed {
    fn from(stream: Stream) -> Self { stream.condensed() }
}
