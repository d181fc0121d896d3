use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Identified, QrsEntity};
use crate::errors::ModelError;
use crate::shared::{CustomPropertyValue, TagCondensed};

/// Limited attribution view of a user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCondensed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Login name within the directory (`userId` on the wire).
    #[serde(rename = "userId", default, deserialize_with = "crate::entity::null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub user_directory: String,
    /// Display name.
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub attribute_type: String,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub attribute_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// Full attribution view of a user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "userId", default, deserialize_with = "crate::entity::null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub user_directory: String,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<String>>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub attributes: Vec<UserAttribute>,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub inactive: bool,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub removed_externally: bool,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub blacklisted: bool,
    #[serde(default, deserialize_with = "crate::entity::null_as_default")]
    pub delete_prohibited: bool,
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

impl User {
    /// A new, id-less user; the display name defaults to the login name.
    pub fn new(user_name: impl Into<String>, user_directory: impl Into<String>) -> Self {
        let user_name = user_name.into();
        Self {
            name: user_name.clone(),
            user_name,
            user_directory: user_directory.into(),
            ..Self::default()
        }
    }

    /// `DIRECTORY\user` form used by the server in audit fields.
    pub fn qualified_name(&self) -> String {
        format!("{}\\{}", self.user_directory, self.user_name)
    }
}

impl Identified for UserCondensed {
    fn id(&self) -> Option<Uuid> { self.id }
}

impl Identified for User {
    fn id(&self) -> Option<Uuid> { self.id }
}

impl QrsEntity for User {
    type Condensed = UserCondensed;

    const ENTITY_TYPE: &'static str = "user";

    fn set_id(&mut self, id: Uuid) { self.id = Some(id); }

    fn condensed(&self) -> UserCondensed {
        UserCondensed {
            id: self.id,
            user_name: self.user_name.clone(),
            user_directory: self.user_directory.clone(),
            name: self.name.clone(),
            privileges: self.privileges.clone(),
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.user_name.trim().is_empty() {
            return Err(ModelError::required("user", "userId"));
        }
        if self.user_directory.trim().is_empty() {
            return Err(ModelError::required("user", "userDirectory"));
        }
        Ok(())
    }
}

impl From<&User> for UserCondensed {
    fn from(user: &User) -> Self { user.condensed() }
}

impl From<User> for UserCondensed {
    fn from(user: User) -> Self { user.condensed() }
}
