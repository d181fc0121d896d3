use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// Anything that may carry a server id. Implemented by both the condensed and
/// the full record so deletes and lookups accept either view.
pub trait Identified {
    fn id(&self) -> Option<Uuid>;
}

/// A full-attribution QRS resource bound to a wire type name.
pub trait QrsEntity: Identified + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identity-only projection of this resource.
    type Condensed: Identified + Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Wire type name, used in `/qrs/<type>` and template lookups.
    const ENTITY_TYPE: &'static str;

    fn set_id(&mut self, id: Uuid);

    fn condensed(&self) -> Self::Condensed;

    /// Reject records the server would refuse before any request is sent.
    fn validate(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

/// Decode an explicit `null` as the field's default. Templates fetched without
/// list entries carry `null` for nested lists and strings.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which serialization view a query should produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Attribution {
    #[default]
    Condensed,
    Full,
}

impl Attribution {
    pub fn from_flag(full_attribution: bool) -> Self {
        if full_attribution { Self::Full } else { Self::Condensed }
    }

    pub fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }
}

impl From<bool> for Attribution {
    fn from(full_attribution: bool) -> Self {
        Self::from_flag(full_attribution)
    }
}

/// A record whose view was picked at run time.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Attributed<C, F> {
    Condensed(C),
    Full(F),
}

impl<C: Identified, F: Identified> Identified for Attributed<C, F> {
    fn id(&self) -> Option<Uuid> {
        match self {
            Attributed::Condensed(c) => c.id(),
            Attributed::Full(f) => f.id(),
        }
    }
}

impl<C, F> Attributed<C, F> {
    pub fn attribution(&self) -> Attribution {
        match self {
            Attributed::Condensed(_) => Attribution::Condensed,
            Attributed::Full(_) => Attribution::Full,
        }
    }

    pub fn as_full(&self) -> Option<&F> {
        match self {
            Attributed::Full(f) => Some(f),
            Attributed::Condensed(_) => None,
        }
    }

    pub fn into_full(self) -> Option<F> {
        match self {
            Attributed::Full(f) => Some(f),
            Attributed::Condensed(_) => None,
        }
    }
}

impl<F: QrsEntity> Attributed<F::Condensed, F> {
    /// Condensed view regardless of how the record was fetched.
    pub fn to_condensed(&self) -> F::Condensed {
        match self {
            Attributed::Condensed(c) => c.clone(),
            Attributed::Full(f) => f.condensed(),
        }
    }
}

impl Identified for Uuid {
    fn id(&self) -> Option<Uuid> {
        Some(*self)
    }
}
