//! Filter expressions for QRS collection endpoints.
//!
//! Renders the server's `field op 'value'` syntax. String values are quoted
//! with embedded single quotes doubled; ids are compared unquoted.

use std::fmt;

use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter(String);

impl Filter {
    /// `field eq 'value'`
    pub fn eq(field: &str, value: impl AsRef<str>) -> Self {
        Self::compare(field, "eq", value.as_ref())
    }

    /// `field ne 'value'`
    pub fn ne(field: &str, value: impl AsRef<str>) -> Self {
        Self::compare(field, "ne", value.as_ref())
    }

    /// `field sw 'value'` (starts with)
    pub fn starts_with(field: &str, value: impl AsRef<str>) -> Self {
        Self::compare(field, "sw", value.as_ref())
    }

    /// `field so 'value'` (substring of)
    pub fn contains(field: &str, value: impl AsRef<str>) -> Self {
        Self::compare(field, "so", value.as_ref())
    }

    /// `field eq <uuid>`
    pub fn eq_id(field: &str, id: Uuid) -> Self {
        Self(format!("{field} eq {id}"))
    }

    /// An expression passed through verbatim.
    pub fn raw(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn and(self, other: Filter) -> Self {
        Self(format!("{} and {}", self.0, other.0))
    }

    pub fn or(self, other: Filter) -> Self {
        Self(format!("({}) or ({})", self.0, other.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn compare(field: &str, op: &str, value: &str) -> Self {
        Self(format!("{field} {op} '{}'", value.replace('\'', "''")))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.0
    }
}
