//! Service-reported errors carried in the `errors` field of a response envelope.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Deref;

/// A position in the query document that an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "null_as_default")]
    pub line: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub column: i64,
}

/// One segment of a response path: an object key or a list index.
///
/// Anything else a service puts in a path (e.g. an index written as `1.0`) is kept
/// verbatim in [`PathSegment::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(i64),
    Other(Value),
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Other(v) => write!(f, "{}", v),
        }
    }
}

/// An error reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    /// Locations in the query document that caused the error, when the service can
    /// associate it with a particular point.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub locations: Vec<Location>,
    /// Key path of the response field that experienced the error. Lets callers tell an
    /// intentional null apart from one caused by a runtime failure.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub path: Vec<PathSegment>,
    /// Service-defined metadata such as an error code.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Map::is_empty"
    )]
    pub extensions: Map<String, Value>,
}

impl GraphQlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: Map::new(),
        }
    }

    /// Convenience lookup of `extensions.code`, the most common extension key.
    pub fn code(&self) -> Option<&str> {
        self.extensions.get("code").and_then(|v| v.as_str())
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graphql: {}", self.message)
    }
}

impl std::error::Error for GraphQlError {}

/// Ordered, composite set of service errors. Treated as a single error value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphQlErrors(Vec<GraphQlError>);

impl GraphQlErrors {
    pub fn into_inner(self) -> Vec<GraphQlError> {
        self.0
    }
}

impl From<Vec<GraphQlError>> for GraphQlErrors {
    fn from(errors: Vec<GraphQlError>) -> Self {
        Self(errors)
    }
}

impl Deref for GraphQlErrors {
    type Target = [GraphQlError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for GraphQlErrors {
    type Item = GraphQlError;
    type IntoIter = std::vec::IntoIter<GraphQlError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a GraphQlErrors {
    type Item = &'a GraphQlError;
    type IntoIter = std::slice::Iter<'a, GraphQlError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for GraphQlErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no errors");
        }
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "graphql: {}", messages.join("; "))
    }
}

impl std::error::Error for GraphQlErrors {}
