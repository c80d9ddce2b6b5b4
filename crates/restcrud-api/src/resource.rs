// ── Resource records and identifiers ──

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── ResourceId ──────────────────────────────────────────────────────

/// Backend-assigned identifier: numeric or opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl ResourceId {
    /// Read an id out of a JSON value. `null`, objects and arrays are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(n.as_i64().map_or_else(|| Self::Text(n.to_string()), Self::Number)),
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for ResourceId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_owned()), Self::Number)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        match s.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(s),
        }
    }
}

// ── Resource ────────────────────────────────────────────────────────

/// A backend record in app field names.
///
/// No shape is imposed beyond the optional `id`; typed views are obtained
/// with [`Resource::to_typed`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize any record type into a `Resource`.
    ///
    /// Fails if `value` does not serialize to a JSON object.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(value)?)
    }

    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    pub fn id(&self) -> Option<ResourceId> {
        self.0.get("id").and_then(ResourceId::from_value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field rendered as text: strings verbatim, other scalars via JSON.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Resource {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        Value::Object(resource.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn id_parsing_prefers_numbers() {
        assert_eq!("42".parse::<ResourceId>().unwrap(), ResourceId::Number(42));
        assert_eq!(
            "abc-1".parse::<ResourceId>().unwrap(),
            ResourceId::Text("abc-1".into())
        );
        assert_eq!(ResourceId::from(String::from("7")), ResourceId::Number(7));
    }

    #[test]
    fn id_from_json_value() {
        assert_eq!(ResourceId::from_value(&json!(5)), Some(ResourceId::Number(5)));
        assert_eq!(
            ResourceId::from_value(&json!("x9")),
            Some(ResourceId::Text("x9".into()))
        );
        assert_eq!(ResourceId::from_value(&json!(null)), None);
        assert_eq!(ResourceId::from_value(&json!("")), None);
        assert_eq!(ResourceId::from_value(&json!({"id": 1})), None);
    }

    #[test]
    fn id_serializes_untagged() {
        assert_eq!(serde_json::to_value(ResourceId::Number(3)).unwrap(), json!(3));
        assert_eq!(
            serde_json::to_value(ResourceId::Text("a".into())).unwrap(),
            json!("a")
        );
    }

    #[test]
    fn resource_text_rendering() {
        let resource = Resource::new()
            .with("title", "Hello")
            .with("userId", 3)
            .with("note", Value::Null);
        assert_eq!(resource.text("title").as_deref(), Some("Hello"));
        assert_eq!(resource.text("userId").as_deref(), Some("3"));
        assert_eq!(resource.text("note"), None);
        assert_eq!(resource.text("missing"), None);
    }

    #[test]
    fn typed_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Post {
            id: i64,
            title: String,
        }

        let post = Post {
            id: 1,
            title: "x".into(),
        };
        let resource = Resource::from_serializable(&post).unwrap();
        assert_eq!(resource.id(), Some(ResourceId::Number(1)));
        assert_eq!(resource.to_typed::<Post>().unwrap(), post);
    }

    #[test]
    fn non_object_is_not_a_resource() {
        assert!(Resource::from_serializable(&vec![1, 2]).is_err());
    }
}
