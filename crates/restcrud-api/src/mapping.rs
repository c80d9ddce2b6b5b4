// Structural translation between app-side and backend-side record shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// App field name → backend field name.
///
/// Both directions are pure renames with no type coercion, and both are
/// lossy: outbound, app fields without an entry are dropped; inbound, only
/// backend fields named by an entry survive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(IndexMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, app_field: impl Into<String>, api_field: impl Into<String>) -> Self {
        self.0.insert(app_field.into(), api_field.into());
        self
    }

    pub fn api_field(&self, app_field: &str) -> Option<&str> {
        self.0.get(app_field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(app, api)| (app.as_str(), api.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rename an app-shaped record into backend field names.
    pub fn to_api(&self, record: &Map<String, Value>) -> Map<String, Value> {
        self.iter()
            .filter_map(|(app, api)| record.get(app).map(|v| (api.to_owned(), v.clone())))
            .collect()
    }

    /// Rename a backend record into app field names.
    pub fn from_api(&self, record: &Map<String, Value>) -> Map<String, Value> {
        self.iter()
            .filter_map(|(app, api)| record.get(api).map(|v| (app.to_owned(), v.clone())))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(app, api)| (app.into(), api.into()))
                .collect(),
        )
    }
}

/// How a backend shapes its response bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseStructure {
    data_wrapper: Option<String>,
    field_mapping: Option<FieldMapping>,
}

impl ResponseStructure {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_data_wrapper(mut self, key: impl Into<String>) -> Self {
        self.data_wrapper = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_field_mapping(mut self, mapping: FieldMapping) -> Self {
        self.field_mapping = Some(mapping);
        self
    }

    pub fn data_wrapper(&self) -> Option<&str> {
        self.data_wrapper.as_deref()
    }

    pub fn field_mapping(&self) -> Option<&FieldMapping> {
        self.field_mapping.as_ref()
    }

    /// Strip the configured wrapper key.
    ///
    /// Falls back to the whole body when the key is missing or `null`, so
    /// backends that only sometimes wrap still decode.
    pub fn unwrap_body(&self, body: Value) -> Value {
        let Some(key) = self.data_wrapper.as_deref() else {
            return body;
        };
        match body {
            Value::Object(mut map) => match map.remove(key) {
                Some(inner) if !inner.is_null() => inner,
                Some(inner) => {
                    map.insert(key.to_owned(), inner);
                    Value::Object(map)
                }
                None => Value::Object(map),
            },
            other => other,
        }
    }

    /// Backend record → app record. Identity when no mapping is configured.
    pub fn inbound(&self, record: Map<String, Value>) -> Map<String, Value> {
        match self.field_mapping {
            Some(ref mapping) => mapping.from_api(&record),
            None => record,
        }
    }

    /// App record → backend record. Identity when no mapping is configured.
    pub fn outbound(&self, record: &Map<String, Value>) -> Map<String, Value> {
        match self.field_mapping {
            Some(ref mapping) => mapping.to_api(record),
            None => record.clone(),
        }
    }
}
