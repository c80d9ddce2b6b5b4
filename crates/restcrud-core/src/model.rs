// ── Item domain model ──
//
// The record shape the bundled screens and CLI work with: a titled text
// item owned by a user. Field names are the app's (`userId`); backend
// naming differences are handled by the endpoint's field mapping.

use restcrud_api::{Resource, ResourceId};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::validate::{FormData, FormValidator, Rule};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const BODY_MIN: usize = 10;

/// A stored item as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl Item {
    pub fn from_resource(resource: &Resource) -> Result<Self, CoreError> {
        resource
            .to_typed()
            .map_err(|source| CoreError::Decode { what: "item", source })
    }
}

/// Payload for create and full update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id: None,
        }
    }

    #[must_use]
    pub fn user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Form view used by [`item_form_rules`].
    pub fn to_form(&self) -> FormData {
        FormData::from([
            ("title".to_owned(), self.title.clone()),
            ("body".to_owned(), self.body.clone()),
        ])
    }

    pub fn to_resource(&self) -> Resource {
        let mut resource = Resource::new()
            .with("title", self.title.as_str())
            .with("body", self.body.as_str());
        if let Some(user_id) = self.user_id {
            resource = resource.with("userId", user_id);
        }
        resource
    }
}

impl From<&Item> for ItemDraft {
    fn from(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            body: item.body.clone(),
            user_id: item.user_id,
        }
    }
}

/// Partial update. Unset fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.user_id.is_none()
    }

    pub fn to_resource(&self) -> Resource {
        let mut resource = Resource::new();
        if let Some(title) = &self.title {
            resource.insert("title", title.as_str().into());
        }
        if let Some(body) = &self.body {
            resource.insert("body", body.as_str().into());
        }
        if let Some(user_id) = self.user_id {
            resource.insert("userId", user_id.into());
        }
        resource
    }
}

/// Rules for the item create/edit form.
pub fn item_form_rules() -> FormValidator {
    FormValidator::new()
        .field(
            "title",
            [
                Rule::required().message("Title is required"),
                Rule::min_length(TITLE_MIN)
                    .message(format!("Title must be at least {TITLE_MIN} characters")),
                Rule::max_length(TITLE_MAX)
                    .message(format!("Title must be no more than {TITLE_MAX} characters")),
            ],
        )
        .field(
            "body",
            [
                Rule::required().message("Description is required"),
                Rule::min_length(BODY_MIN)
                    .message(format!("Description must be at least {BODY_MIN} characters")),
            ],
        )
}
