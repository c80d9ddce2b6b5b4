// ── Local list utilities ──
//
// In-memory filtering, sorting and display helpers over already-fetched
// records. None of these touch the network; backend-side search lives on
// the resource client.

use std::cmp::Ordering;

use restcrud_api::Resource;

use crate::model::Item;

/// Fields `filter_by_search` looks at when the caller names none.
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &["title", "body"];

/// Default cut-off for [`truncate_text`].
pub const DEFAULT_TRUNCATE: usize = 100;

/// Read access to a record's fields as text.
pub trait FieldText {
    fn field_text(&self, field: &str) -> Option<String>;
}

impl FieldText for Resource {
    fn field_text(&self, field: &str) -> Option<String> {
        self.text(field)
    }
}

impl FieldText for Item {
    fn field_text(&self, field: &str) -> Option<String> {
        match field {
            "id" => self.id.as_ref().map(ToString::to_string),
            "title" => Some(self.title.clone()),
            "body" => Some(self.body.clone()),
            "userId" | "user_id" => self.user_id.map(|id| id.to_string()),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Records where any of `fields` contains `query`, ignoring case.
///
/// A blank query keeps everything. An empty `fields` slice means
/// [`DEFAULT_SEARCH_FIELDS`].
pub fn filter_by_search<R: FieldText + Clone>(records: &[R], query: &str, fields: &[&str]) -> Vec<R> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    let fields = if fields.is_empty() {
        DEFAULT_SEARCH_FIELDS
    } else {
        fields
    };

    records
        .iter()
        .filter(|record| {
            fields.iter().any(|field| {
                record
                    .field_text(field)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect()
}

/// Stable in-place sort by a field's text. Missing fields sort as empty.
pub fn sort_by_field<R: FieldText>(records: &mut [R], field: &str, order: SortOrder) {
    records.sort_by(|a, b| {
        let ord = compare(a.field_text(field), b.field_text(field));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn compare(a: Option<String>, b: Option<String>) -> Ordering {
    a.unwrap_or_default().cmp(&b.unwrap_or_default())
}

/// Cut `text` to `max` characters, trim, and append `...`.
///
/// Text already within `max` is returned unchanged.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let head: String = text.chars().take(max).collect();
    format!("{}...", head.trim())
}
