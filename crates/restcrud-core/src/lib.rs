//! Item service and client-side helpers on top of `restcrud-api`.
//!
//! - **[`ItemService`]** wraps a [`ResourceClient`](restcrud_api::ResourceClient)
//!   with read-through caching, local validation before writes and cache
//!   invalidation after them. [`ItemService::repoint`] swaps the backend
//!   atomically.
//! - **[`EphemeralCache`]** is a concurrent string-keyed TTL cache with lazy
//!   expiry.
//! - **[`FormValidator`]** evaluates ordered per-field [`Rule`]s and reports
//!   the first failure per field.
//! - **[`listing`]** holds local filter/sort/truncate helpers for fetched
//!   records.

pub mod cache;
pub mod error;
pub mod listing;
pub mod model;
pub mod service;
pub mod validate;

pub use cache::{DEFAULT_TTL, EphemeralCache};
pub use error::CoreError;
pub use listing::{FieldText, SortOrder, filter_by_search, sort_by_field, truncate_text};
pub use model::{Item, ItemDraft, ItemPatch, item_form_rules};
pub use service::ItemService;
pub use validate::{FieldErrors, FormData, FormValidator, Rule, RuleKind};
