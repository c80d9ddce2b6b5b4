// ── Cached item service ──
//
// Facade over one `ResourceClient` for the item collection. Reads go
// through an optional TTL cache, writes are validated locally first and
// invalidate what they make stale. The client lives behind an `ArcSwap`
// so the whole backend can be swapped without rebuilding the service.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use restcrud_api::{HttpTransport, Resource, ResourceClient, ResourceId, Transport};
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{DEFAULT_TTL, EphemeralCache};
use crate::error::CoreError;
use crate::model::{Item, ItemDraft, ItemPatch, item_form_rules};
use crate::validate::{FieldErrors, FormValidator};

const LIST_KEY: &str = "items:all";

fn item_key(id: &ResourceId) -> String {
    format!("items:{id}")
}

#[derive(Debug, Clone)]
enum Cached {
    List(Arc<Vec<Item>>),
    One(Item),
}

pub struct ItemService<T = HttpTransport> {
    client: ArcSwap<ResourceClient<T>>,
    cache: Option<EphemeralCache<Cached>>,
    rules: FormValidator,
}

impl<T: Transport> ItemService<T> {
    /// Service with a cache using [`DEFAULT_TTL`] and the item form rules.
    pub fn new(client: ResourceClient<T>) -> Self {
        Self {
            client: ArcSwap::from_pointee(client),
            cache: Some(EphemeralCache::with_default_ttl(DEFAULT_TTL)),
            rules: item_form_rules(),
        }
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Some(EphemeralCache::with_default_ttl(ttl));
        self
    }

    /// Every read goes to the backend.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: FormValidator) -> Self {
        self.rules = rules;
        self
    }

    /// Current client snapshot.
    pub fn client(&self) -> Arc<ResourceClient<T>> {
        self.client.load_full()
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Point the service at a different backend. Drops every cached entry.
    pub fn repoint(&self, client: ResourceClient<T>) {
        let path = client.path().to_owned();
        self.client.store(Arc::new(client));
        self.invalidate_all();
        info!(path, "item service repointed");
    }

    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Run the form rules against a draft without touching the backend.
    pub fn validate(&self, draft: &ItemDraft) -> FieldErrors {
        self.rules.validate(&draft.to_form())
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn list(&self) -> Result<Vec<Item>, CoreError> {
        if let Some(Cached::List(items)) = self.cached(LIST_KEY) {
            return Ok(items.as_ref().clone());
        }

        let records = self.client().list_all().await?;
        let items = decode_all(&records)?;
        self.store(LIST_KEY.to_owned(), Cached::List(Arc::new(items.clone())));
        Ok(items)
    }

    pub async fn get(&self, id: &ResourceId) -> Result<Item, CoreError> {
        let key = item_key(id);
        if let Some(Cached::One(item)) = self.cached(&key) {
            return Ok(item);
        }

        let record = self.client().get_by_id(id).await?;
        let item = Item::from_resource(&record)?;
        self.store(key, Cached::One(item.clone()));
        Ok(item)
    }

    /// Backend-side search. Never cached.
    pub async fn search(&self, query: &str) -> Result<Vec<Item>, CoreError> {
        let records = self.client().search(query).await?;
        decode_all(&records)
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn create(&self, draft: &ItemDraft) -> Result<Item, CoreError> {
        self.check(draft)?;
        let record = self.client().create(&draft.to_resource()).await?;
        let item = Item::from_resource(&record)?;
        self.forget(LIST_KEY);
        Ok(item)
    }

    /// Full replace. `None` when the backend acknowledged the write
    /// without echoing the record (e.g. `204 No Content`).
    pub async fn update(
        &self,
        id: &ResourceId,
        draft: &ItemDraft,
    ) -> Result<Option<Item>, CoreError> {
        self.check(draft)?;
        let answer = self.client().update(id, &draft.to_resource()).await?;
        self.refreshed(id, answer)
    }

    /// Partial update. Not validated: a patch may leave fields unset.
    pub async fn patch(
        &self,
        id: &ResourceId,
        patch: &ItemPatch,
    ) -> Result<Option<Item>, CoreError> {
        let answer = self.client().patch(id, &patch.to_resource()).await?;
        self.refreshed(id, answer)
    }

    pub async fn delete(&self, id: &ResourceId) -> Result<Value, CoreError> {
        let payload = self.client().delete(id).await?;
        self.forget(LIST_KEY);
        self.forget(&item_key(id));
        Ok(payload)
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    fn check(&self, draft: &ItemDraft) -> Result<(), CoreError> {
        self.rules
            .check(&draft.to_form())
            .map_err(|errors| {
                debug!(fields = errors.len(), "item rejected by form rules");
                CoreError::Invalid(errors)
            })
    }

    /// Cache the echoed record, or drop the stale entry when there is none.
    fn refreshed(&self, id: &ResourceId, answer: Value) -> Result<Option<Item>, CoreError> {
        self.forget(LIST_KEY);
        let Value::Object(record) = answer else {
            debug!(%id, "write acknowledged without a record");
            self.forget(&item_key(id));
            return Ok(None);
        };
        let item = Item::from_resource(&Resource::from(record))?;
        self.store(item_key(id), Cached::One(item.clone()));
        Ok(Some(item))
    }

    fn cached(&self, key: &str) -> Option<Cached> {
        self.cache.as_ref()?.get(key)
    }

    fn store(&self, key: String, value: Cached) {
        if let Some(cache) = &self.cache {
            cache.set(key, value);
        }
    }

    fn forget(&self, key: &str) {
        if let Some(cache) = &self.cache {
            cache.remove(key);
        }
    }
}

fn decode_all(records: &[Resource]) -> Result<Vec<Item>, CoreError> {
    records.iter().map(Item::from_resource).collect()
}
