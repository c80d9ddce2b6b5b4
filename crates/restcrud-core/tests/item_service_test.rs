#![allow(clippy::unwrap_used)]
// Integration tests for `ItemService` against a wiremock backend.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use restcrud_api::{EndpointConfig, ErrorKind, ResourceClient, ResourceId};
use restcrud_core::{CoreError, ItemDraft, ItemPatch, ItemService};

// ── Helpers ─────────────────────────────────────────────────────────

fn client(uri: &str) -> ResourceClient {
    let config = EndpointConfig::builder(uri)
        .endpoint("posts", "/posts")
        .build()
        .unwrap();
    ResourceClient::connect(&config, "posts").unwrap()
}

async fn setup() -> (MockServer, ItemService) {
    let server = MockServer::start().await;
    let service = ItemService::new(client(&server.uri()));
    (server, service)
}

fn post(id: i64, title: &str) -> serde_json::Value {
    json!({ "id": id, "title": title, "body": "Some body text", "userId": 1 })
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_is_cached() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post(1, "a"), post(2, "b")])))
        .expect(1)
        .mount(&server)
        .await;

    let first = service.list().await.unwrap();
    let second = service.list().await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_uncached_service_always_fetches() {
    let server = MockServer::start().await;
    let service = ItemService::new(client(&server.uri())).without_cache();

    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post(1, "a")))
        .expect(2)
        .mount(&server)
        .await;

    service.get(&ResourceId::Number(1)).await.unwrap();
    service.get(&ResourceId::Number(1)).await.unwrap();
}

#[tokio::test]
async fn test_cache_entries_expire() {
    let server = MockServer::start().await;
    let service =
        ItemService::new(client(&server.uri())).with_cache_ttl(Duration::from_millis(50));

    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post(1, "a")))
        .expect(2)
        .mount(&server)
        .await;

    service.get(&ResourceId::Number(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    service.get(&ResourceId::Number(1)).await.unwrap();
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/posts/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = service.get(&ResourceId::Number(999)).await.unwrap_err();
    assert_eq!(err.api_kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_search_is_not_cached() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post(3, "rust")])))
        .expect(2)
        .mount(&server)
        .await;

    assert_eq!(service.search("rust").await.unwrap().len(), 1);
    assert_eq!(service.search("rust").await.unwrap().len(), 1);
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_create_sends_nothing() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(post(1, "x")))
        .expect(0)
        .mount(&server)
        .await;

    let err = service.create(&ItemDraft::new("", "")).await.unwrap_err();
    let CoreError::Invalid(errors) = err else {
        panic!("expected validation failure, got {err:?}");
    };
    assert_eq!(errors.get("title").unwrap(), "Title is required");
    assert_eq!(errors.get("body").unwrap(), "Description is required");
}

#[tokio::test]
async fn test_create_invalidates_list() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post(1, "a")])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(post(101, "New title")))
        .expect(1)
        .mount(&server)
        .await;

    service.list().await.unwrap();
    let created = service
        .create(&ItemDraft::new("New title", "Some body text").user_id(1))
        .await
        .unwrap();
    assert_eq!(created.id, Some(ResourceId::Number(101)));
    service.list().await.unwrap();
}

#[tokio::test]
async fn test_update_refreshes_item_entry() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post(1, "old")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post(1, "Updated")))
        .expect(1)
        .mount(&server)
        .await;

    let id = ResourceId::Number(1);
    assert_eq!(service.get(&id).await.unwrap().title, "old");
    service
        .update(&id, &ItemDraft::new("Updated", "Some body text"))
        .await
        .unwrap();
    assert_eq!(service.get(&id).await.unwrap().title, "Updated");
}

#[tokio::test]
async fn test_patch_skips_validation() {
    let (server, service) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post(1, "x")))
        .expect(1)
        .mount(&server)
        .await;

    let patch = ItemPatch {
        title: Some("x".into()),
        ..ItemPatch::default()
    };
    let item = service.patch(&ResourceId::Number(1), &patch).await.unwrap();
    assert_eq!(item.unwrap().title, "x");
}

#[tokio::test]
async fn test_update_without_echo_evicts_item() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post(1, "a")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let id = ResourceId::Number(1);
    service.get(&id).await.unwrap();
    let answer = service
        .update(&id, &ItemDraft::new("Updated", "Some body text"))
        .await
        .unwrap();
    assert_eq!(answer, None);
    // The stale entry is gone, so this read goes back to the backend.
    service.get(&id).await.unwrap();
}

#[tokio::test]
async fn test_delete_evicts_item() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post(1, "a")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let id = ResourceId::Number(1);
    service.get(&id).await.unwrap();
    assert_eq!(service.delete(&id).await.unwrap(), json!({}));
    service.get(&id).await.unwrap();
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_repoint_switches_backend_and_clears_cache() {
    let (old, service) = setup().await;
    let new = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post(1, "old")])))
        .expect(1)
        .mount(&old)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post(9, "new")])))
        .expect(1)
        .mount(&new)
        .await;

    assert_eq!(service.list().await.unwrap()[0].title, "old");
    service.repoint(client(&new.uri()));
    assert_eq!(service.list().await.unwrap()[0].title, "new");
}
