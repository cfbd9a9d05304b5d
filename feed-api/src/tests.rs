use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use feed_domain::identity::ActorIdentity;
use feed_domain::item::{
    FeedPage, ItemKind, ItemView, Membership, NewItem, Scope, UserProfile,
};
use feed_domain::memory::MemoryFeedStore;
use feed_domain::ports::FeedStore;
use feed_domain::service::FeedService;

use crate::config::AppConfig;
use crate::routes;
use crate::session::StaticTokenSessions;
use crate::state::AppState;

const SCOPE: &str = "scope-1";
const ALICE_TOKEN: &str = "alice-token";
const BOB_TOKEN: &str = "bob-token";
const MALLORY_TOKEN: &str = "mallory-token";

fn test_config() -> AppConfig {
    AppConfig {
        app_env: "test".to_string(),
        port: 0,
        log_level: "info".to_string(),
        session_tokens: String::new(),
    }
}

/// One scope with 25 seeded items at timestamps 1000..1025. Alice has been a
/// member from the start, Bob joined at 1010, Mallory never joined.
async fn test_app() -> Router {
    let store = MemoryFeedStore::new();

    for (user_id, username) in [
        ("alice", "alice"),
        ("bob", "bob"),
        ("mallory", "mallory"),
    ] {
        store
            .create_user(&UserProfile {
                id: user_id.to_string(),
                username: username.to_string(),
            })
            .await
            .expect("seed user");
    }

    store
        .put_scope(&Scope {
            id: SCOPE.to_string(),
            name: "general".to_string(),
            deleted_at_ms: None,
        })
        .await
        .expect("seed scope");

    for (user_id, joined_at_ms) in [("alice", 0), ("bob", 1010)] {
        store
            .upsert_membership(&Membership {
                scope_id: SCOPE.to_string(),
                user_id: user_id.to_string(),
                joined_at_ms,
            })
            .await
            .expect("seed membership");
    }

    for i in 0..25 {
        store
            .insert_item(&NewItem {
                scope_id: SCOPE.to_string(),
                author_id: "alice".to_string(),
                content: format!("item {i:02}"),
                kind: ItemKind::Text,
                created_at_ms: Some(1000 + i),
                thread_level: 0,
                parent_id: None,
            })
            .await
            .expect("seed item");
    }

    let sessions = StaticTokenSessions::new()
        .with_token(ALICE_TOKEN, ActorIdentity::with_user_id("alice"))
        .with_token(BOB_TOKEN, ActorIdentity::with_user_id("bob"))
        .with_token(MALLORY_TOKEN, ActorIdentity::with_user_id("mallory"));

    let state = AppState::with_parts(
        test_config(),
        FeedService::new(Arc::new(store)),
        Arc::new(sessions),
    );
    routes::router(state)
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn post_json(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn body_page(response: axum::response::Response) -> FeedPage {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("feed page")
}

fn items_path() -> String {
    format!("/v1/scopes/{SCOPE}/items")
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_app().await;
    let response = app.oneshot(get(&items_path(), None)).await.expect("send");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = test_app().await;
    let response = app
        .oneshot(get(&items_path(), Some("no-such-token")))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn outsider_is_forbidden() {
    let app = test_app().await;
    let response = app
        .oneshot(get(&items_path(), Some(MALLORY_TOKEN)))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "forbidden");
}

#[tokio::test]
async fn malformed_cursor_is_bad_request() {
    let app = test_app().await;
    let path = format!("{}?cursor=not-a-cursor", items_path());
    let response = app
        .oneshot(get(&path, Some(ALICE_TOKEN)))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn unknown_direction_is_bad_request() {
    let app = test_app().await;
    let path = format!("{}?direction=sideways", items_path());
    let response = app
        .oneshot(get(&path, Some(ALICE_TOKEN)))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_item_round_trips_through_the_feed() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            &items_path(),
            Some(ALICE_TOKEN),
            json!({ "content": "hello there" }),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let view: ItemView = serde_json::from_slice(&bytes).expect("item view");
    assert!(!view.id.is_empty());
    assert_eq!(view.content, "hello there");
    assert_eq!(view.author.username, "alice");
    assert_eq!(view.estimated_height, 80);

    let response = app
        .oneshot(get(&items_path(), Some(ALICE_TOKEN)))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_page(response).await;
    assert_eq!(
        page.items.last().map(|item| item.id.as_str()),
        Some(view.id.as_str())
    );
}

#[tokio::test]
async fn older_walk_reconstructs_the_feed_over_http() {
    let app = test_app().await;

    let mut collected: Vec<ItemView> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut first = true;

    loop {
        let path = match &cursor {
            Some(cursor) => format!("{}?limit=10&cursor={cursor}", items_path()),
            None => format!("{}?limit=10", items_path()),
        };
        let response = app
            .clone()
            .oneshot(get(&path, Some(ALICE_TOKEN)))
            .await
            .expect("send");
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_page(response).await;

        if first {
            assert_eq!(page.total_count, Some(25));
            first = false;
        } else {
            assert_eq!(page.total_count, None);
        }

        let mut older = page.items;
        older.extend(collected);
        collected = older;

        match page.next_cursor {
            Some(next) => {
                assert!(page.has_more);
                cursor = Some(next);
            }
            None => {
                assert!(!page.has_more);
                break;
            }
        }
    }

    assert_eq!(collected.len(), 25);
    let contents: Vec<&str> = collected.iter().map(|item| item.content.as_str()).collect();
    let expected: Vec<String> = (0..25).map(|i| format!("item {i:02}")).collect();
    assert_eq!(contents, expected);
}

#[tokio::test]
async fn join_time_limits_what_a_member_sees() {
    let app = test_app().await;
    let path = format!("{}?limit=100", items_path());
    let response = app
        .oneshot(get(&path, Some(BOB_TOKEN)))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_page(response).await;

    // Bob joined at 1010, so items 00..09 stay hidden.
    assert_eq!(page.total_count, Some(15));
    assert_eq!(
        page.items.first().map(|item| item.content.as_str()),
        Some("item 10")
    );
}

#[tokio::test]
async fn register_user_is_public() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json("/v1/users", None, json!({ "username": "carol" })))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "carol");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn deleting_a_scope_locks_it() {
    let app = test_app().await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/scopes/{SCOPE}"))
        .header(AUTHORIZATION, format!("Bearer {ALICE_TOKEN}"))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["deleted_at_ms"].is_i64());

    let response = app
        .oneshot(get(&items_path(), Some(ALICE_TOKEN)))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn scope_lifecycle_over_http() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/scopes",
            Some(ALICE_TOKEN),
            json!({ "name": "announcements" }),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let scope_id = body["id"].as_str().expect("scope id").to_string();

    // The creator is a member immediately; anyone else has to join first.
    let response = app
        .clone()
        .oneshot(get(
            &format!("/v1/scopes/{scope_id}/items"),
            Some(BOB_TOKEN),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/scopes/{scope_id}/join"),
            Some(BOB_TOKEN),
            json!({}),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(
            &format!("/v1/scopes/{scope_id}/items"),
            Some(BOB_TOKEN),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_page(response).await;
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, Some(0));
}
