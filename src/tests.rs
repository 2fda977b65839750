//! Integration tests for the blog server.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::db::fixtures::{at, TestDb};
use crate::db::BlogStore;
use crate::models::PostStatus;
use crate::{create_router, AppState};

const TOKEN: &str = "alice-token";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    db: TestDb,
    alice: i64,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_config(Config {
            page_size: 2,
            ..Config::default()
        })
        .await
    }

    async fn with_config(config: Config) -> Self {
        let db = TestDb::new().await;
        let alice = db.insert_user("Alice", Some(TOKEN)).await;

        let state = AppState {
            store: db.store.clone(),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            db,
            alice,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn as_alice(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-user-id", self.alice.to_string())
            .header("authorization", format!("Bearer {}", TOKEN))
    }

    async fn published_post(&self, title: &str, minute: i64) -> i64 {
        self.db
            .insert_post(title, PostStatus::Published, self.alice, None, at(minute))
            .await
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_home_feed_pagination() {
    let fixture = TestFixture::new().await;
    for i in 0..3 {
        fixture.published_post(&format!("post {}", i), i).await;
    }
    fixture.db.insert_carousel("welcome").await;

    let resp = fixture
        .client
        .get(fixture.url("/api/posts"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["pageRange"], serde_json::json!([1, 2]));
    assert_eq!(body["data"]["items"][0]["title"], "post 2");
    assert_eq!(body["data"]["carousel"][0]["title"], "welcome");
    assert!(body["data"]["sidebar"]["hotArticles"].is_array());
    assert!(body["data"]["sidebar"]["authorPostCounts"].is_array());

    // Out-of-range and junk page numbers clamp instead of failing
    let last: Value = fixture
        .client
        .get(fixture.url("/api/posts?page=50"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(last["data"]["page"], 2);
    assert_eq!(last["data"]["items"][0]["title"], "post 0");

    let junk: Value = fixture
        .client
        .get(fixture.url("/api/posts?page=abc"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(junk["data"]["page"], 1);
}

#[tokio::test]
async fn test_post_detail_counts_views_and_threads_comments() {
    let fixture = TestFixture::new().await;
    let post = fixture.published_post("threaded", 0).await;
    let root = fixture
        .db
        .insert_comment(post, None, fixture.alice, "root", at(1))
        .await;
    fixture
        .db
        .insert_comment(post, Some(root), fixture.alice, "reply", at(2))
        .await;

    for expected in 1..=2 {
        let resp = fixture
            .client
            .get(fixture.url(&format!("/api/posts/{}", post)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["post"]["viewCount"], expected);
        assert_eq!(body["data"]["comments"][0]["root"]["content"], "root");
        assert!(body["data"]["comments"][0]["root"].get("ipAddress").is_none());
        assert!(body["data"]["comments"][0]["replies"][0]
            .get("ipAddress")
            .is_none());
        assert_eq!(
            body["data"]["comments"][0]["replies"][0]["content"],
            "reply"
        );
    }
}

#[tokio::test]
async fn test_submit_comment() {
    let fixture = TestFixture::new().await;
    let post = fixture.published_post("open for comments", 0).await;

    let resp = fixture
        .as_alice(
            fixture
                .client
                .post(fixture.url(&format!("/api/posts/{}/comments", post))),
        )
        .header("x-forwarded-for", "203.0.113.9")
        .form(&[("comment", "First!")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["authorName"], "Alice");
    assert_eq!(body["data"]["content"], "First!");
    assert!(body["data"]["publishedAt"].as_str().unwrap().contains('年'));

    let id = body["data"]["id"].as_i64().unwrap();
    let stored = fixture.db.store.get_comment(id).await.unwrap().unwrap();
    assert_eq!(stored.ip_address, "203.0.113.9");
}

#[tokio::test]
async fn test_comment_rejections_are_plain_text_403() {
    let fixture = TestFixture::new().await;
    let post = fixture.published_post("strict", 0).await;
    let url = fixture.url(&format!("/api/posts/{}/comments", post));

    // Not logged in
    let resp = fixture
        .client
        .post(&url)
        .form(&[("comment", "hello")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert_eq!(resp.text().await.unwrap(), "Please log in");

    // Wrong token counts as not logged in
    let resp = fixture
        .client
        .post(&url)
        .header("x-user-id", fixture.alice.to_string())
        .header("x-api-key", "wrong-key")
        .form(&[("comment", "hello")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Empty
    let resp = fixture
        .as_alice(fixture.client.post(&url))
        .form(&[("comment", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert_eq!(resp.text().await.unwrap(), "Please enter a comment");

    // Too long
    let long = "x".repeat(201);
    let resp = fixture
        .as_alice(fixture.client.post(&url))
        .form(&[("comment", long.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert_eq!(resp.text().await.unwrap(), "Comment is too long");

    assert_eq!(fixture.db.comment_count().await, 0);
}

#[tokio::test]
async fn test_soft_delete_comment() {
    let fixture = TestFixture::new().await;
    let post = fixture.published_post("moderated", 0).await;
    let comment = fixture
        .db
        .insert_comment(post, None, fixture.alice, "oops", at(1))
        .await;

    let resp = fixture
        .as_alice(
            fixture
                .client
                .post(fixture.url(&format!("/api/comments/{}/delete", comment))),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "comment_id": comment }));

    let detail: Value = fixture
        .client
        .get(fixture.url(&format!("/api/posts/{}", post)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["comments"], serde_json::json!([]));

    // Deleting an unknown comment
    let resp = fixture
        .as_alice(fixture.client.post(fixture.url("/api/comments/9999/delete")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_restricted_delete_policy() {
    let fixture = TestFixture::with_config(Config {
        restrict_comment_delete: true,
        ..Config::default()
    })
    .await;
    let bob = fixture.db.insert_user("Bob", None).await;
    let post = fixture.published_post("guarded", 0).await;
    let comment = fixture
        .db
        .insert_comment(post, None, bob, "bob's", at(1))
        .await;

    let resp = fixture
        .as_alice(
            fixture
                .client
                .post(fixture.url(&format!("/api/comments/{}/delete", comment))),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 403);
    let stored = fixture.db.store.get_comment(comment).await.unwrap().unwrap();
    assert!(!stored.is_deleted);
}

#[tokio::test]
async fn test_filtered_feeds() {
    let fixture = TestFixture::new().await;
    let systems = fixture.db.insert_catalogue("Systems").await;
    let rust = fixture.db.insert_tag("rust").await;
    let post = fixture
        .db
        .insert_post("tagged", PostStatus::Published, fixture.alice, Some(systems), at(0))
        .await;
    fixture.db.tag_post(post, rust).await;

    for path in [
        "/api/tags/rust/posts".to_string(),
        format!("/api/categories/{}/posts", systems),
        format!("/api/authors/{}/posts", fixture.alice),
    ] {
        let resp = fixture.client.get(fixture.url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), 200, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["items"][0]["title"], "tagged", "{}", path);
    }
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;
    let draft = fixture
        .db
        .insert_post("draft", PostStatus::Draft, fixture.alice, None, at(0))
        .await;

    for path in [
        "/api/tags/missing/posts".to_string(),
        "/api/categories/404/posts".to_string(),
        "/api/authors/404/posts".to_string(),
        "/api/posts/404".to_string(),
        format!("/api/posts/{}", draft),
        "/api/repositories/404".to_string(),
    ] {
        let resp = fixture.client.get(fixture.url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), 404, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_repositories() {
    let fixture = TestFixture::new().await;
    let repo = fixture.db.insert_repository("toolkit", at(0)).await;

    let list: Value = fixture
        .client
        .get(fixture.url("/api/repositories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"]["items"][0]["title"], "toolkit");
    assert!(list["data"].get("carousel").is_none());

    let detail: Value = fixture
        .client
        .get(fixture.url(&format!("/api/repositories/{}", repo)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["repository"]["viewCount"], 1);
}
