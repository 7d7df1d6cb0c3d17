//! HTTP surface of the post routes: status codes, auth and response bodies

mod common;

use actix_web::{http::header, test, web, App};
use common::{bearer, harness, TEST_SECRET};
use post_service::config::HttpConfig;
use post_service::domain::{CommentId, UserId};
use post_service::handlers;
use post_service::middleware::{JwtAuthMiddleware, TokenVerifier};
use serde_json::{json, Value};
use std::sync::Arc;

fn http_config() -> HttpConfig {
    HttpConfig {
        allowed_origins: "*".to_string(),
        json_limit_bytes: 64 * 1024,
    }
}

macro_rules! init_app {
    ($engine:expr) => {
        init_app!($engine, http_config())
    };
    ($engine:expr, $http:expr) => {{
        let verifier = TokenVerifier::new(TEST_SECRET).expect("verifier");
        let auth = JwtAuthMiddleware::new(Arc::new(verifier));
        let http: HttpConfig = $http;
        test::init_service(
            App::new()
                .app_data(web::Data::new($engine))
                .configure(move |cfg| handlers::configure(cfg, auth, &http)),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_create_post_requires_token() {
    let h = harness();
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "content": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["status"], 401);
    assert!(h.store.is_empty().await);
}

#[actix_web::test]
async fn test_bad_token_is_unauthorized() {
    let h = harness();
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .set_json(json!({ "content": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_create_then_read_publicly() {
    let h = harness();
    let alice = UserId::generate();
    h.users.register(alice, "alice").await;
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(alice))
        .set_json(json!({ "content": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Created a Post successfully");
    assert_eq!(body["post"]["content"], "hello");
    assert_eq!(body["post"]["author_id"], alice.to_string());
    let post_id = body["post"]["id"].as_str().unwrap().to_string();

    // reads need no token
    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Got single Post");
    assert_eq!(body["post"]["author"]["username"], "alice");

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["posts"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn test_missing_or_empty_content_is_bad_request() {
    let h = harness();
    let alice = UserId::generate();
    let app = init_app!(h.engine.clone());

    for payload in [json!({ "content": "" }), json!({})] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(alice))
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "validation_failed");
    }
    assert!(h.store.is_empty().await);
}

#[actix_web::test]
async fn test_malformed_and_unknown_ids_are_not_found() {
    let h = harness();
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::get()
        .uri("/api/posts/not-an-id")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "invalid_identifier");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", UserId::generate()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn test_non_author_update_is_forbidden() {
    let h = harness();
    let alice = UserId::generate();
    let bob = UserId::generate();
    let post = h.engine.create_post(alice, "mine", None).await.unwrap();
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post.id()))
        .insert_header(bearer(bob))
        .set_json(json!({ "content": "yours now" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "forbidden");

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post.id()))
        .insert_header(bearer(alice))
        .set_json(json!({ "content": "still mine" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Post updated successfully");
    assert_eq!(body["post"]["content"], "still mine");
}

#[actix_web::test]
async fn test_like_and_unlike_round_trip() {
    let h = harness();
    let alice = UserId::generate();
    let bob = UserId::generate();
    let post = h.engine.create_post(alice, "like me", None).await.unwrap();
    let app = init_app!(h.engine.clone());

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{}/like", post.id()))
            .insert_header(bearer(bob))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Post liked Successfully");
        assert_eq!(body["post"]["likes"], json!([bob.to_string()]));
    }

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/unlike", post.id()))
        .insert_header(bearer(bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Post unliked Successfully");
    assert_eq!(body["post"]["likes"], json!([]));
}

#[actix_web::test]
async fn test_comment_reply_and_delete_flow() {
    let h = harness();
    let alice = UserId::generate();
    let bob = UserId::generate();
    h.users.register(bob, "bob").await;
    let post = h.engine.create_post(alice, "thread", None).await.unwrap();
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", post.id()))
        .insert_header(bearer(bob))
        .set_json(json!({ "comment": "first!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Comment on Post");
    assert_eq!(body["user"]["username"], "bob");
    let comment_id = body["post"]["comments"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments/{comment_id}/reply", post.id()))
        .insert_header(bearer(alice))
        .set_json(json!({ "reply": "thanks" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let stored = h.engine.get_post(&post.id().to_string()).await.unwrap();
    let reply_id = stored.comments[0].replies[0].id;

    // bob cannot remove alice's reply
    let req = test::TestRequest::delete()
        .uri(&format!(
            "/api/posts/{}/comments/{comment_id}/reply/{reply_id}",
            post.id()
        ))
        .insert_header(bearer(bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::delete()
        .uri(&format!(
            "/api/posts/{}/comments/{comment_id}/reply/{reply_id}",
            post.id()
        ))
        .insert_header(bearer(alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}/comments/{comment_id}", post.id()))
        .insert_header(bearer(bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Comment deleted Successfully");

    let stored = h.engine.get_post(&post.id().to_string()).await.unwrap();
    assert!(stored.comments.is_empty());
}

#[actix_web::test]
async fn test_delete_post_then_gone() {
    let h = harness();
    let alice = UserId::generate();
    let post = h.engine.create_post(alice, "short-lived", None).await.unwrap();
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post.id()))
        .insert_header(bearer(alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Post deleted Successfully");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post.id()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_image_upload_failure_is_bad_gateway() {
    let h = common::harness_with(common::StubUploader::failing());
    let alice = UserId::generate();
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(alice))
        .set_json(json!({ "content": "pic", "image": common::PNG_DATA_URI }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "upstream_failure");
    assert!(h.store.is_empty().await);
}

#[actix_web::test]
async fn test_ids_and_ownership_are_checked_before_body_text() {
    let h = harness();
    let alice = UserId::generate();
    let bob = UserId::generate();
    let post = h.engine.create_post(alice, "mine", None).await.unwrap();
    let app = init_app!(h.engine.clone());

    // malformed post id with an empty comment
    let req = test::TestRequest::post()
        .uri("/api/posts/not-an-id/comments")
        .insert_header(bearer(bob))
        .set_json(json!({ "comment": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "invalid_identifier");

    // empty reply to a comment that does not exist
    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/posts/{}/comments/{}/reply",
            post.id(),
            CommentId::generate()
        ))
        .insert_header(bearer(bob))
        .set_json(json!({ "reply": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "not_found");

    // empty update from someone who does not own the post
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post.id()))
        .insert_header(bearer(bob))
        .set_json(json!({ "content": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // the owner still gets a validation error for the same body
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post.id()))
        .insert_header(bearer(alice))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "validation_failed");
}

#[actix_web::test]
async fn test_cors_preflight_is_answered() {
    let h = harness();
    let app = init_app!(h.engine.clone());

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/posts")
        .insert_header((header::ORIGIN, "http://app.example"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let req = test::TestRequest::get()
        .uri("/api/posts")
        .insert_header((header::ORIGIN, "http://app.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[actix_web::test]
async fn test_oversized_body_is_payload_too_large() {
    let h = harness();
    let alice = UserId::generate();
    let app = init_app!(
        h.engine.clone(),
        HttpConfig {
            allowed_origins: "*".to_string(),
            json_limit_bytes: 1024,
        }
    );

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(alice))
        .set_json(json!({ "content": "x".repeat(4096) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 413);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "payload_too_large");
    assert!(h.store.is_empty().await);
}
