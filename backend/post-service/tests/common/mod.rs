//! Shared fixtures for post-service integration tests
//!
//! Builds a [`PostEngine`] over the in-memory store and user directory, with
//! an uploader stub that either succeeds or fails on demand.
#![allow(dead_code)]

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use post_service::domain::{ImageRef, UserId};
use post_service::error::{AppError, Result};
use post_service::media::ImageUploader;
use post_service::middleware::Claims;
use post_service::repository::InMemoryPostStore;
use post_service::services::PostEngine;
use post_service::users::InMemoryUserDirectory;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TEST_SECRET: &str = "post-service-test-secret-32-bytes!!";

/// 1x1 transparent PNG
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Uploader that records calls and optionally fails every upload
#[derive(Default)]
pub struct StubUploader {
    fail: bool,
    calls: AtomicUsize,
}

impl StubUploader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageUploader for StubUploader {
    async fn upload(&self, _data_uri: &str) -> Result<ImageRef> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::UpstreamFailure("stub storage offline".to_string()));
        }
        Ok(ImageRef {
            key: format!("posts/stub-{n}.png"),
            url: format!("https://media.test/posts/stub-{n}.png"),
            content_type: "image/png".to_string(),
            bytes: 68,
        })
    }
}

pub struct Harness {
    pub engine: PostEngine,
    pub store: Arc<InMemoryPostStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub uploader: Arc<StubUploader>,
}

pub fn harness() -> Harness {
    harness_with(StubUploader::default())
}

pub fn harness_with(uploader: StubUploader) -> Harness {
    let store = Arc::new(InMemoryPostStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let uploader = Arc::new(uploader);
    let engine = PostEngine::new(store.clone(), users.clone(), uploader.clone());

    Harness {
        engine,
        store,
        users,
        uploader,
    }
}

/// Mint an HS256 bearer token for `user`, valid for an hour
pub fn token_for(user: UserId) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.to_string(),
        exp: (now + 3600) as usize,
        iat: now as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode test token")
}

pub fn bearer(user: UserId) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user)))
}
