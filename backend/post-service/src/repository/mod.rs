/// Post persistence
///
/// A Post is stored as one document. Every mutation is committed by
/// replacing the whole document; there is no separate storage for comments,
/// replies or likes.
mod memory;
mod postgres;

pub use memory::InMemoryPostStore;
pub use postgres::PgPostStore;

use crate::domain::{Post, PostId};
use crate::error::Result;

/// Storage interface for Post aggregates.
/// Both PgPostStore (PostgreSQL) and InMemoryPostStore implement this.
#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    /// Store a newly created post
    async fn insert(&self, post: &Post) -> Result<()>;

    /// Load one post; every call returns an independent copy
    async fn find(&self, id: PostId) -> Result<Option<Post>>;

    /// All posts, most recently created first
    async fn list_recent(&self) -> Result<Vec<Post>>;

    /// Atomically replace the stored document.
    /// Returns false when the post no longer exists.
    async fn replace(&self, post: &Post) -> Result<bool>;

    /// Hard delete. Returns false when the post did not exist.
    async fn delete(&self, id: PostId) -> Result<bool>;
}
