use super::PostStore;
use crate::domain::{Post, PostId};
use crate::error::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store for tests and `--in-memory` development runs.
///
/// Documents are cloned on the way in and out, so callers always mutate a
/// private copy and concurrent writers behave like the database: last
/// replace wins.
#[derive(Default)]
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<PostId, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: &Post) -> Result<()> {
        self.posts.write().await.insert(post.id(), post.clone());
        Ok(())
    }

    async fn find(&self, id: PostId) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list_recent(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(posts)
    }

    async fn replace(&self, post: &Post) -> Result<bool> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&post.id()) {
            Some(stored) => {
                *stored = post.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: PostId) -> Result<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{likes, UserId};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_find_returns_independent_copy() {
        let store = InMemoryPostStore::new();
        let post = Post::new(UserId::generate(), "hello".into(), None, Utc::now());
        store.insert(&post).await.unwrap();

        let mut copy = store.find(post.id()).await.unwrap().unwrap();
        likes::like(&mut copy, UserId::generate());

        let stored = store.find(post.id()).await.unwrap().unwrap();
        assert!(stored.likes().is_empty());
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first() {
        let store = InMemoryPostStore::new();
        let now = Utc::now();
        let older = Post::new(UserId::generate(), "old".into(), None, now - Duration::minutes(5));
        let newer = Post::new(UserId::generate(), "new".into(), None, now);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();

        let listed: Vec<_> = store
            .list_recent()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(listed, vec![newer.id(), older.id()]);
    }

    #[tokio::test]
    async fn test_replace_and_delete_report_missing_rows() {
        let store = InMemoryPostStore::new();
        let post = Post::new(UserId::generate(), "hello".into(), None, Utc::now());

        assert!(!store.replace(&post).await.unwrap());
        store.insert(&post).await.unwrap();
        assert!(store.replace(&post).await.unwrap());
        assert!(store.delete(post.id()).await.unwrap());
        assert!(!store.delete(post.id()).await.unwrap());
        assert!(store.is_empty().await);
    }
}
