/// Post aggregate engine - every post, like, comment and reply operation
///
/// Each mutation runs the same sequence: validate the supplied ids, load the
/// whole Post, check ownership where required, apply one in-memory change and
/// write the whole document back. Nothing is persisted for a request that
/// fails validation or authorization.
///
/// There is no version check on write. Two requests that load the same Post
/// concurrently each write back their own copy and the later write wins.
use crate::domain::{
    guard, likes, thread, Comment, CommentId, Post, PostId, PostView, Reply, ReplyId, UserId,
    UserSummary,
};
use crate::error::{AppError, Result};
use crate::media::ImageUploader;
use crate::repository::PostStore;
use crate::users::UserDirectory;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct PostEngine {
    store: Arc<dyn PostStore>,
    users: Arc<dyn UserDirectory>,
    uploader: Arc<dyn ImageUploader>,
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

impl PostEngine {
    pub fn new(
        store: Arc<dyn PostStore>,
        users: Arc<dyn UserDirectory>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        Self {
            store,
            users,
            uploader,
        }
    }

    async fn load(&self, post_id: PostId) -> Result<Post> {
        self.store.find(post_id).await?.ok_or_else(post_not_found)
    }

    /// Whole-document replacement of a mutated aggregate
    async fn persist(&self, post: &mut Post) -> Result<()> {
        post.touch(Utc::now());
        if !self.store.replace(post).await? {
            // deleted between our load and our write
            return Err(post_not_found());
        }
        Ok(())
    }

    /// Create a new post, uploading its image first when one is supplied
    pub async fn create_post(
        &self,
        principal: UserId,
        content: &str,
        image: Option<&str>,
    ) -> Result<Post> {
        if content.trim().is_empty() {
            return Err(AppError::ValidationFailed("content is required".to_string()));
        }

        let image = match image.filter(|data| !data.trim().is_empty()) {
            Some(data) => Some(self.uploader.upload(data).await?),
            None => None,
        };

        let post = Post::new(principal, content.to_string(), image, Utc::now());
        self.store.insert(&post).await?;

        tracing::info!(post_id = %post.id(), user_id = %principal, "post created");
        Ok(post)
    }

    /// All posts, newest first, with authors resolved
    pub async fn list_posts(&self) -> Result<Vec<PostView>> {
        let posts = self.store.list_recent().await?;

        let mut seen = HashSet::new();
        let participants: Vec<UserId> = posts
            .iter()
            .flat_map(Post::participants)
            .filter(|id| seen.insert(*id))
            .collect();
        let users = self.users.summaries(&participants).await?;

        Ok(posts
            .iter()
            .map(|post| PostView::populate(post, &users))
            .collect())
    }

    /// One post with authors resolved
    pub async fn get_post(&self, post_id: &str) -> Result<PostView> {
        let post_id = PostId::parse(post_id)?;
        let post = self.load(post_id).await?;
        let users = self.users.summaries(&post.participants()).await?;
        Ok(PostView::populate(&post, &users))
    }

    /// Replace the content of a post owned by the principal
    pub async fn update_post(&self, principal: UserId, post_id: &str, content: &str) -> Result<Post> {
        let post_id = PostId::parse(post_id)?;
        let mut post = self.load(post_id).await?;
        guard::check_post_ownership(principal, &post).inspect_err(|_| {
            tracing::warn!(%post_id, user_id = %principal, "post update denied");
        })?;

        if content.trim().is_empty() {
            return Err(AppError::ValidationFailed("content is required".to_string()));
        }
        post.content = content.to_string();
        self.persist(&mut post).await?;

        tracing::info!(%post_id, user_id = %principal, "post updated");
        Ok(post)
    }

    /// Hard delete a post owned by the principal; returns the deleted post
    pub async fn delete_post(&self, principal: UserId, post_id: &str) -> Result<Post> {
        let post_id = PostId::parse(post_id)?;
        let post = self.load(post_id).await?;
        guard::check_post_ownership(principal, &post).inspect_err(|_| {
            tracing::warn!(%post_id, user_id = %principal, "post delete denied");
        })?;

        if !self.store.delete(post_id).await? {
            return Err(post_not_found());
        }

        tracing::info!(%post_id, user_id = %principal, "post deleted");
        Ok(post)
    }

    pub async fn like_post(&self, principal: UserId, post_id: &str) -> Result<Post> {
        let post_id = PostId::parse(post_id)?;
        let mut post = self.load(post_id).await?;

        if likes::like(&mut post, principal) {
            self.persist(&mut post).await?;
            tracing::info!(%post_id, user_id = %principal, "post liked");
        }
        Ok(post)
    }

    pub async fn unlike_post(&self, principal: UserId, post_id: &str) -> Result<Post> {
        let post_id = PostId::parse(post_id)?;
        let mut post = self.load(post_id).await?;

        if likes::unlike(&mut post, principal) {
            self.persist(&mut post).await?;
            tracing::info!(%post_id, user_id = %principal, "post unliked");
        }
        Ok(post)
    }

    /// Comment on a post; returns the updated post
    pub async fn add_comment(&self, principal: UserId, post_id: &str, text: &str) -> Result<Post> {
        let post_id = PostId::parse(post_id)?;
        let mut post = self.load(post_id).await?;

        let comment = thread::add_comment(&mut post, principal, text, Utc::now())?;
        self.persist(&mut post).await?;

        tracing::info!(%post_id, comment_id = %comment.id(), user_id = %principal, "comment added");
        Ok(post)
    }

    /// Remove a comment (and its replies) authored by the principal
    pub async fn delete_comment(
        &self,
        principal: UserId,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Comment> {
        let post_id = PostId::parse(post_id)?;
        let comment_id = CommentId::parse(comment_id)?;
        let mut post = self.load(post_id).await?;

        let removed = thread::delete_comment(&mut post, comment_id, principal).inspect_err(|e| {
            if matches!(e, AppError::Forbidden(_)) {
                tracing::warn!(%post_id, %comment_id, user_id = %principal, "comment delete denied");
            }
        })?;
        self.persist(&mut post).await?;

        tracing::info!(
            %post_id,
            %comment_id,
            user_id = %principal,
            replies_removed = removed.replies().len(),
            "comment deleted"
        );
        Ok(removed)
    }

    /// Reply to an existing comment
    pub async fn reply_to_comment(
        &self,
        principal: UserId,
        post_id: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<Reply> {
        let post_id = PostId::parse(post_id)?;
        let comment_id = CommentId::parse(comment_id)?;
        let mut post = self.load(post_id).await?;

        let reply = thread::add_reply(&mut post, comment_id, principal, text, Utc::now())?;
        self.persist(&mut post).await?;

        tracing::info!(%post_id, %comment_id, reply_id = %reply.id(), user_id = %principal, "reply added");
        Ok(reply)
    }

    /// Remove a reply authored by the principal
    pub async fn delete_reply(
        &self,
        principal: UserId,
        post_id: &str,
        comment_id: &str,
        reply_id: &str,
    ) -> Result<Reply> {
        let post_id = PostId::parse(post_id)?;
        let comment_id = CommentId::parse(comment_id)?;
        let reply_id = ReplyId::parse(reply_id)?;
        let mut post = self.load(post_id).await?;

        let removed = thread::delete_reply(&mut post, comment_id, reply_id, principal)
            .inspect_err(|e| {
                if matches!(e, AppError::Forbidden(_)) {
                    tracing::warn!(%post_id, %reply_id, user_id = %principal, "reply delete denied");
                }
            })?;
        self.persist(&mut post).await?;

        tracing::info!(%post_id, %comment_id, %reply_id, user_id = %principal, "reply deleted");
        Ok(removed)
    }

    /// Best-effort summary of a single user for response decoration
    pub async fn user_summary(&self, user: UserId) -> Option<UserSummary> {
        match self.users.summaries(&[user]).await {
            Ok(mut found) => found.remove(&user),
            Err(err) => {
                tracing::debug!(user_id = %user, "user summary lookup failed: {}", err);
                None
            }
        }
    }
}
