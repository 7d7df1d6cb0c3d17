/// Data models for the Post aggregate
///
/// A Post owns its comments, and each comment owns its replies. The whole
/// tree is loaded and persisted as one document; comments and replies have no
/// storage identity outside their parent Post.
use super::ids::{CommentId, PostId, ReplyId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Reference to an image stored by the upload collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Content-addressed object key
    pub key: String,
    /// Public URL clients render
    pub url: String,
    pub content_type: String,
    pub bytes: u64,
}

/// Reply to a comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    id: ReplyId,
    author_id: UserId,
    text: String,
    created_at: DateTime<Utc>,
}

impl Reply {
    pub(crate) fn new(author_id: UserId, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: ReplyId::generate(),
            author_id,
            text,
            created_at: now,
        }
    }

    pub fn id(&self) -> ReplyId {
        self.id
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Comment on a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    author_id: UserId,
    text: String,
    created_at: DateTime<Utc>,
    // Documents written before replies existed carry no field at all
    #[serde(default)]
    pub(crate) replies: Vec<Reply>,
}

impl Comment {
    pub(crate) fn new(author_id: UserId, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::generate(),
            author_id,
            text,
            created_at: now,
            replies: Vec::new(),
        }
    }

    pub fn id(&self) -> CommentId {
        self.id
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replies in chronological order
    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }
}

/// Post aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    id: PostId,
    author_id: UserId,
    pub(crate) content: String,
    image: Option<ImageRef>,
    #[serde(default)]
    pub(crate) likes: Vec<UserId>,
    #[serde(default)]
    pub(crate) comments: Vec<Comment>,
    created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        author_id: UserId,
        content: String,
        image: Option<ImageRef>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PostId::generate(),
            author_id,
            content,
            image,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    /// Users who like this post, in the order they liked it
    pub fn likes(&self) -> &[UserId] {
        &self.likes
    }

    /// Comments in chronological order
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Mark the aggregate as modified
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Every user that authored something in this aggregate, first-seen order
    pub fn participants(&self) -> Vec<UserId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let authors = std::iter::once(self.author_id).chain(self.comments.iter().flat_map(|c| {
            std::iter::once(c.author_id).chain(c.replies.iter().map(|r| r.author_id))
        }));
        for id in authors {
            if seen.insert(id) {
                ids.push(id);
            }
        }
        ids
    }
}

// ============================================================================
// Presentation views
// ============================================================================

/// Lightweight user summary attached to listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

/// Reply with its author resolved
#[derive(Debug, Clone, Serialize)]
pub struct ReplyView {
    pub id: ReplyId,
    pub author_id: UserId,
    /// None when the author is unknown to the user directory
    pub author: Option<UserSummary>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Comment with its author and reply authors resolved
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub author_id: UserId,
    pub author: Option<UserSummary>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
}

/// Post with every author resolved, for read endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: PostId,
    pub author_id: UserId,
    pub author: Option<UserSummary>,
    pub content: String,
    pub image: Option<ImageRef>,
    pub likes: Vec<UserId>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    /// Build a view from the aggregate; the aggregate itself is left untouched.
    pub fn populate(post: &Post, users: &HashMap<UserId, UserSummary>) -> Self {
        let summary = |id: UserId| users.get(&id).cloned();

        Self {
            id: post.id,
            author_id: post.author_id,
            author: summary(post.author_id),
            content: post.content.clone(),
            image: post.image.clone(),
            likes: post.likes.clone(),
            comments: post
                .comments
                .iter()
                .map(|comment| CommentView {
                    id: comment.id,
                    author_id: comment.author_id,
                    author: summary(comment.author_id),
                    text: comment.text.clone(),
                    created_at: comment.created_at,
                    replies: comment
                        .replies
                        .iter()
                        .map(|reply| ReplyView {
                            id: reply.id,
                            author_id: reply.author_id,
                            author: summary(reply.author_id),
                            text: reply.text.clone(),
                            created_at: reply.created_at,
                        })
                        .collect(),
                })
                .collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
