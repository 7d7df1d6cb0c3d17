/// Comment thread manager
///
/// Creates, finds and removes comments inside a loaded Post, and replies
/// inside a comment. Lookups are exact id matches. Removal keeps the
/// relative order of the remaining siblings.
use super::guard;
use super::ids::{CommentId, ReplyId, UserId};
use super::models::{Comment, Post, Reply};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};

fn require_text(text: &str, field: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(AppError::ValidationFailed(format!("{field} is required")));
    }
    Ok(text.to_string())
}

/// Append a new comment to the post
pub fn add_comment(
    post: &mut Post,
    author_id: UserId,
    text: &str,
    now: DateTime<Utc>,
) -> Result<Comment> {
    let text = require_text(text, "comment")?;
    let comment = Comment::new(author_id, text, now);
    post.comments.push(comment.clone());
    Ok(comment)
}

pub fn find_comment(post: &Post, comment_id: CommentId) -> Option<&Comment> {
    post.comments.iter().find(|c| c.id() == comment_id)
}

fn find_comment_mut(post: &mut Post, comment_id: CommentId) -> Result<&mut Comment> {
    post.comments
        .iter_mut()
        .find(|c| c.id() == comment_id)
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
}

/// Remove a comment and its whole reply subtree
///
/// Only the comment author is checked; authors of individual replies have
/// no say.
pub fn delete_comment(
    post: &mut Post,
    comment_id: CommentId,
    principal: UserId,
) -> Result<Comment> {
    let index = post
        .comments
        .iter()
        .position(|c| c.id() == comment_id)
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    guard::check_comment_ownership(principal, &post.comments[index])?;

    Ok(post.comments.remove(index))
}

/// Append a reply to an existing comment
pub fn add_reply(
    post: &mut Post,
    comment_id: CommentId,
    author_id: UserId,
    text: &str,
    now: DateTime<Utc>,
) -> Result<Reply> {
    let comment = find_comment_mut(post, comment_id)?;
    let text = require_text(text, "reply")?;
    let reply = Reply::new(author_id, text, now);
    comment.replies.push(reply.clone());
    Ok(reply)
}

pub fn find_reply(comment: &Comment, reply_id: ReplyId) -> Option<&Reply> {
    comment.replies.iter().find(|r| r.id() == reply_id)
}

/// Remove a reply from a comment
pub fn delete_reply(
    post: &mut Post,
    comment_id: CommentId,
    reply_id: ReplyId,
    principal: UserId,
) -> Result<Reply> {
    let comment = find_comment_mut(post, comment_id)?;
    let index = comment
        .replies
        .iter()
        .position(|r| r.id() == reply_id)
        .ok_or_else(|| AppError::NotFound("Reply not found".to_string()))?;

    guard::check_reply_ownership(principal, &comment.replies[index])?;

    Ok(comment.replies.remove(index))
}
