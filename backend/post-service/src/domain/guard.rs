/// Ownership checks for posts, comments and replies
///
/// The guard only compares identifiers handed to it; it never looks the
/// principal up again.
use super::ids::UserId;
use super::models::{Comment, Post, Reply};
use crate::error::{AppError, Result};

/// True when the acting principal is the recorded owner
pub fn authorize(principal: UserId, resource_author: UserId) -> bool {
    principal == resource_author
}

/// Check if a user owns a post
pub fn check_post_ownership(principal: UserId, post: &Post) -> Result<()> {
    if authorize(principal, post.author_id()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this post".to_string(),
        ))
    }
}

/// Check if a user owns a comment
pub fn check_comment_ownership(principal: UserId, comment: &Comment) -> Result<()> {
    if authorize(principal, comment.author_id()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not authorized to delete this comment".to_string(),
        ))
    }
}

/// Check if a user owns a reply
pub fn check_reply_ownership(principal: UserId, reply: &Reply) -> Result<()> {
    if authorize(principal, reply.author_id()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not authorized to delete this reply".to_string(),
        ))
    }
}
