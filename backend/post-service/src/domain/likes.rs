/// Like set on a post
///
/// Both operations are idempotent and never fail. They report whether the
/// set changed so the caller can skip a write that would be a no-op.
use super::ids::UserId;
use super::models::Post;

/// Add `user` to the likes unless already present
pub fn like(post: &mut Post, user: UserId) -> bool {
    if post.likes.contains(&user) {
        return false;
    }
    post.likes.push(user);
    true
}

/// Remove `user` from the likes if present
pub fn unlike(post: &mut Post, user: UserId) -> bool {
    match post.likes.iter().position(|liker| *liker == user) {
        Some(index) => {
            post.likes.remove(index);
            true
        }
        None => false,
    }
}

/// Whether `user` currently likes the post
pub fn is_liked_by(post: &Post, user: UserId) -> bool {
    post.likes.contains(&user)
}
