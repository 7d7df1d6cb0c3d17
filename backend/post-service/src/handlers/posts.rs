/// Post handlers - HTTP endpoints for post, like, comment and reply operations
use crate::domain::UserId;
use crate::error::Result;
use crate::services::PostEngine;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    /// Inline image as a base64 `data:` URI
    pub image: Option<String>,
}

// Bodies of routes that address an existing post are checked by the engine
// after the ids, the lookup and the ownership check. A missing field reads
// as empty text.

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub reply: String,
}

/// Create a new post
/// POST /api/posts
pub async fn create_post(
    engine: web::Data<PostEngine>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let post = engine
        .create_post(user_id, &req.content, req.image.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Created a Post successfully",
        "post": post,
    })))
}

/// List every post, newest first
/// GET /api/posts
pub async fn list_posts(engine: web::Data<PostEngine>) -> Result<HttpResponse> {
    let posts = engine.list_posts().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Got All posts",
        "posts": posts,
    })))
}

/// Get a post by ID
/// GET /api/posts/{post_id}
pub async fn get_post(
    engine: web::Data<PostEngine>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post = engine.get_post(&post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Got single Post",
        "post": post,
    })))
}

/// Update post content
/// PUT /api/posts/{post_id}
pub async fn update_post(
    engine: web::Data<PostEngine>,
    post_id: web::Path<String>,
    user_id: UserId,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = engine.update_post(user_id, &post_id, &req.content).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post updated successfully",
        "post": post,
    })))
}

/// Delete a post
/// DELETE /api/posts/{post_id}
pub async fn delete_post(
    engine: web::Data<PostEngine>,
    post_id: web::Path<String>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let post = engine.delete_post(user_id, &post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post deleted Successfully",
        "post": post,
    })))
}

/// POST /api/posts/{post_id}/like
pub async fn like_post(
    engine: web::Data<PostEngine>,
    post_id: web::Path<String>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let post = engine.like_post(user_id, &post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post liked Successfully",
        "post": post,
    })))
}

/// POST /api/posts/{post_id}/unlike
pub async fn unlike_post(
    engine: web::Data<PostEngine>,
    post_id: web::Path<String>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let post = engine.unlike_post(user_id, &post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post unliked Successfully",
        "post": post,
    })))
}

/// Comment on a post
/// POST /api/posts/{post_id}/comments
pub async fn add_comment(
    engine: web::Data<PostEngine>,
    post_id: web::Path<String>,
    user_id: UserId,
    req: web::Json<AddCommentRequest>,
) -> Result<HttpResponse> {
    let post = engine.add_comment(user_id, &post_id, &req.comment).await?;
    let user = engine.user_summary(user_id).await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Comment on Post",
        "post": post,
        "user": {
            "id": user_id,
            "username": user.map(|u| u.username),
        },
    })))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}
pub async fn delete_comment(
    engine: web::Data<PostEngine>,
    path: web::Path<(String, String)>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    engine.delete_comment(user_id, &post_id, &comment_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment deleted Successfully",
    })))
}

/// POST /api/posts/{post_id}/comments/{comment_id}/reply
pub async fn reply_to_comment(
    engine: web::Data<PostEngine>,
    path: web::Path<(String, String)>,
    user_id: UserId,
    req: web::Json<ReplyRequest>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    engine
        .reply_to_comment(user_id, &post_id, &comment_id, &req.reply)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Reply added successfully",
    })))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}/reply/{reply_id}
pub async fn delete_reply(
    engine: web::Data<PostEngine>,
    path: web::Path<(String, String, String)>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let (post_id, comment_id, reply_id) = path.into_inner();
    engine
        .delete_reply(user_id, &post_id, &comment_id, &reply_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Reply deleted successfully",
    })))
}
