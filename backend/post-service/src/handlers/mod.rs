/// HTTP handlers for post-related endpoints
///
/// Routes live under `/api/posts`. Every route resolves the principal through
/// [`JwtAuthMiddleware`]; only handlers that take a `UserId` require one, so
/// listing and reading a post stay public. CORS wraps the auth layer so
/// preflight requests are answered before it.
pub mod posts;

pub use posts::{
    add_comment, create_post, delete_comment, delete_post, delete_reply, get_post, like_post,
    list_posts, reply_to_comment, unlike_post, update_post,
};

use crate::config::HttpConfig;
use crate::error::AppError;
use crate::middleware::{build_cors, JwtAuthMiddleware};
use actix_web::error::JsonPayloadError;
use actix_web::web;

fn json_error(err: JsonPayloadError) -> AppError {
    match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            AppError::PayloadTooLarge(err.to_string())
        }
        other => AppError::ValidationFailed(other.to_string()),
    }
}

/// Register the post routes
pub fn configure(cfg: &mut web::ServiceConfig, auth: JwtAuthMiddleware, http: &HttpConfig) {
    cfg.service(
        web::scope("/api/posts")
            .wrap(auth)
            .wrap(build_cors(&http.allowed_origins))
            .app_data(
                web::JsonConfig::default()
                    .limit(http.json_limit_bytes)
                    .error_handler(|err, _req| json_error(err).into()),
            )
            .route("", web::post().to(create_post))
            .route("", web::get().to(list_posts))
            .route("/{post_id}", web::get().to(get_post))
            .route("/{post_id}", web::put().to(update_post))
            .route("/{post_id}", web::delete().to(delete_post))
            .route("/{post_id}/like", web::post().to(like_post))
            .route("/{post_id}/unlike", web::post().to(unlike_post))
            .route("/{post_id}/comments", web::post().to(add_comment))
            .route(
                "/{post_id}/comments/{comment_id}",
                web::delete().to(delete_comment),
            )
            .route(
                "/{post_id}/comments/{comment_id}/reply",
                web::post().to(reply_to_comment),
            )
            .route(
                "/{post_id}/comments/{comment_id}/reply/{reply_id}",
                web::delete().to(delete_reply),
            ),
    );
}
