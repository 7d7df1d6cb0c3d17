/// Post Service Library
///
/// Owns the Post aggregate for the Nova social platform: posts, their likes,
/// comments and replies, stored and mutated as one document per post.
///
/// # Modules
///
/// - `domain`: aggregate types, id validation, ownership, likes, threads
/// - `services`: the aggregate engine (load, check, mutate, persist)
/// - `repository`: post storage (PostgreSQL, in-memory)
/// - `users`: username lookup for read endpoints
/// - `media`: image upload for new posts
/// - `handlers`: HTTP request handlers
/// - `middleware`: bearer token authentication
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `db`: connection pool and migrations
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod repository;
pub mod services;
pub mod users;

pub use config::Config;
pub use error::{AppError, Result};
