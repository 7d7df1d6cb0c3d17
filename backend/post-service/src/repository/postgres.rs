use super::PostStore;
use crate::domain::{Post, PostId};
use crate::error::Result;
use sqlx::types::Json;
use sqlx::PgPool;

/// PostgreSQL-backed store; one row per post, the aggregate in a JSONB column
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PostStore for PgPostStore {
    async fn insert(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(post.id().0)
        .bind(post.author_id().0)
        .bind(Json(post))
        .bind(post.created_at())
        .bind(post.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, id: PostId) -> Result<Option<Post>> {
        let document = sqlx::query_scalar::<_, Json<Post>>(
            r#"
            SELECT document
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document.map(|Json(post)| post))
    }

    async fn list_recent(&self) -> Result<Vec<Post>> {
        let documents = sqlx::query_scalar::<_, Json<Post>>(
            r#"
            SELECT document
            FROM posts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(documents.into_iter().map(|Json(post)| post).collect())
    }

    async fn replace(&self, post: &Post) -> Result<bool> {
        // Single statement: the stored document is either the old or the new one
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET document = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(post.id().0)
        .bind(Json(post))
        .bind(post.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: PostId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
