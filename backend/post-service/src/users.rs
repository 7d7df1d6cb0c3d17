/// User lookup for presentation
///
/// Read endpoints show a username next to every author id. Accounts are
/// owned by the identity service; this side only reads `users(id, username)`.
use crate::domain::{UserId, UserSummary};
use crate::error::Result;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve summaries for the given users; unknown ids are simply absent
    async fn summaries(&self, ids: &[UserId]) -> Result<HashMap<UserId, UserSummary>>;
}

/// Reads summaries from the shared `users` table
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserDirectory for PgUserDirectory {
    async fn summaries(&self, ids: &[UserId]) -> Result<HashMap<UserId, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT id, username
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, username)| {
                let id = UserId(id);
                (id, UserSummary { id, username })
            })
            .collect())
    }
}

/// Directory kept in memory, for tests and development runs
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, String>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, id: UserId, username: impl Into<String>) {
        self.users.write().await.insert(id, username.into());
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn summaries(&self, ids: &[UserId]) -> Result<HashMap<UserId, UserSummary>> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                users.get(id).map(|username| {
                    (
                        *id,
                        UserSummary {
                            id: *id,
                            username: username.clone(),
                        },
                    )
                })
            })
            .collect())
    }
}
