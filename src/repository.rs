use crate::{error::AppError, models::User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract used by the session loader. Handlers and extractors only ever
/// see `Arc<dyn Repository>`, so tests swap in an in-memory mock.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Looks up a user profile. `Ok(None)` means the user does not exist;
    /// `Err` means the lookup itself failed.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, role FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("get_user error: {:?}", e))?;

        Ok(user)
    }
}
