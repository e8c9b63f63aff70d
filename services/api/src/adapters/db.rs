//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use repo_bulletin_core::domain::{Bulletin, StoredBulletin, User, UserId};
use repo_bulletin_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    access_token: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            access_token: self.access_token,
        }
    }
}

#[derive(FromRow)]
struct BulletinRecord {
    user_id: i64,
    data: Json<Bulletin>,
    updated_at: DateTime<Utc>,
}
impl BulletinRecord {
    fn to_domain(self) -> StoredBulletin {
        StoredBulletin {
            user_id: self.user_id,
            bulletin: self.data.0,
            updated_at: self.updated_at,
        }
    }
}

/// Maps a `sqlx` error onto the port's error kinds.
fn port_error(e: sqlx::Error, what: impl FnOnce() -> String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what()),
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            PortError::Conflict(db.message().to_string())
        }
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_user(&self, id: UserId) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, access_token FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, || format!("User {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn insert_user(&self, user: &User) -> PortResult<()> {
        sqlx::query("INSERT INTO users (id, access_token) VALUES ($1, $2)")
            .bind(user.id)
            .bind(&user.access_token)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, || format!("User {} not found", user.id)))?;
        Ok(())
    }

    async fn update_user_token(&self, id: UserId, access_token: &str) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE users SET access_token = $1, updated_at = now() WHERE id = $2",
        )
        .bind(access_token)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| port_error(e, || format!("User {} not found", id)))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> PortResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, || format!("User {} not found", id)))?;
        Ok(())
    }

    async fn get_bulletin(&self, user_id: UserId) -> PortResult<StoredBulletin> {
        let record = sqlx::query_as::<_, BulletinRecord>(
            "SELECT user_id, data, updated_at FROM bulletins WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, || format!("Bulletin for user {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn insert_bulletin(&self, user_id: UserId, bulletin: &Bulletin) -> PortResult<()> {
        sqlx::query("INSERT INTO bulletins (user_id, data) VALUES ($1, $2)")
            .bind(user_id)
            .bind(Json(bulletin))
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, || format!("User {} not found", user_id)))?;
        Ok(())
    }

    async fn update_bulletin(&self, user_id: UserId, bulletin: &Bulletin) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE bulletins SET data = $1, updated_at = now() WHERE user_id = $2",
        )
        .bind(Json(bulletin))
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| port_error(e, || format!("Bulletin for user {} not found", user_id)))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Bulletin for user {} not found",
                user_id
            )));
        }
        Ok(())
    }
}
