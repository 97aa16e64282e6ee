//! # Day Planner Postgres Adapter
//!
//! [`UserStore`] over a `sqlx` Postgres pool. Email uniqueness is enforced
//! by the database; a unique violation surfaces as `DuplicateEntry`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dayplanner_core::error::{PlannerError, PlannerResult};
use dayplanner_core::traits::UserStore;
use dayplanner_core::types::User;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    avatar        TEXT,
    role          TEXT NOT NULL DEFAULT 'user',
    is_verified   BOOLEAN NOT NULL DEFAULT FALSE,
    created_at    TIMESTAMPTZ NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL
)
"#;

const CREATE_EMAIL_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)";

const USER_COLUMNS: &str =
    "id, name, email, password_hash, avatar, role, is_verified, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    avatar: Option<String>,
    role: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            avatar: row.avatar,
            role: row.role,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn db_error(err: sqlx::Error) -> PlannerError {
    PlannerError::database(err.to_string())
}

/// Maps a write failure, turning unique violations on email into `DuplicateEntry`.
fn write_error(err: sqlx::Error, email: &str) -> PlannerError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return PlannerError::duplicate("user", "email", email);
    }
    db_error(err)
}

/// Postgres-backed user store.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> PlannerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(db_error)?;
        tracing::info!(max_connections, "Connected to Postgres");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `users` table and its unique email index if missing.
    pub async fn migrate(&self) -> PlannerResult<()> {
        sqlx::query(CREATE_USERS)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        sqlx::query(CREATE_EMAIL_INDEX)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        tracing::debug!("Users schema ready");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create_user(&self, user: &User) -> PlannerResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, avatar, role, is_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(&user.role)
        .bind(user.is_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &user.email))?;

        Ok(user.clone())
    }

    async fn get_user_by_id(&self, id: &str) -> PlannerResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> PlannerResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(User::from))
    }

    async fn update_user(&self, user: &User) -> PlannerResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, avatar = $5,
                role = $6, is_verified = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(&user.role)
        .bind(user.is_verified)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &user.email))?;

        if result.rows_affected() == 0 {
            return Err(PlannerError::not_found("user", "id", &user.id));
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> PlannerResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
