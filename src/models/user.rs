use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{Arguments, FromRow, PgPool};

use crate::config;
use crate::database::{update_arguments, ColumnKind, DatabaseError};
use crate::error::ApiError;
use crate::helpers::sql::sql_for_partial_update;
use crate::schemas::UserNew;

/// Payload field -> column for user updates
pub static JS_TO_SQL: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("isAdmin", "is_admin"),
    ])
});

const COLUMNS: &str = "username, first_name, last_name, email, is_admin";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// A user with the ids of the jobs they applied to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithJobs {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

impl User {
    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords fail the same way.
    pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<User, ApiError> {
        let stored: Option<(String,)> = sqlx::query_as("SELECT password FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        if let Some((hash,)) = stored {
            if verify_password(password, &hash).await? {
                return Self::find(pool, username).await;
            }
        }

        tracing::warn!("Failed login for {}", username);
        Err(ApiError::unauthorized("Invalid username/password"))
    }

    pub async fn register(pool: &PgPool, data: &UserNew) -> Result<User, ApiError> {
        let hashed = hash_password(&data.password).await?;
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&data.username)
            .bind(&hashed)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.email)
            .bind(data.is_admin)
            .fetch_one(pool)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                err if err.is_unique_violation() => {
                    DatabaseError::Duplicate(format!("Duplicate username: {}", data.username))
                }
                err => err,
            })?;

        tracing::info!("Registered user {}", user.username);
        Ok(user)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, ApiError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
    }

    /// A user and the jobs they applied to.
    pub async fn get(pool: &PgPool, username: &str) -> Result<UserWithJobs, ApiError> {
        let user = Self::find(pool, username).await?;
        let jobs: Vec<i32> =
            sqlx::query_scalar("SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id")
                .bind(username)
                .fetch_all(pool)
                .await?;

        Ok(UserWithJobs { user, jobs })
    }

    /// Partial update. A new password is hashed before it is stored.
    pub async fn update(pool: &PgPool, username: &str, data: &Map<String, Value>) -> Result<User, ApiError> {
        let mut data = data.clone();
        if let Some(Value::String(password)) = data.get("password").cloned() {
            let hashed = hash_password(&password).await?;
            data.insert("password".to_string(), Value::String(hashed));
        }

        let update = sql_for_partial_update(&data, &JS_TO_SQL)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            update.set_cols,
            update.next_placeholder(),
            COLUMNS
        );

        let mut args = update_arguments(&data, &update, Self::column_kind)?;
        args.add(username.to_string());

        sqlx::query_as_with::<_, User, _>(&sql, args)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))?;

        tracing::info!("Removed user {}", username);
        Ok(())
    }

    /// Record an application; applying twice is a no-op.
    pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), ApiError> {
        let job: Option<i32> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(pool)
            .await?;
        if job.is_none() {
            return Err(ApiError::not_found(format!("No job: {}", job_id)));
        }

        let user: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        if user.is_none() {
            return Err(ApiError::not_found(format!("No username: {}", username)));
        }

        sqlx::query("INSERT INTO applications (job_id, username) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(job_id)
            .bind(username)
            .execute(pool)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                // Job or user deleted since the checks above
                err if err.is_foreign_key_violation() => {
                    DatabaseError::NotFound(missing_application_target(err.constraint().as_deref(), username, job_id))
                }
                err => err,
            })?;

        tracing::info!("{} applied to job {}", username, job_id);
        Ok(())
    }

    async fn find(pool: &PgPool, username: &str) -> Result<User, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))
    }

    fn column_kind(field: &str) -> ColumnKind {
        match field {
            "isAdmin" => ColumnKind::Boolean,
            _ => ColumnKind::Text,
        }
    }
}

// bcrypt blocks; run it on the blocking pool
async fn hash_password(password: &str) -> Result<String, ApiError> {
    let password = password.to_string();
    let cost = config::config().security.bcrypt_work_factor;
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("password hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("password check task failed: {}", e)))?
        .map_err(ApiError::from)
}

fn missing_application_target(constraint: Option<&str>, username: &str, job_id: i32) -> String {
    match constraint {
        Some("applications_username_fkey") => format!("No username: {}", username),
        _ => format!("No job: {}", job_id),
    }
}
