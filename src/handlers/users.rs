use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use serde_json::{json, Value};

use super::jobs::parse_job_id;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::helpers::tokens::create_token;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::User;
use crate::schemas::{validate_body, validate_update, UserNew, UserUpdate};

/// POST /users - Admin creates a user, possibly another admin
///
/// Output: `{ "user": {...}, "token": "..." }` with 201
pub async fn create(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = payload?;
    let data: UserNew = validate_body(body)?;

    let pool = DatabaseManager::pool().await?;
    let user = User::register(&pool, &data).await?;
    let token = create_token(&user.username, user.is_admin)?;
    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

/// GET /users - All users (admin)
pub async fn list() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let users = User::find_all(&pool).await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /users/:username - A user and their applications
pub async fn get(Path(username): Path<String>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let user = User::get(&pool, &username).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// PATCH /users/:username - Partial update; only admins may change `isAdmin`
pub async fn update(
    Path(username): Path<String>,
    Extension(caller): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let data = validate_update::<UserUpdate>(body)?;
    if data.contains_key("isAdmin") && !caller.is_admin {
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let pool = DatabaseManager::pool().await?;
    let user = User::update(&pool, &username, &data).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// DELETE /users/:username
pub async fn remove(Path(username): Path<String>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    User::remove(&pool, &username).await?;
    Ok(ApiResponse::success(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id - Apply to a job
pub async fn apply(Path((username, id)): Path<(String, String)>) -> ApiResult<Value> {
    let job_id = parse_job_id(&id)?;

    let pool = DatabaseManager::pool().await?;
    User::apply_to_job(&pool, &username, job_id).await?;
    Ok(ApiResponse::success(json!({ "applied": job_id })))
}
