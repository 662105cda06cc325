use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::helpers::tokens::create_token;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::User;
use crate::schemas::{validate_body, UserAuth, UserNew, UserRegister};

/// POST /auth/token - Exchange username/password for a JWT
///
/// Input: `{ "username": "...", "password": "..." }`
/// Output: `{ "token": "..." }`
pub async fn token(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = payload?;
    let credentials: UserAuth = validate_body(body)?;

    let pool = DatabaseManager::pool().await?;
    let user = User::authenticate(&pool, &credentials.username, &credentials.password).await?;
    let token = create_token(&user.username, user.is_admin)?;

    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register - Self-service signup, never grants admin
///
/// Input: `{ "username", "password", "firstName", "lastName", "email" }`
/// Output: `{ "token": "..." }` with 201
pub async fn register(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = payload?;
    let registration: UserRegister = validate_body(body)?;

    let pool = DatabaseManager::pool().await?;
    let user = User::register(&pool, &UserNew::from(registration)).await?;
    let token = create_token(&user.username, user.is_admin)?;

    Ok(ApiResponse::created(json!({ "token": token })))
}

/// GET /auth/whoami - Identity carried by the caller's token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user": {
            "username": user.username,
            "isAdmin": user.is_admin,
        }
    })))
}
