use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Json,
};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Company;
use crate::schemas::{validate_body, validate_update, CompanyNew, CompanySearch, CompanyUpdate};

/// POST /companies - Create a company (admin)
pub async fn create(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = payload?;
    let data: CompanyNew = validate_body(body)?;

    let pool = DatabaseManager::pool().await?;
    let company = Company::create(&pool, &data).await?;
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// GET /companies - List companies, filtered by name, minEmployees, maxEmployees
pub async fn list(Query(query): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let search = CompanySearch::from_query(&query)?;

    let pool = DatabaseManager::pool().await?;
    let companies = Company::find_all(&pool, &search).await?;
    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle - A company with its jobs
pub async fn get(Path(handle): Path<String>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let company = Company::get(&pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// PATCH /companies/:handle - Partial update (admin)
pub async fn update(Path(handle): Path<String>, payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = payload?;
    let data = validate_update::<CompanyUpdate>(body)?;

    let pool = DatabaseManager::pool().await?;
    let company = Company::update(&pool, &handle, &data).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// DELETE /companies/:handle - Remove (admin)
pub async fn remove(Path(handle): Path<String>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    Company::remove(&pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
