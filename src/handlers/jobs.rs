use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Json,
};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Job;
use crate::schemas::{validate_body, validate_update, JobNew, JobSearch, JobUpdate};

/// Job ids are integers; anything else cannot name a job.
pub(crate) fn parse_job_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| ApiError::not_found(format!("No job: {}", raw)))
}

/// POST /jobs - Post a job (admin)
pub async fn create(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = payload?;
    let data: JobNew = validate_body(body)?;

    let pool = DatabaseManager::pool().await?;
    let job = Job::create(&pool, &data).await?;
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// GET /jobs - List jobs, filtered by title, minSalary, hasEquity
pub async fn list(Query(query): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let search = JobSearch::from_query(&query)?;

    let pool = DatabaseManager::pool().await?;
    let jobs = Job::find_all(&pool, &search).await?;
    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id
pub async fn get(Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_job_id(&id)?;

    let pool = DatabaseManager::pool().await?;
    let job = Job::get(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// PATCH /jobs/:id - Partial update (admin); the company cannot change
pub async fn update(Path(id): Path<String>, payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let id = parse_job_id(&id)?;
    let Json(body) = payload?;
    let data = validate_update::<JobUpdate>(body)?;

    let pool = DatabaseManager::pool().await?;
    let job = Job::update(&pool, id, &data).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// DELETE /jobs/:id - Remove (admin)
pub async fn remove(Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_job_id(&id)?;

    let pool = DatabaseManager::pool().await?;
    Job::remove(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id.to_string() })))
}
