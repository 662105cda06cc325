use std::collections::HashMap;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{Arguments, FromRow, PgPool};

use crate::database::{contains_pattern, update_arguments, ColumnKind, DatabaseError, WhereBuilder};
use crate::error::ApiError;
use crate::helpers::sql::sql_for_partial_update;
use crate::schemas::{JobNew, JobSearch};

/// Payload field -> column for job updates
pub static JS_TO_SQL: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| HashMap::from([("companyHandle", "company_handle")]));

const COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl Job {
    pub async fn create(pool: &PgPool, data: &JobNew) -> Result<Job, ApiError> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity_decimal())
            .bind(&data.company_handle)
            .fetch_one(pool)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                err if err.is_foreign_key_violation() => {
                    DatabaseError::NotFound(format!("No company: {}", data.company_handle))
                }
                err => err,
            })?;

        tracing::info!("Created job {} for {}", job.id, job.company_handle);
        Ok(job)
    }

    /// All jobs matching the search filters, in posting order.
    ///
    /// `hasEquity=false` is the same as leaving the filter out.
    pub async fn find_all(pool: &PgPool, search: &JobSearch) -> Result<Vec<Job>, ApiError> {
        let mut filters = WhereBuilder::new();
        if let Some(title) = &search.title {
            filters.push(contains_pattern(title), |p| format!("title ILIKE {}", p));
        }
        if let Some(min_salary) = search.min_salary {
            filters.push(min_salary, |p| format!("salary >= {}", p));
        }
        if search.has_equity {
            filters.push_raw("equity > 0");
        }

        let sql = format!("SELECT {} FROM jobs {} ORDER BY id", COLUMNS, filters.where_sql());
        let jobs = sqlx::query_as_with::<_, Job, _>(&sql, filters.into_arguments())
            .fetch_all(pool)
            .await?;
        Ok(jobs)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<Job, ApiError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", COLUMNS);
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))
    }

    /// Partial update of title, salary and equity. A null salary or equity clears it.
    pub async fn update(pool: &PgPool, id: i32, data: &Map<String, Value>) -> Result<Job, ApiError> {
        let update = sql_for_partial_update(data, &JS_TO_SQL)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            update.set_cols,
            update.next_placeholder(),
            COLUMNS
        );

        let mut args = update_arguments(data, &update, Self::column_kind)?;
        args.add(id);

        sqlx::query_as_with::<_, Job, _>(&sql, args)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))?;

        tracing::info!("Removed job {}", id);
        Ok(())
    }

    fn column_kind(field: &str) -> ColumnKind {
        match field {
            "salary" => ColumnKind::Integer,
            "equity" => ColumnKind::Numeric,
            _ => ColumnKind::Text,
        }
    }
}
