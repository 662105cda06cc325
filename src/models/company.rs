use std::collections::HashMap;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{Arguments, FromRow, PgPool};

use crate::database::{contains_pattern, update_arguments, ColumnKind, DatabaseError, WhereBuilder};
use crate::error::ApiError;
use crate::helpers::sql::sql_for_partial_update;
use crate::schemas::{CompanyNew, CompanySearch};

/// Payload field -> column for company updates
pub static JS_TO_SQL: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| HashMap::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")]));

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// Unique constraint Postgres names for `companies.name`
const NAME_CONSTRAINT: &str = "companies_name_key";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A job as listed under its company
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

impl Company {
    /// Create a company. Fails with 400 if the handle or name is taken.
    pub async fn create(pool: &PgPool, data: &CompanyNew) -> Result<Company, ApiError> {
        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            COLUMNS
        );

        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(pool)
            .await
            .map_err(|e| Self::duplicate(e.into(), &data.handle, Some(data.name.as_str())))?;

        tracing::info!("Created company {}", company.handle);
        Ok(company)
    }

    /// All companies matching the search filters, ordered by name.
    pub async fn find_all(pool: &PgPool, search: &CompanySearch) -> Result<Vec<Company>, ApiError> {
        let mut filters = WhereBuilder::new();
        if let Some(name) = &search.name {
            filters.push(contains_pattern(name), |p| format!("name ILIKE {}", p));
        }
        if let Some(min) = search.min_employees {
            filters.push(min, |p| format!("num_employees >= {}", p));
        }
        if let Some(max) = search.max_employees {
            filters.push(max, |p| format!("num_employees <= {}", p));
        }

        let sql = format!("SELECT {} FROM companies {} ORDER BY name", COLUMNS, filters.where_sql());
        let companies = sqlx::query_as_with::<_, Company, _>(&sql, filters.into_arguments())
            .fetch_all(pool)
            .await?;
        Ok(companies)
    }

    /// A company and its jobs.
    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyWithJobs, ApiError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COLUMNS);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))?;

        let jobs = sqlx::query_as::<_, CompanyJob>(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(pool)
        .await?;

        Ok(CompanyWithJobs { company, jobs })
    }

    /// Partial update; `data` may hold any of name, description, numEmployees, logoUrl.
    pub async fn update(pool: &PgPool, handle: &str, data: &Map<String, Value>) -> Result<Company, ApiError> {
        let update = sql_for_partial_update(data, &JS_TO_SQL)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            update.set_cols,
            update.next_placeholder(),
            COLUMNS
        );

        let mut args = update_arguments(data, &update, Self::column_kind)?;
        args.add(handle.to_string());

        let name = data.get("name").and_then(Value::as_str);
        sqlx::query_as_with::<_, Company, _>(&sql, args)
            .fetch_optional(pool)
            .await
            .map_err(|e| Self::duplicate(e.into(), handle, name))?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))?;

        tracing::info!("Removed company {}", handle);
        Ok(())
    }

    /// Turn a unique violation into a 400 naming the field that collided.
    fn duplicate(err: DatabaseError, handle: &str, name: Option<&str>) -> DatabaseError {
        if !err.is_unique_violation() {
            return err;
        }
        DatabaseError::Duplicate(duplicate_message(err.constraint().as_deref(), handle, name))
    }

    fn column_kind(field: &str) -> ColumnKind {
        match field {
            "numEmployees" => ColumnKind::Integer,
            _ => ColumnKind::Text,
        }
    }
}

fn duplicate_message(constraint: Option<&str>, handle: &str, name: Option<&str>) -> String {
    match (constraint, name) {
        (Some(NAME_CONSTRAINT), Some(name)) => format!("Duplicate company name: {}", name),
        _ => format!("Duplicate company: {}", handle),
    }
}
