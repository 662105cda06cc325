use std::collections::HashMap;

use serde::Deserialize;

use super::{check_length, check_non_negative, check_query_keys, parse_query_int, UpdateSchema, Validate};
use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyNew {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl Validate for CompanyNew {
    fn validate(&self, errors: &mut Vec<String>) {
        check_length(errors, "handle", &self.handle, 1, Some(25));
        check_length(errors, "name", &self.name, 1, None);
        check_non_negative(errors, "numEmployees", self.num_employees);
        if let Some(logo_url) = &self.logo_url {
            check_logo_url(errors, logo_url);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl Validate for CompanyUpdate {
    fn validate(&self, errors: &mut Vec<String>) {
        if let Some(name) = &self.name {
            check_length(errors, "name", name, 1, None);
        }
        check_non_negative(errors, "numEmployees", self.num_employees);
        if let Some(logo_url) = &self.logo_url {
            check_logo_url(errors, logo_url);
        }
    }
}

impl UpdateSchema for CompanyUpdate {
    const NULLABLE: &'static [&'static str] = &["numEmployees", "logoUrl"];
}

/// Filters accepted by `GET /companies`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanySearch {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanySearch {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ApiError> {
        check_query_keys(query, &["name", "minEmployees", "maxEmployees"])?;

        let mut errors = vec![];
        let search = Self {
            name: query.get("name").cloned(),
            min_employees: parse_query_int(query, "minEmployees", &mut errors),
            max_employees: parse_query_int(query, "maxEmployees", &mut errors),
        };
        if !errors.is_empty() {
            return Err(ApiError::validation_error(errors));
        }

        if let (Some(min), Some(max)) = (search.min_employees, search.max_employees) {
            if min > max {
                return Err(ApiError::bad_request("Min employees cannot be greater than max"));
            }
        }
        Ok(search)
    }
}

fn check_logo_url(errors: &mut Vec<String>, logo_url: &str) {
    match url::Url::parse(logo_url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => {}
        _ => errors.push("instance.logoUrl does not conform to the \"uri\" format".to_string()),
    }
}
