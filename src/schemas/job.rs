use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{check_length, check_non_negative, check_query_keys, parse_query_int, UpdateSchema, Validate};
use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobNew {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company_handle: String,
}

impl Validate for JobNew {
    fn validate(&self, errors: &mut Vec<String>) {
        check_length(errors, "title", &self.title, 1, None);
        check_non_negative(errors, "salary", self.salary);
        if let Some(equity) = &self.equity {
            check_equity(errors, equity);
        }
        check_length(errors, "companyHandle", &self.company_handle, 1, Some(25));
    }
}

impl JobNew {
    pub fn equity_decimal(&self) -> Option<Decimal> {
        self.equity.as_deref().and_then(|e| Decimal::from_str(e.trim()).ok())
    }
}

/// A job's company is fixed once posted, so `companyHandle` is not accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub salary: Option<i32>,
    pub equity: Option<String>,
}

impl Validate for JobUpdate {
    fn validate(&self, errors: &mut Vec<String>) {
        if let Some(title) = &self.title {
            check_length(errors, "title", title, 1, None);
        }
        check_non_negative(errors, "salary", self.salary);
        if let Some(equity) = &self.equity {
            check_equity(errors, equity);
        }
    }
}

impl UpdateSchema for JobUpdate {
    const NULLABLE: &'static [&'static str] = &["salary", "equity"];
}

/// Filters accepted by `GET /jobs`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSearch {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: bool,
}

impl JobSearch {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ApiError> {
        check_query_keys(query, &["title", "minSalary", "hasEquity"])?;

        let mut errors = vec![];
        let min_salary = parse_query_int(query, "minSalary", &mut errors);
        let has_equity = match query.get("hasEquity").map(|v| v.trim()) {
            None | Some("false") => false,
            Some("true") => true,
            Some(_) => {
                errors.push("instance.hasEquity is not of a type(s) boolean".to_string());
                false
            }
        };
        if !errors.is_empty() {
            return Err(ApiError::validation_error(errors));
        }

        Ok(Self {
            title: query.get("title").cloned(),
            min_salary,
            has_equity,
        })
    }
}

/// Equity is a fraction of the company, written as a decimal string in [0, 1].
fn check_equity(errors: &mut Vec<String>, equity: &str) {
    match Decimal::from_str(equity.trim()) {
        Ok(d) if d >= Decimal::ZERO && d <= Decimal::ONE => {}
        _ => errors.push("instance.equity must be a decimal string between 0 and 1".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{validate_body, validate_update};
    use serde_json::json;

    fn new_job() -> serde_json::Value {
        json!({
            "title": "job_new",
            "salary": 20000,
            "equity": "0",
            "companyHandle": "c1",
        })
    }

    #[test]
    fn accepts_valid_job() {
        let job: JobNew = validate_body(new_job()).unwrap();
        assert_eq!(job.company_handle, "c1");
        assert_eq!(job.equity_decimal(), Some(Decimal::ZERO));
    }

    #[test]
    fn rejects_missing_company() {
        assert!(validate_body::<JobNew>(json!({ "title": "new", "salary": 10 })).is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        let mut body = new_job();
        body["logoUrl"] = json!("not-a-url");
        assert!(validate_body::<JobNew>(body).is_err());
    }

    #[test]
    fn rejects_equity_above_one() {
        let mut body = new_job();
        body["equity"] = json!("1.5");
        assert!(validate_body::<JobNew>(body).is_err());
    }

    #[test]
    fn update_rejects_company_handle() {
        let err = validate_update::<JobUpdate>(json!({ "companyHandle": "c1-new" })).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn update_keeps_client_order_and_nulls() {
        let data = validate_update::<JobUpdate>(json!({
            "title": "job_c1_update",
            "salary": 100000,
            "equity": null,
        }))
        .unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["title", "salary", "equity"]);
        assert!(data["equity"].is_null());
    }

    #[test]
    fn search_parses_filters() {
        let query = HashMap::from([
            ("minSalary".to_string(), "1000".to_string()),
            ("hasEquity".to_string(), "true".to_string()),
        ]);
        assert_eq!(
            JobSearch::from_query(&query).unwrap(),
            JobSearch {
                title: None,
                min_salary: Some(1000),
                has_equity: true,
            }
        );
    }

    #[test]
    fn search_rejects_unknown_filter() {
        let query = HashMap::from([("testFilter".to_string(), "0".to_string())]);
        assert_eq!(JobSearch::from_query(&query).unwrap_err().status_code(), 400);
    }

    #[test]
    fn search_rejects_non_boolean_equity_flag() {
        let query = HashMap::from([("hasEquity".to_string(), "maybe".to_string())]);
        assert!(JobSearch::from_query(&query).is_err());
    }
}
