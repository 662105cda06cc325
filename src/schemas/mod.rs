//! Request payload validation.
//!
//! Each payload is a serde struct with `deny_unknown_fields`, so shape and
//! types are checked by deserialization; [`Validate`] adds the field rules
//! serde cannot express (lengths, ranges, formats).

pub mod company;
pub mod job;
pub mod user;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

pub use company::{CompanyNew, CompanySearch, CompanyUpdate};
pub use job::{JobNew, JobSearch, JobUpdate};
pub use user::{UserAuth, UserNew, UserRegister, UserUpdate};

/// Field rules checked after a payload deserializes.
pub trait Validate {
    fn validate(&self, errors: &mut Vec<String>);
}

/// Partial-update payloads: which fields may be explicitly set to null.
pub trait UpdateSchema: Validate + DeserializeOwned {
    const NULLABLE: &'static [&'static str] = &[];
}

/// Deserialize and validate a request body.
pub fn validate_body<T>(body: Value) -> Result<T, ApiError>
where
    T: Validate + DeserializeOwned,
{
    let parsed: T = serde_json::from_value(body).map_err(|e| ApiError::validation_error(vec![e.to_string()]))?;

    let mut errors = vec![];
    parsed.validate(&mut errors);
    if !errors.is_empty() {
        return Err(ApiError::validation_error(errors));
    }
    Ok(parsed)
}

/// Validate a partial-update body and hand back its fields in client order.
pub fn validate_update<T: UpdateSchema>(body: Value) -> Result<Map<String, Value>, ApiError> {
    let data = match body {
        Value::Object(map) => map,
        _ => return Err(ApiError::validation_error(vec!["instance is not of a type(s) object".to_string()])),
    };

    let mut errors: Vec<String> = data
        .iter()
        .filter(|(key, value)| value.is_null() && !T::NULLABLE.contains(&key.as_str()))
        .map(|(key, _)| format!("instance.{} may not be null", key))
        .collect();
    if !errors.is_empty() {
        return Err(ApiError::validation_error(errors));
    }

    let parsed: T =
        serde_json::from_value(Value::Object(data.clone())).map_err(|e| ApiError::validation_error(vec![e.to_string()]))?;
    parsed.validate(&mut errors);
    if !errors.is_empty() {
        return Err(ApiError::validation_error(errors));
    }

    Ok(data)
}

/// Reject query parameters outside `allowed`.
pub(crate) fn check_query_keys(query: &HashMap<String, String>, allowed: &[&str]) -> Result<(), ApiError> {
    let mut unknown: Vec<String> = query
        .keys()
        .filter(|k| !allowed.contains(&k.as_str()))
        .map(|k| format!("instance is not allowed to have the additional property \"{}\"", k))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        unknown.sort();
        Err(ApiError::validation_error(unknown))
    }
}

pub(crate) fn parse_query_int(query: &HashMap<String, String>, key: &str, errors: &mut Vec<String>) -> Option<i32> {
    let raw = query.get(key)?;
    match raw.trim().parse::<i32>() {
        Ok(n) if n >= 0 => Some(n),
        _ => {
            errors.push(format!("instance.{} must be a non-negative integer", key));
            None
        }
    }
}

pub(crate) fn check_length(errors: &mut Vec<String>, field: &str, value: &str, min: usize, max: Option<usize>) {
    let len = value.chars().count();
    if len < min {
        errors.push(format!("instance.{} does not meet minimum length of {}", field, min));
    }
    if let Some(max) = max {
        if len > max {
            errors.push(format!("instance.{} does not meet maximum length of {}", field, max));
        }
    }
}

pub(crate) fn check_non_negative(errors: &mut Vec<String>, field: &str, value: Option<i32>) {
    if matches!(value, Some(n) if n < 0) {
        errors.push(format!("instance.{} must be greater than or equal to 0", field));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_query_keys_are_listed() {
        let query = HashMap::from([("testFilter".to_string(), "0".to_string())]);
        let err = check_query_keys(&query, &["title"]).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_json()["error"]["message"][0].as_str().unwrap().contains("testFilter"));
    }

    #[test]
    fn query_ints_must_be_non_negative() {
        let query = HashMap::from([
            ("minSalary".to_string(), "1000".to_string()),
            ("bad".to_string(), "-1".to_string()),
        ]);
        let mut errors = vec![];
        assert_eq!(parse_query_int(&query, "minSalary", &mut errors), Some(1000));
        assert_eq!(parse_query_int(&query, "bad", &mut errors), None);
        assert_eq!(parse_query_int(&query, "missing", &mut errors), None);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let mut errors = vec![];
        check_length(&mut errors, "handle", "c1", 1, Some(25));
        assert!(errors.is_empty());
        check_length(&mut errors, "handle", "", 1, Some(25));
        check_length(&mut errors, "handle", &"x".repeat(26), 1, Some(25));
        assert_eq!(errors.len(), 2);
    }
}
