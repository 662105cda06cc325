use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Compiled `SET` clause for a partial update.
///
/// `set_cols` holds `"column"=$N` assignments joined by `, `; `values[N-1]`
/// is the value bound to `$N`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub set_cols: String,
    pub values: Vec<Value>,
}

impl PartialUpdate {
    /// Placeholder index for a parameter appended after the SET values,
    /// e.g. the primary key in `WHERE handle = $N`.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build the `SET` portion of an `UPDATE` from a partial payload.
///
/// `data_to_update` is enumerated in insertion order. Each key is written as
/// the column named by `js_to_sql`, or as itself when unmapped:
///
/// ```
/// use std::collections::HashMap;
/// use jobly_api::helpers::sql::sql_for_partial_update;
///
/// let data = serde_json::json!({ "firstName": "Aliya", "age": 32 });
/// let aliases = HashMap::from([("firstName", "first_name")]);
/// let update = sql_for_partial_update(data.as_object().unwrap(), &aliases).unwrap();
/// assert_eq!(update.set_cols, r#""first_name"=$1, "age"=$2"#);
/// ```
///
/// Column names come from the alias map or from payload keys that have
/// already passed schema validation; they are quoted but not escaped.
pub fn sql_for_partial_update(
    data_to_update: &Map<String, Value>,
    js_to_sql: &HashMap<&str, &str>,
) -> Result<PartialUpdate, ApiError> {
    if data_to_update.is_empty() {
        return Err(ApiError::bad_request("No data"));
    }

    let cols: Vec<String> = data_to_update
        .keys()
        .enumerate()
        .map(|(idx, col_name)| {
            let column = js_to_sql.get(col_name.as_str()).copied().unwrap_or(col_name.as_str());
            format!("\"{}\"=${}", column, idx + 1)
        })
        .collect();

    Ok(PartialUpdate {
        set_cols: cols.join(", "),
        values: data_to_update.values().cloned().collect(),
    })
}
