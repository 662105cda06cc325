use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::{postgres::PgArguments, Arguments};

use super::manager::DatabaseError;
use crate::helpers::sql::PartialUpdate;

/// Postgres type a JSON value is bound as.
///
/// sqlx sends a concrete type for every parameter, so a JSON string headed
/// for a NUMERIC column must be bound as a decimal, and a null must carry the
/// column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Numeric,
    Boolean,
}

/// Append one JSON value to `args` as `kind`.
fn push_value(args: &mut PgArguments, column: &str, kind: ColumnKind, v: &Value) -> Result<(), DatabaseError> {
    let invalid = |reason: &str| DatabaseError::InvalidParam {
        column: column.to_string(),
        reason: reason.to_string(),
    };

    match (kind, v) {
        (ColumnKind::Text, Value::Null) => args.add(None::<String>),
        (ColumnKind::Integer, Value::Null) => args.add(None::<i32>),
        (ColumnKind::Numeric, Value::Null) => args.add(None::<Decimal>),
        (ColumnKind::Boolean, Value::Null) => args.add(None::<bool>),

        (ColumnKind::Text, Value::String(s)) => args.add(s.clone()),
        (ColumnKind::Text, _) => return Err(invalid("expected a string")),

        (ColumnKind::Integer, Value::Number(n)) => {
            let i = n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .ok_or_else(|| invalid("expected a 32-bit integer"))?;
            args.add(i)
        }
        (ColumnKind::Integer, _) => return Err(invalid("expected an integer")),

        (ColumnKind::Numeric, Value::String(s)) => {
            let d = Decimal::from_str(s.trim()).map_err(|_| invalid("expected a decimal"))?;
            args.add(d)
        }
        (ColumnKind::Numeric, Value::Number(n)) => {
            let d = Decimal::from_str(&n.to_string()).map_err(|_| invalid("expected a decimal"))?;
            args.add(d)
        }
        (ColumnKind::Numeric, _) => return Err(invalid("expected a decimal")),

        (ColumnKind::Boolean, Value::Bool(b)) => args.add(*b),
        (ColumnKind::Boolean, _) => return Err(invalid("expected a boolean")),
    }

    Ok(())
}

/// Bind the values of a compiled partial update, in placeholder order.
///
/// `data` is the map the update was compiled from; its keys pick each
/// value's type through `kind_of`.
pub fn update_arguments(
    data: &Map<String, Value>,
    update: &PartialUpdate,
    kind_of: fn(&str) -> ColumnKind,
) -> Result<PgArguments, DatabaseError> {
    let mut args = PgArguments::default();
    for (field, value) in data.keys().zip(update.values.iter()) {
        push_value(&mut args, field, kind_of(field), value)?;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_matching_values() {
        let mut args = PgArguments::default();
        push_value(&mut args, "title", ColumnKind::Text, &json!("job")).unwrap();
        push_value(&mut args, "salary", ColumnKind::Integer, &json!(100)).unwrap();
        push_value(&mut args, "equity", ColumnKind::Numeric, &json!("0.5")).unwrap();
        push_value(&mut args, "equity", ColumnKind::Numeric, &json!(0)).unwrap();
        push_value(&mut args, "isAdmin", ColumnKind::Boolean, &json!(true)).unwrap();
        push_value(&mut args, "equity", ColumnKind::Numeric, &Value::Null).unwrap();
    }

    #[test]
    fn rejects_mismatched_values() {
        let mut args = PgArguments::default();
        let err = push_value(&mut args, "salary", ColumnKind::Integer, &json!("lots")).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidParam { ref column, .. } if column == "salary"));
        assert!(push_value(&mut args, "salary", ColumnKind::Integer, &json!(1.5)).is_err());
        assert!(push_value(&mut args, "salary", ColumnKind::Integer, &json!(i64::MAX)).is_err());
        assert!(push_value(&mut args, "equity", ColumnKind::Numeric, &json!("half")).is_err());
        assert!(push_value(&mut args, "name", ColumnKind::Text, &json!(3)).is_err());
    }

    #[test]
    fn update_arguments_follow_data_order() {
        let data = json!({ "title": "t", "salary": 5 }).as_object().cloned().unwrap();
        let update = PartialUpdate {
            set_cols: "\"title\"=$1, \"salary\"=$2".into(),
            values: data.values().cloned().collect(),
        };
        let kind_of = |field: &str| if field == "salary" { ColumnKind::Integer } else { ColumnKind::Text };
        assert!(update_arguments(&data, &update, kind_of).is_ok());

        let bad = json!({ "title": "t", "salary": "five" }).as_object().cloned().unwrap();
        let update = PartialUpdate {
            set_cols: "\"title\"=$1, \"salary\"=$2".into(),
            values: bad.values().cloned().collect(),
        };
        assert!(update_arguments(&bad, &update, kind_of).is_err());
    }
}
