use sqlx::{postgres::PgArguments, Arguments, Encode, Postgres, Type};

/// Accumulates `AND`-joined WHERE conditions with positional parameters.
pub struct WhereBuilder {
    conditions: Vec<String>,
    args: PgArguments,
    param_index: usize,
}

impl Default for WhereBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self {
            conditions: vec![],
            args: PgArguments::default(),
            param_index: 0,
        }
    }

    /// Add a condition; `build` receives the placeholder (`$N`) for `value`.
    pub fn push<T>(&mut self, value: T, build: impl FnOnce(&str) -> String) -> &mut Self
    where
        T: 'static + Send + for<'q> Encode<'q, Postgres> + Type<Postgres>,
    {
        self.param_index += 1;
        let placeholder = format!("${}", self.param_index);
        self.conditions.push(build(&placeholder));
        self.args.add(value);
        self
    }

    /// Add a condition that binds nothing
    pub fn push_raw(&mut self, condition: impl Into<String>) -> &mut Self {
        self.conditions.push(condition.into());
        self
    }

    /// `WHERE ...` clause, or an empty string when there are no conditions
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn into_arguments(self) -> PgArguments {
        self.args
    }
}

/// `%value%` for a substring `ILIKE`; backslash, `%` and `_` in `value` match literally.
pub fn contains_pattern(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}
