pub mod sql;
pub mod tokens;

pub use sql::{sql_for_partial_update, PartialUpdate};
pub use tokens::{create_token, decode_token, Claims};
