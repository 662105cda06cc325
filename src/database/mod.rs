pub mod filter;
pub mod manager;
pub mod params;

pub use filter::{contains_pattern, WhereBuilder};
pub use manager::{DatabaseError, DatabaseManager};
pub use params::{update_arguments, ColumnKind};
