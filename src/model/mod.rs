//! Record introspection: columns, rows and the per-type model registry.

mod column;
mod record;
mod registry;
mod schema;

pub use column::{Choice, Column, ColumnType, FieldSchema};
pub use record::{describe_from_sample, Record};
pub use registry::ModelRegistry;
pub use schema::{Model, Row};
