//! Architect admin: generated list/create/edit/delete/export endpoints for declared record types,
//! routed through a named endpoint tree.

pub mod admin;
pub mod blueprint;
pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod query;
pub mod response;
pub mod sql;
pub mod state;
pub mod storage;
pub mod validation;
pub mod view;

pub use admin::{Admin, MenuItem};
pub use blueprint::{encode_pairs, encode_query, Blueprint, Registrar};
pub use config::{init_tracing, validate_view_config, AdminSettings, ModelViewConfig, ValidationRule};
pub use error::{AppError, ConfigError};
pub use model::{describe_from_sample, Choice, Column, ColumnType, FieldSchema, Model, ModelRegistry, Record, Row};
pub use query::{num_pages, Query, QueryOptions};
pub use state::AdminState;
pub use storage::{MemoryStorage, PgStorage, Storage};
pub use view::{ModelView, ModelViewState};
