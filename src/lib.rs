//! catalogo: REST API over an article catalogue and its price lists.
//!
//! - [`storage`]: pooled SQLite access, CRUD queries and the two upsert modes
//! - [`api`]: axum router, handlers and JSON error mapping
//! - [`config`]: TOML configuration with environment overrides

pub mod api;
pub mod config;
pub mod storage;
