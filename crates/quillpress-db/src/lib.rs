//! # quillpress-db
//!
//! SQLite storage boundary shared by the account and blog stores.
//!
//! - [`Database`]: pool with foreign keys on, transactions, schema creation
//! - [`schema`]: sea-query DDL for every table
//! - [`query`]: sea-query DML rendering shared by the stores
//! - [`slugs`]: unique slug allocation and explicit slug checks

pub mod pool;
pub mod query;
pub mod schema;
pub mod slugs;

pub use pool::{is_slug_conflict, retry_on_slug_conflict, Database, Tx};
pub use query::{build_sql, qualified, timestamp};
pub use slugs::{resolve_slug, unique_slug, SlugTable, SLUG_RETRY_ATTEMPTS};

// Re-exported so stores and tests share one sqlx version
pub use sqlx;
