//! # entmap-data-sqlx — SQLx transport for entmap
//!
//! Runs the statements generated by [`entmap-data`] on an `sqlx::AnyPool`.
//! Statements carry `:name` placeholders; [`named`] rewrites them to `$n` for
//! Postgres and `?` elsewhere before binding.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxExecutor`] | [`Executor`](entmap_data::Executor) over an `AnyPool` |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `EntityError` (`.into_entity_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, EntityError>` |
//!
//! # Feature flags
//!
//! Enable the drivers you connect to:
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `mysql`    | MySQL via `sqlx/mysql` |
//!
//! # Quick start
//!
//! ```ignore
//! use entmap_data::Repository;
//! use entmap_data_sqlx::SqlxExecutor;
//!
//! let db = SqlxExecutor::connect("postgres://localhost/app").await?;
//! let users = Repository::<User, _>::new(db);
//! users.insert(&mut user).await?;
//! ```

pub mod error;
pub mod executor;
pub mod named;
pub mod row;

pub use error::{SqlxErrorExt, SqlxResult};
pub use executor::{driver_from_url, SqlxExecutor};

/// Re-exports of the most commonly used types from both `entmap-data` and this crate.
pub mod prelude {
    pub use crate::{SqlxErrorExt, SqlxExecutor};
    pub use entmap_data::prelude::*;
}
