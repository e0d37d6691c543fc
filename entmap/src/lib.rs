//! entmap — entity-relational mapping for SQL stores.
//!
//! This facade crate re-exports the entmap sub-crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use entmap::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature    | Default | Crate                        |
//! |------------|---------|------------------------------|
//! | `cache`    | **yes** | `entmap-cache`               |
//! | `sqlx`     | no      | `entmap-data-sqlx`           |
//! | `sqlite`   | no      | `entmap-data-sqlx/sqlite`    |
//! | `postgres` | no      | `entmap-data-sqlx/postgres`  |
//! | `mysql`    | no      | `entmap-data-sqlx/mysql`     |
//! | `full`     | no      | `cache` + `sqlx`             |
//!
//! # Example
//!
//! ```ignore
//! use entmap::prelude::*;
//!
//! #[derive(Entity, Default)]
//! #[entity(table = "accounts")]
//! struct Account {
//!     #[column(primary_key, auto_increment)]
//!     id: i64,
//!     #[column]
//!     email: String,
//! }
//!
//! let db = entmap::entmap_data_sqlx::SqlxExecutor::connect("sqlite://app.db").await?;
//! let mut account = Account { email: "a@b.com".into(), ..Default::default() };
//! let id = entmap::crud::insert(&mut account, &db).await?;
//! ```

// Re-export sub-crates as public modules so they're accessible as
// `entmap::entmap_data`, `entmap::entmap_cache`, etc.
//
// The derive macros use `proc-macro-crate` to detect whether the user depends
// on `entmap` (facade) or individual crates, and generate the correct paths.
extern crate self as entmap;

pub extern crate entmap_data;
pub extern crate entmap_macros;

// Re-export everything from entmap-data at the top level for convenience.
pub use entmap_data::*;

pub use entmap_macros::{Cacheable, Entity};

#[cfg(feature = "cache")]
pub use entmap_cache;

#[cfg(feature = "sqlx")]
pub use entmap_data_sqlx;

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use entmap_data::prelude::*;
    pub use entmap_macros::{Cacheable, Entity};

    pub use chrono::{DateTime, Utc};

    #[cfg(feature = "cache")]
    pub use entmap_cache::prelude::*;

    #[cfg(feature = "sqlx")]
    pub use entmap_data_sqlx::SqlxExecutor;
}
