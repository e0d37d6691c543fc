//! # entmap-data — entity mapping core
//!
//! Turns an entity declaration into immutable [`Metadata`], generates
//! dialect-correct CRUD statements for it (memoised per entity type,
//! operation and dialect) and runs them through any [`Executor`].
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`schema`] | [`Column`] flags, [`Schema`] declarations, cached [`Metadata`] |
//! | [`statement`] | SELECT / INSERT / UPDATE / DELETE generation and the statement memo |
//! | [`crud`] | Binding, execution and RETURNING / affected-row interpretation |
//! | [`conflict`] | Per-dialect unique-violation classifiers |
//! | [`repository`] | [`Repository`] firing [`EntityEvents`] around CRUD calls |

pub mod conflict;
pub mod crud;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod executor;
pub mod repository;
pub mod schema;
pub mod statement;
pub mod value;

pub use dialect::Dialect;
pub use entity::{Entity, EntityEvents, Event};
pub use error::{BoxError, EntityError};
pub use executor::{ExecResult, Executor, Params, Row};
pub use repository::Repository;
pub use schema::{metadata, Column, Metadata, MetadataId, Schema};
pub use statement::{Operation, ResultShape, Statement};
pub use value::{FromValue, ToValue, Value, ValueError};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        Column, Entity, EntityError, EntityEvents, Event, Executor, FromValue, Repository,
        Schema, ToValue, Value,
    };
}
