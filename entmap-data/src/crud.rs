//! Single-entity CRUD execution.
//!
//! Each function derives (or reuses) the entity's metadata and the memoised
//! statement for the executor's dialect, binds the entity's fields to the
//! statement's named parameters and interprets the result according to the
//! statement's [`ResultShape`](crate::statement::ResultShape). None of them
//! touch the cache layer or fire lifecycle events.

use std::sync::Arc;

use crate::conflict::is_conflict_error;
use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::{BoxError, EntityError};
use crate::executor::{ExecResult, Executor, Params, Row};
use crate::schema::{metadata, Metadata};
use crate::statement::{statement, Operation, Statement};

struct Prepared {
    md: Arc<Metadata>,
    dialect: Dialect,
    stmt: Arc<Statement>,
    params: Params,
}

fn prepare<E: Entity>(
    ent: &E,
    driver: &str,
    operation: Operation,
) -> Result<Prepared, EntityError> {
    let md = metadata::<E>()?;
    let dialect = Dialect::from_driver(driver);
    let stmt = statement(&md, operation, dialect)?;
    let params = bind(ent, &md, &stmt)?;
    Ok(Prepared {
        md,
        dialect,
        stmt,
        params,
    })
}

fn bind<E: Entity>(ent: &E, md: &Metadata, stmt: &Statement) -> Result<Params, EntityError> {
    stmt.params()
        .iter()
        .map(|name| match ent.value_of(name) {
            Some(value) => Ok((name.clone(), value)),
            None => Err(EntityError::InvalidEntityShape(format!(
                "{}: no value for column '{name}'",
                md.entity()
            ))),
        })
        .collect()
}

fn scan<E: Entity>(ent: &mut E, md: &Metadata, row: Row) -> Result<(), EntityError> {
    for (column, value) in row.into_columns() {
        if let Err(source) = ent.set_value(&column, value) {
            return Err(EntityError::Scan {
                entity: md.entity(),
                column,
                source,
            });
        }
    }
    Ok(())
}

impl Prepared {
    fn transport_error(&self, source: BoxError) -> EntityError {
        let entity = self.md.entity();
        let operation = self.stmt.operation();
        if is_conflict_error(self.dialect, source.as_ref()) {
            tracing::warn!(entity, %operation, dialect = %self.dialect, "unique constraint conflict");
            EntityError::Conflict {
                entity,
                operation,
                source,
            }
        } else {
            EntityError::Transport {
                entity,
                operation,
                source,
            }
        }
    }

    fn not_found(&self) -> EntityError {
        EntityError::NotFound {
            entity: self.md.entity(),
            operation: self.stmt.operation(),
        }
    }

    /// Run a row-returning statement and scan its single row into `ent`.
    ///
    /// Anything other than exactly one row leaves `ent` untouched.
    async fn query_one<E: Entity, X: Executor>(
        &self,
        ent: &mut E,
        db: &X,
    ) -> Result<(), EntityError> {
        tracing::trace!(sql = self.stmt.sql(), "query");
        let rows = db
            .query(self.stmt.sql(), &self.params)
            .await
            .map_err(|e| self.transport_error(e))?;
        let mut rows = rows.into_iter();
        let row = rows.next().ok_or_else(|| self.not_found())?;
        if rows.next().is_some() {
            return Err(EntityError::TooManyRows {
                entity: self.md.entity(),
                operation: self.stmt.operation(),
            });
        }
        scan(ent, &self.md, row)
    }

    async fn exec<X: Executor>(
        &self,
        db: &X,
    ) -> Result<ExecResult, EntityError> {
        tracing::trace!(sql = self.stmt.sql(), "execute");
        db.execute(self.stmt.sql(), &self.params)
            .await
            .map_err(|e| self.transport_error(e))
    }
}

/// Load the row matching `ent`'s primary key into `ent`.
///
/// Zero matching rows is [`EntityError::NotFound`].
pub async fn load<E: Entity, X: Executor>(
    ent: &mut E,
    db: &X,
) -> Result<(), EntityError> {
    let prepared = prepare(ent, db.driver_name(), Operation::Select)?;
    prepared.query_one(ent, db).await
}

/// Insert `ent`, populating any returning-on-insert columns.
///
/// Returns the driver-reported last inserted id for plain inserts, and `0`
/// when the statement uses RETURNING or the dialect has no last-insert-id.
/// A MySQL or SQLite driver that reports no id is a
/// [`EntityError::Transport`] failure.
pub async fn insert<E: Entity, X: Executor>(
    ent: &mut E,
    db: &X,
) -> Result<i64, EntityError> {
    let prepared = prepare(ent, db.driver_name(), Operation::Insert)?;
    if prepared.stmt.returns_rows() {
        prepared.query_one(ent, db).await?;
        return Ok(0);
    }

    let result = prepared.exec(db).await?;
    if !prepared.dialect.supports_last_insert_id() {
        return Ok(0);
    }
    result.last_insert_id.ok_or_else(|| EntityError::Transport {
        entity: prepared.md.entity(),
        operation: Operation::Insert,
        source: "driver did not report a last insert id".into(),
    })
}

/// Update `ent` by primary key, populating any returning-on-update columns.
///
/// Matching no row is [`EntityError::NotFound`].
pub async fn update<E: Entity, X: Executor>(
    ent: &mut E,
    db: &X,
) -> Result<(), EntityError> {
    let prepared = prepare(ent, db.driver_name(), Operation::Update)?;
    if prepared.stmt.returns_rows() {
        return prepared.query_one(ent, db).await;
    }

    let result = prepared.exec(db).await?;
    if result.rows_affected == 0 {
        return Err(prepared.not_found());
    }
    Ok(())
}

/// Delete `ent` by primary key. Deleting nothing is not an error.
pub async fn delete<E: Entity, X: Executor>(
    ent: &E,
    db: &X,
) -> Result<(), EntityError> {
    let prepared = prepare(ent, db.driver_name(), Operation::Delete)?;
    prepared.exec(db).await?;
    Ok(())
}
