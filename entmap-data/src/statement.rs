//! Per-dialect CRUD statement generation and the process-wide statement memo.
//!
//! Every statement uses `:column` named parameters; transports rebind them to
//! their native placeholder style.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::dialect::Dialect;
use crate::error::EntityError;
use crate::schema::{Column, Metadata, MetadataId};

/// The four canonical single-entity operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How the executor has to read the outcome of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultShape {
    /// The statement yields rows carrying these columns.
    RowsReturned { columns: Vec<String> },
    /// The statement yields an affected-row count only.
    AffectedCount,
}

/// Generated SQL together with the parameter names it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    operation: Operation,
    sql: String,
    params: Vec<String>,
    shape: ResultShape,
}

impl Statement {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Named parameters in order of first appearance.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn shape(&self) -> &ResultShape {
        &self.shape
    }

    pub fn returns_rows(&self) -> bool {
        matches!(self.shape, ResultShape::RowsReturned { .. })
    }
}

struct SqlWriter {
    dialect: Dialect,
    sql: String,
    params: Vec<String>,
}

impl SqlWriter {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    fn push_ident(&mut self, ident: &str) {
        self.sql.push_str(&self.dialect.quote(ident));
    }

    fn push_param(&mut self, name: &str) {
        self.sql.push(':');
        self.sql.push_str(name);
        if !self.params.iter().any(|p| p == name) {
            self.params.push(name.to_string());
        }
    }

    fn push_ident_list<'a>(&mut self, columns: impl IntoIterator<Item = &'a Column>) {
        for (idx, col) in columns.into_iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.push_ident(&col.db_field);
        }
    }

    fn push_assignments<'a>(&mut self, columns: impl IntoIterator<Item = &'a Column>, sep: &str) {
        for (idx, col) in columns.into_iter().enumerate() {
            if idx > 0 {
                self.push(sep);
            }
            self.push_ident(&col.db_field);
            self.push(" = ");
            self.push_param(&col.db_field);
        }
    }

    fn push_where_primary_keys(&mut self, md: &Metadata) {
        self.push(" WHERE ");
        self.push_assignments(md.primary_keys(), " AND ");
    }

    fn push_returning(&mut self, columns: &[&Column]) {
        self.push(" RETURNING ");
        self.push_ident_list(columns.iter().copied());
    }

    fn finish(self, operation: Operation, shape: ResultShape) -> Statement {
        Statement {
            operation,
            sql: self.sql,
            params: self.params,
            shape,
        }
    }
}

fn column_names(columns: &[&Column]) -> Vec<String> {
    columns.iter().map(|c| c.db_field.clone()).collect()
}

fn check_returning(
    md: &Metadata,
    operation: Operation,
    dialect: Dialect,
) -> Result<(), EntityError> {
    if dialect.supports_returning() {
        Ok(())
    } else {
        Err(EntityError::UnsupportedReturning {
            entity: md.entity(),
            operation,
            dialect: dialect.name(),
        })
    }
}

/// `SELECT <all columns> FROM <table> WHERE <pk = :pk ...> LIMIT 1`
pub fn select_statement(md: &Metadata, dialect: Dialect) -> Result<Statement, EntityError> {
    let mut w = SqlWriter::new(dialect);
    w.push("SELECT ");
    w.push_ident_list(md.columns());
    w.push(" FROM ");
    w.push_ident(md.table_name());
    w.push_where_primary_keys(md);
    w.push(" LIMIT 1");

    let columns = md.columns().iter().map(|c| c.db_field.clone()).collect();
    Ok(w.finish(Operation::Select, ResultShape::RowsReturned { columns }))
}

/// INSERT of every column that is neither auto-increment nor returning-on-insert.
pub fn insert_statement(md: &Metadata, dialect: Dialect) -> Result<Statement, EntityError> {
    let returning: Vec<&Column> = md.columns().iter().filter(|c| c.returning_insert).collect();
    if !returning.is_empty() {
        check_returning(md, Operation::Insert, dialect)?;
    }
    let values: Vec<&Column> = md.columns().iter().filter(|c| c.is_insertable()).collect();

    let mut w = SqlWriter::new(dialect);
    w.push("INSERT INTO ");
    w.push_ident(md.table_name());
    if values.is_empty() {
        w.push(" ");
        w.push(dialect.empty_insert());
    } else {
        w.push(" (");
        w.push_ident_list(values.iter().copied());
        w.push(") VALUES (");
        for (idx, col) in values.iter().enumerate() {
            if idx > 0 {
                w.push(", ");
            }
            w.push_param(&col.db_field);
        }
        w.push(")");
    }

    let shape = if returning.is_empty() {
        ResultShape::AffectedCount
    } else {
        w.push_returning(&returning);
        ResultShape::RowsReturned {
            columns: column_names(&returning),
        }
    };
    Ok(w.finish(Operation::Insert, shape))
}

/// UPDATE of every column not flagged refuse-update, keyed by primary key.
pub fn update_statement(md: &Metadata, dialect: Dialect) -> Result<Statement, EntityError> {
    let returning: Vec<&Column> = md.columns().iter().filter(|c| c.returning_update).collect();
    if !returning.is_empty() {
        check_returning(md, Operation::Update, dialect)?;
    }
    let set: Vec<&Column> = md.columns().iter().filter(|c| !c.refuse_update).collect();
    if set.is_empty() {
        return Err(EntityError::InvalidEntityShape(format!(
            "{}: no updatable columns",
            md.entity()
        )));
    }

    let mut w = SqlWriter::new(dialect);
    w.push("UPDATE ");
    w.push_ident(md.table_name());
    w.push(" SET ");
    w.push_assignments(set.iter().copied(), ", ");
    w.push_where_primary_keys(md);

    let shape = if returning.is_empty() {
        ResultShape::AffectedCount
    } else {
        w.push_returning(&returning);
        ResultShape::RowsReturned {
            columns: column_names(&returning),
        }
    };
    Ok(w.finish(Operation::Update, shape))
}

/// `DELETE FROM <table> WHERE <pk = :pk ...>`
pub fn delete_statement(md: &Metadata, dialect: Dialect) -> Result<Statement, EntityError> {
    let mut w = SqlWriter::new(dialect);
    w.push("DELETE FROM ");
    w.push_ident(md.table_name());
    w.push_where_primary_keys(md);
    Ok(w.finish(Operation::Delete, ResultShape::AffectedCount))
}

pub fn generate(
    md: &Metadata,
    operation: Operation,
    dialect: Dialect,
) -> Result<Statement, EntityError> {
    match operation {
        Operation::Select => select_statement(md, dialect),
        Operation::Insert => insert_statement(md, dialect),
        Operation::Update => update_statement(md, dialect),
        Operation::Delete => delete_statement(md, dialect),
    }
}

/// Memo key: entity type, operation and dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementKey {
    pub entity: MetadataId,
    pub operation: Operation,
    pub dialect: Dialect,
}

/// Concurrent memo of generated statements. Entries are never evicted.
#[derive(Default)]
pub struct StatementCache {
    inner: DashMap<StatementKey, Arc<Statement>>,
}

impl StatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &StatementKey) -> Option<Arc<Statement>> {
        self.inner.get(key).map(|s| s.clone())
    }

    /// Return the cached statement or build it. Build errors are not cached.
    ///
    /// `build` runs outside any shard lock; if two callers race, the first
    /// stored statement wins and both receive it.
    pub fn get_or_try_insert_with<F>(
        &self,
        key: StatementKey,
        build: F,
    ) -> Result<Arc<Statement>, EntityError>
    where
        F: FnOnce() -> Result<Statement, EntityError>,
    {
        if let Some(stmt) = self.get(&key) {
            return Ok(stmt);
        }
        let stmt = Arc::new(build()?);
        Ok(self.inner.entry(key).or_insert(stmt).clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// The process-wide statement memo.
pub fn statements() -> &'static StatementCache {
    static STATEMENTS: OnceLock<StatementCache> = OnceLock::new();
    STATEMENTS.get_or_init(StatementCache::new)
}

/// Memoised [`generate`].
pub fn statement(
    md: &Metadata,
    operation: Operation,
    dialect: Dialect,
) -> Result<Arc<Statement>, EntityError> {
    let key = StatementKey {
        entity: md.id(),
        operation,
        dialect,
    };
    statements().get_or_try_insert_with(key, || {
        let stmt = generate(md, operation, dialect)?;
        tracing::debug!(
            entity = md.entity(),
            %operation,
            %dialect,
            sql = stmt.sql(),
            "statement generated"
        );
        Ok(stmt)
    })
}
