use std::future::Future;

use crate::error::BoxError;
use crate::value::Value;

/// Values bound to a statement's named parameters, in parameter order.
pub type Params = Vec<(String, Value)>;

/// One row returned by the store, columns in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn into_columns(self) -> Vec<(String, Value)> {
        self.columns
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Outcome of a statement run without reading rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// `None` when the driver does not report it.
    pub last_insert_id: Option<i64>,
}

/// The execution transport entity statements run through.
///
/// Statements carry `:name` placeholders; implementations rebind them to the
/// driver's native style using `params`. Uses RPITIT, no `async-trait` needed.
/// Dropping a returned future must abandon the underlying call.
pub trait Executor: Send + Sync {
    /// Driver identity, e.g. `postgres`, `pgx`, `mysql`, `sqlite3`.
    fn driver_name(&self) -> &str;

    /// Run a row-returning statement.
    fn query(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = Result<Vec<Row>, BoxError>> + Send;

    /// Run a statement for its affected-row count / last inserted id.
    fn execute(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = Result<ExecResult, BoxError>> + Send;
}

impl<X: Executor> Executor for &X {
    fn driver_name(&self) -> &str {
        (**self).driver_name()
    }

    fn query(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = Result<Vec<Row>, BoxError>> + Send {
        (**self).query(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = Result<ExecResult, BoxError>> + Send {
        (**self).execute(sql, params)
    }
}
