use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use entmap_data::{BoxError, ExecResult, Executor, Params, Row};

/// Which transport entry point a statement went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Execute,
}

/// One statement received by a [`MockExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub kind: CallKind,
    pub sql: String,
    pub params: Params,
}

enum Scripted {
    Rows(Vec<Row>),
    Exec(ExecResult),
    Error(String),
}

/// In-process execution transport with scripted responses.
///
/// Responses are consumed in FIFO order regardless of which entry point asks
/// for them. With nothing scripted, `query` yields no rows and `execute`
/// reports zero affected rows.
///
/// ```ignore
/// let db = MockExecutor::new("postgres");
/// db.push_rows(vec![Row::new().with("id", 1i64)]);
/// entmap::crud::load(&mut user, &db).await?;
/// assert_eq!(db.calls()[0].params, vec![("id".into(), Value::Int(1))]);
/// ```
pub struct MockExecutor {
    driver: String,
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Call>>,
}

impl MockExecutor {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.push(Scripted::Rows(rows))
    }

    pub fn push_exec(&self, rows_affected: u64, last_insert_id: Option<i64>) -> &Self {
        self.push(Scripted::Exec(ExecResult {
            rows_affected,
            last_insert_id,
        }))
    }

    /// Fail the next call with this message, as a driver would.
    pub fn push_error(&self, message: impl Into<String>) -> &Self {
        self.push(Scripted::Error(message.into()))
    }

    /// Every statement received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_call(&self) -> Option<Call> {
        self.calls().pop()
    }

    fn push(&self, scripted: Scripted) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(scripted);
        self
    }

    fn next(&self, kind: CallKind, sql: &str, params: &Params) -> Option<Scripted> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Call {
                kind,
                sql: sql.to_string(),
                params: params.clone(),
            });
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

impl Executor for MockExecutor {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    fn query(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = Result<Vec<Row>, BoxError>> + Send {
        let result = match self.next(CallKind::Query, sql, params) {
            None => Ok(Vec::new()),
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::Error(msg)) => Err(msg.into()),
            Some(Scripted::Exec(_)) => Err("mock: exec result scripted for a query".into()),
        };
        async move { result }
    }

    fn execute(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = Result<ExecResult, BoxError>> + Send {
        let result = match self.next(CallKind::Execute, sql, params) {
            None => Ok(ExecResult::default()),
            Some(Scripted::Exec(res)) => Ok(res),
            Some(Scripted::Error(msg)) => Err(msg.into()),
            Some(Scripted::Rows(_)) => Err("mock: rows scripted for an exec".into()),
        };
        async move { result }
    }
}
