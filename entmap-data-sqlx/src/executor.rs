use std::future::Future;

use entmap_data::{BoxError, Dialect, ExecResult, Executor, Params, Row, Value};
use sqlx::any::{AnyArguments, AnyPoolOptions};
use sqlx::query::Query;
use sqlx::{Any, AnyPool};

use crate::named::{self, Compiled};
use crate::row;

/// [`Executor`] running entity statements on an `sqlx::AnyPool`.
///
/// # Example
///
/// ```ignore
/// let db = SqlxExecutor::connect("sqlite://app.db").await?;
/// entmap::crud::insert(&mut account, &db).await?;
/// ```
#[derive(Clone)]
pub struct SqlxExecutor {
    pool: AnyPool,
    driver: String,
}

impl SqlxExecutor {
    /// Wrap an existing pool. `driver` selects the SQL dialect.
    pub fn new(pool: AnyPool, driver: impl Into<String>) -> Self {
        Self {
            pool,
            driver: driver.into(),
        }
    }

    /// Connect with default pool options, inferring the driver from the URL scheme.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        Self::connect_with(AnyPoolOptions::new(), url).await
    }

    pub async fn connect_with(options: AnyPoolOptions, url: &str) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let driver = driver_from_url(url);
        let pool = options.connect(url).await?;
        tracing::debug!(driver, "sqlx executor connected");
        Ok(Self::new(pool, driver))
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    fn dialect(&self) -> Dialect {
        Dialect::from_driver(&self.driver)
    }
}

/// Driver name for a connection URL such as `postgres://...` or `sqlite::memory:`.
pub fn driver_from_url(url: &str) -> &'static str {
    let scheme = url.split(':').next().unwrap_or_default();
    match scheme.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => "postgres",
        "mysql" | "mariadb" => "mysql",
        "sqlite" => "sqlite3",
        _ => "generic",
    }
}

/// Rewrite `sql` for `dialect`.
///
/// Timestamps travel as RFC 3339 text, so on Postgres their placeholders are
/// cast to `timestamptz`; the server then assigns them to `timestamp` or
/// `timestamptz` columns alike.
fn compile_for(sql: &str, dialect: Dialect, params: &Params) -> Compiled {
    named::compile_with_casts(sql, dialect, |name| {
        params
            .iter()
            .any(|(param, value)| param == name && matches!(value, Value::Timestamp(_)))
            .then_some("timestamptz")
    })
}

fn bind_all<'q>(compiled: &'q Compiled, params: &Params) -> Result<Query<'q, Any, AnyArguments<'q>>, BoxError> {
    let mut query = sqlx::query(&compiled.sql);
    for name in &compiled.binds {
        let value = params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| format!("no value bound for parameter ':{name}'"))?;
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(v),
            Value::Int(v) => query.bind(v),
            Value::Float(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
            Value::Bytes(v) => query.bind(v),
            Value::Timestamp(v) => query.bind(v.to_rfc3339()),
        };
    }
    Ok(query)
}

impl Executor for SqlxExecutor {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    fn query(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = Result<Vec<Row>, BoxError>> + Send {
        let compiled = compile_for(sql, self.dialect(), params);
        async move {
            tracing::trace!(sql = %compiled.sql, "sqlx query");
            let rows = bind_all(&compiled, params)?
                .fetch_all(&self.pool)
                .await?;
            let rows = rows.iter().map(row::convert).collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }
    }

    fn execute(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl Future<Output = Result<ExecResult, BoxError>> + Send {
        let compiled = compile_for(sql, self.dialect(), params);
        async move {
            tracing::trace!(sql = %compiled.sql, "sqlx execute");
            let done = bind_all(&compiled, params)?.execute(&self.pool).await?;
            Ok(ExecResult {
                rows_affected: done.rows_affected(),
                last_insert_id: done.last_insert_id(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_url() {
        assert_eq!(driver_from_url("postgres://localhost/app"), "postgres");
        assert_eq!(driver_from_url("postgresql://localhost/app"), "postgres");
        assert_eq!(driver_from_url("mysql://root@localhost/app"), "mysql");
        assert_eq!(driver_from_url("sqlite::memory:"), "sqlite3");
        assert_eq!(driver_from_url("sqlite://data.db"), "sqlite3");
        assert_eq!(driver_from_url("odbc://dsn"), "generic");
    }

    #[test]
    fn test_timestamps_cast_on_postgres() {
        let at = chrono::DateTime::from_timestamp(1_714_564_800, 0).unwrap_or_default();
        let params = vec![
            ("title".to_string(), Value::Text("t".into())),
            ("at".to_string(), Value::Timestamp(at)),
        ];
        let sql = r#"INSERT INTO "notes" ("title", "at") VALUES (:title, :at)"#;

        let pg = compile_for(sql, Dialect::Postgres, &params);
        assert_eq!(
            pg.sql,
            r#"INSERT INTO "notes" ("title", "at") VALUES ($1, $2::timestamptz)"#
        );

        let lite = compile_for(sql, Dialect::Sqlite, &params);
        assert_eq!(lite.sql, r#"INSERT INTO "notes" ("title", "at") VALUES (?, ?)"#);
    }
}
