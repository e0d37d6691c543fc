/// SQL dialect a statement is generated for.
///
/// Transports report a driver name; [`Dialect::from_driver`] maps every known
/// alias onto its base dialect before any dispatch happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
    /// Anything unrecognised: ANSI quoting, no RETURNING, no last-insert-id.
    Generic,
}

impl Dialect {
    /// Normalise a driver name such as `pgx` or `sqlite3`.
    pub fn from_driver(driver: &str) -> Self {
        match driver.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgx" | "pg" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            _ => Dialect::Generic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite3",
            Dialect::Generic => "generic",
        }
    }

    /// Whether INSERT / UPDATE can carry a RETURNING clause. Unknown engines
    /// are assumed not to, so returning columns fail with
    /// [`EntityError::UnsupportedReturning`](crate::EntityError::UnsupportedReturning).
    pub fn supports_returning(self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::Sqlite)
    }

    /// Whether the driver reports the last inserted id on a plain exec.
    pub fn supports_last_insert_id(self) -> bool {
        matches!(self, Dialect::MySql | Dialect::Sqlite)
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Postgres | Dialect::Sqlite | Dialect::Generic => '"',
        }
    }

    /// Quote an identifier that has already been validated.
    pub fn quote(self, ident: &str) -> String {
        let quote = self.quote_char();
        format!("{quote}{ident}{quote}")
    }

    /// Tail of an INSERT with no value columns.
    pub(crate) fn empty_insert(self) -> &'static str {
        match self {
            Dialect::MySql => "() VALUES ()",
            Dialect::Postgres | Dialect::Sqlite | Dialect::Generic => "DEFAULT VALUES",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_aliases() {
        assert_eq!(Dialect::from_driver("pgx"), Dialect::Postgres);
        assert_eq!(Dialect::from_driver("postgres"), Dialect::Postgres);
        assert_eq!(Dialect::from_driver("PostgreSQL"), Dialect::Postgres);
        assert_eq!(Dialect::from_driver("mariadb"), Dialect::MySql);
        assert_eq!(Dialect::from_driver("sqlite3"), Dialect::Sqlite);
        assert_eq!(Dialect::from_driver("sqlite"), Dialect::Sqlite);
        assert_eq!(Dialect::from_driver("oracle"), Dialect::Generic);
    }

    #[test]
    fn test_capabilities() {
        assert!(!Dialect::MySql.supports_returning());
        assert!(Dialect::Postgres.supports_returning());
        assert!(!Dialect::Postgres.supports_last_insert_id());
        assert!(Dialect::Sqlite.supports_last_insert_id());
        assert!(!Dialect::Generic.supports_returning());
        assert!(!Dialect::Generic.supports_last_insert_id());
    }

    #[test]
    fn test_quoting() {
        assert_eq!(Dialect::MySql.quote("id"), "`id`");
        assert_eq!(Dialect::Postgres.quote("id"), "\"id\"");
    }
}
