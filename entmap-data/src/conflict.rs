//! Unique-constraint violation detection.
//!
//! Drivers do not share structured error codes, so each dialect family
//! matches the message text its server produces. This is best-effort only:
//! server locale, driver wrapping or version changes can alter the text, in
//! which case the error is reported as a plain transport failure.

use crate::dialect::Dialect;

/// Recognises unique-constraint violations for one dialect family.
pub trait ConflictClassifier: Send + Sync {
    /// Message fragments that identify a unique violation.
    fn signatures(&self) -> &'static [&'static str];

    fn is_conflict(&self, message: &str) -> bool {
        self.signatures().iter().any(|sig| message.contains(sig))
    }
}

pub struct PostgresConflicts;

impl ConflictClassifier for PostgresConflicts {
    fn signatures(&self) -> &'static [&'static str] {
        &["duplicate key value violates unique constraint"]
    }
}

pub struct MySqlConflicts;

impl ConflictClassifier for MySqlConflicts {
    fn signatures(&self) -> &'static [&'static str] {
        &["Duplicate entry"]
    }
}

pub struct SqliteConflicts;

impl ConflictClassifier for SqliteConflicts {
    fn signatures(&self) -> &'static [&'static str] {
        &["UNIQUE constraint failed"]
    }
}

/// Never classifies anything as a conflict.
pub struct NoConflicts;

impl ConflictClassifier for NoConflicts {
    fn signatures(&self) -> &'static [&'static str] {
        &[]
    }
}

pub fn classifier(dialect: Dialect) -> &'static dyn ConflictClassifier {
    match dialect {
        Dialect::Postgres => &PostgresConflicts,
        Dialect::MySql => &MySqlConflicts,
        Dialect::Sqlite => &SqliteConflicts,
        Dialect::Generic => &NoConflicts,
    }
}

/// Whether `err`, or any error in its source chain, is a unique violation.
pub fn is_conflict_error(dialect: Dialect, err: &(dyn std::error::Error + 'static)) -> bool {
    let classifier = classifier(dialect);
    let mut current = Some(err);
    while let Some(e) = current {
        if classifier.is_conflict(&e.to_string()) {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapped(std::io::Error);

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("insert failed")
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    fn io(msg: &str) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, msg.to_string())
    }

    #[test]
    fn test_per_dialect_signatures() {
        let pg = io("ERROR: duplicate key value violates unique constraint \"users_email_key\"");
        let my = io("Error 1062: Duplicate entry 'a@b.com' for key 'email'");
        let lite = io("UNIQUE constraint failed: users.email");

        assert!(is_conflict_error(Dialect::Postgres, &pg));
        assert!(is_conflict_error(Dialect::MySql, &my));
        assert!(is_conflict_error(Dialect::Sqlite, &lite));

        assert!(!is_conflict_error(Dialect::Postgres, &lite));
        assert!(!is_conflict_error(Dialect::Sqlite, &my));
        assert!(!is_conflict_error(Dialect::Generic, &pg));
    }

    #[test]
    fn test_walks_source_chain() {
        let err = Wrapped(io("UNIQUE constraint failed: users.email"));
        assert!(is_conflict_error(Dialect::Sqlite, &err));
    }
}
