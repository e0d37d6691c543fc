use entmap_data::{EntityError, Operation};

/// Extension trait for converting `sqlx::Error` into `EntityError`.
///
/// The CRUD layer already classifies executor failures by message; this is
/// for code that runs its own queries next to entity statements and wants the
/// same error vocabulary. Unique violations are detected from the driver's
/// error kind, not its message.
pub trait SqlxErrorExt {
    fn into_entity_error(self, entity: &'static str, operation: Operation) -> EntityError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_entity_error(self, entity: &'static str, operation: Operation) -> EntityError {
        match &self {
            sqlx::Error::RowNotFound => EntityError::NotFound { entity, operation },
            sqlx::Error::Database(db) if db.is_unique_violation() => EntityError::Conflict {
                entity,
                operation,
                source: Box::new(self),
            },
            _ => EntityError::Transport {
                entity,
                operation,
                source: Box::new(self),
            },
        }
    }
}

/// Convenience alias for results using `EntityError`.
pub type SqlxResult<T> = Result<T, EntityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found() {
        let err = sqlx::Error::RowNotFound.into_entity_error("User", Operation::Select);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_errors_are_transport() {
        let err = sqlx::Error::PoolTimedOut.into_entity_error("User", Operation::Insert);
        assert!(matches!(
            err,
            EntityError::Transport {
                operation: Operation::Insert,
                ..
            }
        ));
    }
}
