use crate::statement::Operation;

/// Boxed error returned by execution transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while mapping, generating or executing entity statements.
#[derive(Debug)]
pub enum EntityError {
    /// The entity declaration cannot be turned into metadata or bound to a statement.
    InvalidEntityShape(String),
    /// `Entity::table_name()` returned an empty string.
    NoTableName { entity: &'static str },
    /// No column is flagged as primary key.
    NoPrimaryKey { entity: &'static str },
    /// RETURNING was required on a dialect that cannot express it.
    UnsupportedReturning {
        entity: &'static str,
        operation: Operation,
        dialect: &'static str,
    },
    /// Zero rows came back from load / returning statements, or zero rows were affected by an update.
    NotFound {
        entity: &'static str,
        operation: Operation,
    },
    /// A row-returning statement produced more than the single row it targets.
    TooManyRows {
        entity: &'static str,
        operation: Operation,
    },
    /// The store reported a unique-constraint violation (best-effort classification).
    Conflict {
        entity: &'static str,
        operation: Operation,
        source: BoxError,
    },
    /// Any other failure reported by the execution transport.
    Transport {
        entity: &'static str,
        operation: Operation,
        source: BoxError,
    },
    /// A returned column could not be written back into the entity.
    Scan {
        entity: &'static str,
        column: String,
        source: crate::value::ValueError,
    },
    /// Failure raised by a lifecycle hook.
    Hook(BoxError),
}

impl EntityError {
    /// Wrap a failure raised from an [`EntityEvents`](crate::EntityEvents) hook.
    pub fn hook(err: impl Into<BoxError>) -> Self {
        EntityError::Hook(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EntityError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, EntityError::Conflict { .. })
    }
}

impl std::fmt::Display for EntityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityError::InvalidEntityShape(msg) => write!(f, "Invalid entity shape: {msg}"),
            EntityError::NoTableName { entity } => write!(f, "Entity {entity}: empty table name"),
            EntityError::NoPrimaryKey { entity } => {
                write!(f, "Entity {entity}: no primary key column")
            }
            EntityError::UnsupportedReturning {
                entity,
                operation,
                dialect,
            } => write!(
                f,
                "Entity {entity}: {operation} requires RETURNING, which {dialect} does not support"
            ),
            EntityError::NotFound { entity, operation } => {
                write!(f, "Entity {entity}: {operation} matched no rows")
            }
            EntityError::TooManyRows { entity, operation } => {
                write!(f, "Entity {entity}: {operation} returned more than one row")
            }
            EntityError::Conflict {
                entity,
                operation,
                source,
            } => write!(f, "Entity {entity}: {operation} conflict: {source}"),
            EntityError::Transport {
                entity,
                operation,
                source,
            } => write!(f, "Entity {entity}: {operation} failed: {source}"),
            EntityError::Scan {
                entity,
                column,
                source,
            } => write!(f, "Entity {entity}: cannot scan column '{column}': {source}"),
            EntityError::Hook(err) => write!(f, "Entity event hook failed: {err}"),
        }
    }
}

impl std::error::Error for EntityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EntityError::Conflict { source, .. } | EntityError::Transport { source, .. } => {
                Some(source.as_ref())
            }
            EntityError::Scan { source, .. } => Some(source),
            EntityError::Hook(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
