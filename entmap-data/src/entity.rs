use std::future::Future;

use crate::error::EntityError;
use crate::schema::Schema;
use crate::value::{Value, ValueError};

/// Trait representing a mapped entity: one row of one table.
///
/// Intended to be implemented via `#[derive(Entity)]`, or manually when the
/// column layout has to be assembled at runtime.
///
/// # Example
///
/// ```ignore
/// impl Entity for Account {
///     fn table_name() -> &'static str { "accounts" }
///     fn schema() -> Schema {
///         Schema::new()
///             .column(Column::new("id").primary_key().auto_increment())
///             .column(Column::new("email"))
///             .column(Column::new("created_at").refuse_update().returning_insert())
///     }
///     fn value_of(&self, column: &str) -> Option<Value> {
///         match column {
///             "id" => Some(self.id.to_value()),
///             "email" => Some(self.email.to_value()),
///             "created_at" => Some(self.created_at.to_value()),
///             _ => None,
///         }
///     }
///     fn set_value(&mut self, column: &str, value: Value) -> Result<(), ValueError> {
///         match column {
///             "id" => self.id = FromValue::from_value(value)?,
///             "email" => self.email = FromValue::from_value(value)?,
///             "created_at" => self.created_at = FromValue::from_value(value)?,
///             other => return Err(ValueError::UnknownColumn(other.to_string())),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Entity: Send + Sync + 'static {
    fn table_name() -> &'static str;

    /// Column declarations in declaration order, ignored ones included.
    fn schema() -> Schema;

    /// Value bound to the `:column` named parameter.
    fn value_of(&self, column: &str) -> Option<Value>;

    /// Write a value scanned from the store back into the entity.
    fn set_value(&mut self, column: &str, value: Value) -> Result<(), ValueError>;
}

/// Lifecycle transitions reported to [`EntityEvents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
    AfterLoad,
}

/// Lifecycle hook fired by [`Repository`](crate::Repository).
///
/// The default implementation does nothing; `#[derive(Entity)]` generates it
/// unless `#[entity(hooks)]` is given.
pub trait EntityEvents {
    fn on_entity_event(
        &mut self,
        _event: Event,
    ) -> impl Future<Output = Result<(), EntityError>> + Send {
        async { Ok(()) }
    }
}
