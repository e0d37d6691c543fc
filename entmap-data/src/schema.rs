use std::any::TypeId;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::entity::Entity;
use crate::error::EntityError;

/// A single persisted column and its mapping flags.
///
/// Flags combine freely. `primary_key` and `auto_increment` also mark the
/// column `refuse_update`; `returning` is shorthand for
/// `returning_insert + returning_update + refuse_update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub db_field: String,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub refuse_update: bool,
    pub returning_insert: bool,
    pub returning_update: bool,
    pub ignored: bool,
}

impl Column {
    pub fn new(db_field: impl Into<String>) -> Self {
        Self {
            db_field: db_field.into(),
            primary_key: false,
            auto_increment: false,
            refuse_update: false,
            returning_insert: false,
            returning_update: false,
            ignored: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.refuse_update = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.refuse_update = true;
        self
    }

    pub fn refuse_update(mut self) -> Self {
        self.refuse_update = true;
        self
    }

    pub fn returning_insert(mut self) -> Self {
        self.returning_insert = true;
        self
    }

    pub fn returning_update(mut self) -> Self {
        self.returning_update = true;
        self
    }

    pub fn returning(self) -> Self {
        self.returning_insert().returning_update().refuse_update()
    }

    /// Drop the column from the mapping entirely.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn deprecated(self) -> Self {
        self.ignored()
    }

    /// Whether the column takes part in the INSERT column/VALUES list.
    pub fn is_insertable(&self) -> bool {
        !self.auto_increment && !self.returning_insert
    }
}

/// Ordered column declarations for one entity type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

/// Identity of the entity type a [`Metadata`] was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataId {
    type_id: TypeId,
    name: &'static str,
}

impl MetadataId {
    pub fn of<E: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Immutable schema description of an entity type.
#[derive(Debug, Clone)]
pub struct Metadata {
    id: MetadataId,
    table_name: String,
    columns: Vec<Column>,
    primary_keys: Vec<Column>,
    has_returning_insert: bool,
    has_returning_update: bool,
}

impl Metadata {
    /// Derive metadata from an entity type, bypassing the process-wide cache.
    pub fn build<E: Entity>() -> Result<Self, EntityError> {
        Self::from_schema(MetadataId::of::<E>(), E::table_name(), E::schema())
    }

    pub fn from_schema(
        id: MetadataId,
        table_name: &str,
        schema: Schema,
    ) -> Result<Self, EntityError> {
        if table_name.is_empty() {
            return Err(EntityError::NoTableName { entity: id.name });
        }
        if !is_valid_identifier(table_name) {
            return Err(EntityError::InvalidEntityShape(format!(
                "{}: invalid table name '{table_name}'",
                id.name
            )));
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for column in schema.columns.into_iter().filter(|c| !c.ignored) {
            if !is_valid_identifier(&column.db_field) {
                return Err(EntityError::InvalidEntityShape(format!(
                    "{}: invalid column name '{}'",
                    id.name, column.db_field
                )));
            }
            if !seen.insert(column.db_field.clone()) {
                return Err(EntityError::InvalidEntityShape(format!(
                    "{}: duplicate column '{}'",
                    id.name, column.db_field
                )));
            }
            columns.push(column);
        }

        let primary_keys: Vec<Column> = columns.iter().filter(|c| c.primary_key).cloned().collect();
        if primary_keys.is_empty() {
            return Err(EntityError::NoPrimaryKey { entity: id.name });
        }

        Ok(Self {
            id,
            table_name: table_name.to_string(),
            has_returning_insert: columns.iter().any(|c| c.returning_insert),
            has_returning_update: columns.iter().any(|c| c.returning_update),
            columns,
            primary_keys,
        })
    }

    pub fn id(&self) -> MetadataId {
        self.id
    }

    /// Type name of the entity, used in error and log context.
    pub fn entity(&self) -> &'static str {
        self.id.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn primary_keys(&self) -> &[Column] {
        &self.primary_keys
    }

    pub fn column(&self, db_field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.db_field == db_field)
    }

    pub fn has_returning_insert(&self) -> bool {
        self.has_returning_insert
    }

    pub fn has_returning_update(&self) -> bool {
        self.has_returning_update
    }
}

fn registry() -> &'static DashMap<TypeId, Arc<Metadata>> {
    static METADATA: OnceLock<DashMap<TypeId, Arc<Metadata>>> = OnceLock::new();
    METADATA.get_or_init(DashMap::new)
}

/// Get the metadata of `E`, deriving and caching it on first access.
///
/// Validation failures are returned every time and never cached.
pub fn metadata<E: Entity>() -> Result<Arc<Metadata>, EntityError> {
    let key = TypeId::of::<E>();
    if let Some(md) = registry().get(&key) {
        return Ok(md.clone());
    }

    let md = Arc::new(Metadata::build::<E>()?);
    tracing::debug!(
        entity = md.entity(),
        table = md.table_name(),
        columns = md.columns().len(),
        "entity metadata derived"
    );
    // First writer wins when two callers race on the same type.
    Ok(registry().entry(key).or_insert(md).clone())
}

fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
