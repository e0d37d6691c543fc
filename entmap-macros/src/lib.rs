extern crate proc_macro;
use proc_macro::TokenStream;

pub(crate) mod cacheable_derive;
pub(crate) mod crate_path;
pub(crate) mod entity_codegen;
pub(crate) mod entity_parsing;

/// Derive macro mapping a struct onto one table.
///
/// Only fields carrying `#[column]` are persisted; the column is named after
/// the field unless `name` says otherwise.
///
/// # Struct-level attribute
///
/// | Parameter | Required | Description |
/// |-----------|----------|-------------|
/// | `table`   | **yes**  | Table name |
/// | `hooks`   | no       | Skip the empty `EntityEvents` impl so the struct can provide its own |
///
/// # Field attribute `#[column(...)]`
///
/// | Flag | Description |
/// |------|-------------|
/// | `name = "..."` | Database column name |
/// | `primary_key` | Part of the primary key (never updated) |
/// | `auto_increment` | Assigned by the store; left out of INSERT |
/// | `refuse_update` | Left out of UPDATE ... SET |
/// | `returning_insert` | Read back from INSERT ... RETURNING |
/// | `returning_update` | Read back from UPDATE ... RETURNING |
/// | `returning` | `returning_insert + returning_update + refuse_update` |
/// | `ignore` / `deprecated` | Not mapped at all |
///
/// # Example
///
/// ```ignore
/// use entmap::prelude::*;
///
/// #[derive(Entity, Default)]
/// #[entity(table = "accounts")]
/// pub struct Account {
///     #[column(primary_key, auto_increment)]
///     pub id: i64,
///     #[column(name = "email_address")]
///     pub email: String,
///     #[column]
///     pub display_name: String,
///     #[column(refuse_update, returning_insert)]
///     pub created_at: Option<DateTime<Utc>>,
///     #[column(returning)]
///     pub version: i64,
///     pub scratch: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity_codegen::expand(input)
}

/// Derive macro that generates a [`Cacheable`](entmap_cache::Cacheable) impl
/// from a key template.
///
/// `{field}` placeholders in the key are filled from the entity's fields with
/// their `Display` impl. The type must implement `Serialize` and
/// `DeserializeOwned` to be saved and loaded.
///
/// | Parameter | Required | Description |
/// |-----------|----------|-------------|
/// | `key` | **yes** | Key template, e.g. `"account:{id}"` |
/// | `expiration_secs` | no | Entry lifetime; the process default applies otherwise |
/// | `codec` | no | `"json"` or `"msgpack"`; the process default applies otherwise |
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Cacheable)]
/// #[cache(key = "account:{id}", expiration_secs = 60)]
/// pub struct Account {
///     pub id: i64,
///     pub email: String,
/// }
/// ```
#[proc_macro_derive(Cacheable, attributes(cache))]
pub fn derive_cacheable(input: TokenStream) -> TokenStream {
    cacheable_derive::expand(input)
}
