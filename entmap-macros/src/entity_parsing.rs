/// Parsed representation of a `#[derive(Entity)]` struct.
pub struct EntityStructDef {
    pub name: syn::Ident,
    pub generics: syn::Generics,
    pub table: String,
    pub hooks: bool,
    pub columns: Vec<ColumnField>,
}

/// One struct field and its `#[column(...)]` flags.
pub struct ColumnField {
    pub field: syn::Ident,
    pub db_field: String,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub refuse_update: bool,
    pub returning_insert: bool,
    pub returning_update: bool,
    pub returning: bool,
    pub ignored: bool,
}

impl ColumnField {
    fn new(field: syn::Ident) -> Self {
        let db_field = field.to_string().trim_start_matches("r#").to_string();
        Self {
            field,
            db_field,
            primary_key: false,
            auto_increment: false,
            refuse_update: false,
            returning_insert: false,
            returning_update: false,
            returning: false,
            ignored: false,
        }
    }
}

fn parse_entity_attr(
    attrs: &[syn::Attribute],
    table: &mut Option<String>,
    hooks: &mut bool,
) -> syn::Result<()> {
    for attr in attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                *table = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("hooks") {
                *hooks = true;
                Ok(())
            } else {
                Err(meta.error(
                    "unknown attribute in #[entity(...)]: expected `table` or `hooks`",
                ))
            }
        })?;
    }
    Ok(())
}

fn parse_column_attr(attr: &syn::Attribute, col: &mut ColumnField) -> syn::Result<()> {
    // Bare `#[column]` keeps the defaults.
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(());
    }
    attr.parse_nested_meta(|meta| {
        let flag = meta
            .path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default();
        match flag.as_str() {
            "name" => {
                let lit: syn::LitStr = meta.value()?.parse()?;
                col.db_field = lit.value();
            }
            "primary_key" => col.primary_key = true,
            "auto_increment" => col.auto_increment = true,
            "refuse_update" => col.refuse_update = true,
            "returning_insert" => col.returning_insert = true,
            "returning_update" => col.returning_update = true,
            "returning" => col.returning = true,
            "ignore" | "deprecated" => col.ignored = true,
            _ => {
                return Err(meta.error(
                    "unknown attribute in #[column(...)]: expected one of `name`, \
                     `primary_key`, `auto_increment`, `refuse_update`, `returning_insert`, \
                     `returning_update`, `returning`, `ignore`, `deprecated`",
                ))
            }
        }
        Ok(())
    })
}

pub fn parse(input: syn::DeriveInput) -> syn::Result<EntityStructDef> {
    let name = input.ident;

    let mut table = None;
    let mut hooks = false;
    parse_entity_attr(&input.attrs, &mut table, &mut hooks)?;

    let table = table.ok_or_else(|| {
        syn::Error::new(
            name.span(),
            "#[entity(table = \"...\")] is required\n\
             example: #[entity(table = \"users\")]",
        )
    })?;

    let fields = match input.data {
        syn::Data::Struct(data) => match data.fields {
            syn::Fields::Named(named) => named.named,
            _ => {
                return Err(syn::Error::new(
                    name.span(),
                    "#[derive(Entity)] requires named fields: each field maps to a column",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                name.span(),
                "#[derive(Entity)] only works on structs, not enums or unions",
            ))
        }
    };

    let mut columns = Vec::new();
    for field in fields {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(name.span(), "expected named field"))?;
        let attrs: Vec<&syn::Attribute> = field
            .attrs
            .iter()
            .filter(|a| a.path().is_ident("column"))
            .collect();
        // Untagged fields are not persisted.
        if attrs.is_empty() {
            continue;
        }
        let mut col = ColumnField::new(ident);
        for attr in attrs {
            parse_column_attr(attr, &mut col)?;
        }
        columns.push(col);
    }

    Ok(EntityStructDef {
        name,
        generics: input.generics,
        table,
        hooks,
        columns,
    })
}
