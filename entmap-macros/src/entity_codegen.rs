use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::crate_path::entmap_data_path;
use crate::entity_parsing::{self, ColumnField, EntityStructDef};

pub fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match entity_parsing::parse(input) {
        Ok(def) => generate(&def).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn column_builder(krate: &TokenStream2, col: &ColumnField) -> TokenStream2 {
    let db_field = &col.db_field;
    let mut expr = quote!(#krate::Column::new(#db_field));
    let flags = [
        (col.primary_key, quote!(primary_key)),
        (col.auto_increment, quote!(auto_increment)),
        (col.refuse_update, quote!(refuse_update)),
        (col.returning_insert, quote!(returning_insert)),
        (col.returning_update, quote!(returning_update)),
        (col.returning, quote!(returning)),
        (col.ignored, quote!(ignored)),
    ];
    for (set, method) in flags {
        if set {
            expr = quote!(#expr.#method());
        }
    }
    expr
}

fn generate(def: &EntityStructDef) -> TokenStream2 {
    let krate = entmap_data_path();
    let name = &def.name;
    let table = &def.table;
    let (impl_generics, ty_generics, where_clause) = def.generics.split_for_impl();

    let schema_columns = def.columns.iter().map(|c| column_builder(&krate, c));

    let mapped: Vec<&ColumnField> = def.columns.iter().filter(|c| !c.ignored).collect();
    let db_fields: Vec<&String> = mapped.iter().map(|c| &c.db_field).collect();
    let fields: Vec<&syn::Ident> = mapped.iter().map(|c| &c.field).collect();

    let events = if def.hooks {
        quote!()
    } else {
        quote! {
            impl #impl_generics #krate::EntityEvents for #name #ty_generics #where_clause {}
        }
    };

    quote! {
        impl #impl_generics #krate::Entity for #name #ty_generics #where_clause {
            fn table_name() -> &'static str {
                #table
            }

            fn schema() -> #krate::Schema {
                #krate::Schema::new()
                    #( .column(#schema_columns) )*
            }

            fn value_of(&self, column: &str) -> ::core::option::Option<#krate::Value> {
                match column {
                    #( #db_fields => ::core::option::Option::Some(
                        #krate::ToValue::to_value(&self.#fields)
                    ), )*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_value(
                &mut self,
                column: &str,
                value: #krate::Value,
            ) -> ::core::result::Result<(), #krate::ValueError> {
                match column {
                    #( #db_fields => {
                        self.#fields = #krate::FromValue::from_value(value)?;
                    } )*
                    other => {
                        return ::core::result::Result::Err(
                            #krate::ValueError::UnknownColumn(other.to_string())
                        )
                    }
                }
                ::core::result::Result::Ok(())
            }
        }

        #events
    }
}
