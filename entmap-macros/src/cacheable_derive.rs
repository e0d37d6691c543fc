use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::crate_path::entmap_cache_path;

pub fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate(&input) {
        Ok(output) => output.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct CacheAttr {
    key: Option<syn::LitStr>,
    expiration_secs: Option<u64>,
    codec: Option<syn::LitStr>,
}

fn parse_cache_attr(input: &DeriveInput) -> syn::Result<CacheAttr> {
    let mut parsed = CacheAttr::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("cache")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                parsed.key = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("expiration_secs") {
                let lit: syn::LitInt = meta.value()?.parse()?;
                parsed.expiration_secs = Some(lit.base10_parse()?);
                Ok(())
            } else if meta.path.is_ident("codec") {
                parsed.codec = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error(
                    "unknown attribute in #[cache(...)]: expected `key`, `expiration_secs` or `codec`",
                ))
            }
        })?;
    }
    Ok(parsed)
}

/// Names referenced as `{name}` in a key template, in order, without duplicates.
fn template_fields(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
            }
            '{' => {
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                let name = name.split(':').next().unwrap_or_default().trim().to_string();
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
            _ => {}
        }
    }
    names
}

fn generate(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let krate = entmap_cache_path();
    let attr = parse_cache_attr(input)?;

    let key = attr.key.ok_or_else(|| {
        syn::Error::new_spanned(
            name,
            "#[derive(Cacheable)] requires #[cache(key = \"...\")]\n\
             \n  example:\n  #[derive(Cacheable)]\n  #[cache(key = \"user:{id}\")]\n  pub struct User { ... }",
        )
    })?;

    let field_names: Vec<syn::Ident> = template_fields(&key.value())
        .iter()
        .map(|n| syn::parse_str::<syn::Ident>(n))
        .collect::<syn::Result<_>>()
        .map_err(|_| syn::Error::new_spanned(&key, "key placeholders must name struct fields"))?;

    let mut option = quote! {
        #krate::CacheOption::new(::std::format!(#key, #( #field_names = self.#field_names ),*))
    };
    if let Some(secs) = attr.expiration_secs {
        option = quote!(#option.expiration(::std::time::Duration::from_secs(#secs)));
    }
    if let Some(codec) = attr.codec {
        let codec_ty = match codec.value().to_ascii_lowercase().as_str() {
            "json" => quote!(#krate::JsonCodec),
            "msgpack" | "messagepack" => quote!(#krate::MessagePackCodec),
            _ => {
                return Err(syn::Error::new_spanned(
                    codec,
                    "unknown codec: expected \"json\" or \"msgpack\"",
                ))
            }
        };
        option = quote!(#option.codec(#codec_ty));
    }

    Ok(quote! {
        impl #impl_generics #krate::Cacheable for #name #ty_generics #where_clause {
            fn cache_option(&self) -> #krate::CacheOption<Self> {
                #option
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_fields() {
        assert_eq!(template_fields("user:{id}"), ["id"]);
        assert_eq!(template_fields("{tenant}:{id}:{id}"), ["tenant", "id"]);
        assert_eq!(template_fields("{{literal}}:{id:>4}"), ["id"]);
        assert!(template_fields("static").is_empty());
    }
}
