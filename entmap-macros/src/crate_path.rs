//! Crate path resolution for generated code.
//!
//! Detects whether the user depends on `entmap` (facade) or the individual
//! crates, and returns the appropriate path prefix for generated code. Inside
//! the facade itself `::entmap` resolves through `extern crate self as entmap`.

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

fn found_path(found: FoundCrate, itself: TokenStream, suffix: Option<&str>) -> TokenStream {
    match found {
        FoundCrate::Itself => itself,
        FoundCrate::Name(name) => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            match suffix {
                Some(suffix) => {
                    let suffix = syn::Ident::new(suffix, proc_macro2::Span::call_site());
                    quote!(::#ident::#suffix)
                }
                None => quote!(::#ident),
            }
        }
    }
}

/// Returns the token stream for accessing `entmap_data` types.
///
/// If the user depends on `entmap`, returns `::entmap`.
/// Otherwise returns `::entmap_data`.
pub fn entmap_data_path() -> TokenStream {
    if let Ok(found) = crate_name("entmap") {
        found_path(found, quote!(::entmap), None)
    } else if let Ok(found) = crate_name("entmap-data") {
        found_path(found, quote!(crate), None)
    } else {
        // Fallback - assume entmap_data is available (for error messages)
        quote!(::entmap_data)
    }
}

/// Returns the token stream for accessing `entmap_cache` types.
///
/// If the user depends on `entmap`, returns `::entmap::entmap_cache`.
/// Otherwise returns `::entmap_cache`.
pub fn entmap_cache_path() -> TokenStream {
    if let Ok(found) = crate_name("entmap") {
        found_path(found, quote!(::entmap::entmap_cache), Some("entmap_cache"))
    } else if let Ok(found) = crate_name("entmap-cache") {
        found_path(found, quote!(crate), None)
    } else {
        quote!(::entmap_cache)
    }
}
