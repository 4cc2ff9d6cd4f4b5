//! Code generation for `#[derive(Populate)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error as SynError, Fields, Result as SynResult};

use crate::parse::{FieldAttr, Mode};

/// Generates `impl ::confkit::Populate` for a struct with named fields.
pub fn expand(input: &DeriveInput) -> SynResult<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(SynError::new_spanned(
            name,
            "Populate can only be derived for structs",
        ));
    };

    let Fields::Named(fields) = &data.fields else {
        return Err(SynError::new_spanned(
            name,
            "Populate requires a struct with named fields",
        ));
    };

    let mut steps = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let attr = FieldAttr::parse(field)?;
        let ident = &field.ident;
        let key = &attr.key;

        let step = match attr.mode {
            Mode::Leaf => quote! { from.field(#key, &mut self.#ident)?; },
            Mode::Nested => quote! { from.nested(#key, &mut self.#ident)?; },
            Mode::Skip => continue,
        };
        steps.push(step);
    }

    Ok(quote! {
        impl #impl_generics ::confkit::Populate for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn populate(
                &mut self,
                from: &mut ::confkit::Populator<'_>,
            ) -> ::confkit::Result<()> {
                #(#steps)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_expands_leaf_nested_and_skip() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                name: String,
                #[populate(key = "pool_size")]
                pool: u32,
                #[populate(nested)]
                database: Database,
                #[populate(skip)]
                cache: Vec<u8>,
            }
        };

        let output = expand(&input).unwrap().to_string();
        assert!(output.contains("\"name\""));
        assert!(output.contains("\"pool_size\""));
        assert!(!output.contains("\"pool\""));
        assert!(output.contains("nested"));
        assert!(!output.contains("cache"));
    }

    #[test]
    fn test_rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum Mode { A, B }
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Pair(u8, u8);
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn test_rejects_unknown_option() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[populate(rename = "x")]
                name: String,
            }
        };
        let err = expand(&input).unwrap_err();
        assert!(err.to_string().contains("Unknown option"));
    }

    #[test]
    fn test_rejects_nested_skip() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[populate(nested, skip)]
                inner: Inner,
            }
        };
        assert!(expand(&input).is_err());
    }
}
