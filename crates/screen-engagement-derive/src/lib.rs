//! Derive macro for tracked list elements
//!
//! This crate provides `#[derive(Tracked)]`, which implements
//! `screen_engagement::Tracked` from the fields of a struct.
//!
//! # Usage
//!
//! ```ignore
//! use screen_engagement::Tracked;
//!
//! #[derive(Tracked)]
//! #[tracked(id_field = "index", id_prefix = "product_", description_field = "name")]
//! pub struct Product {
//!     index: usize,
//!     name: String,
//! }
//! ```
//!
//! This generates `tracking_id()` returning `"product_<index>"` and
//! `tracking_description()` returning the `name` field.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{spanned::Spanned, parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr};

/// Configuration parsed from the `#[tracked(...)]` attribute
struct TrackedConfig {
    id_field: Ident,
    id_prefix: Option<String>,
    description_field: Option<Ident>,
}

/// Implement `screen_engagement::Tracked` for a struct with named fields
///
/// # Attribute keys
///
/// - `id_field = "field"` (required) - field rendered with `Display` to form the identifier
/// - `id_prefix = "prefix_"` - prepended to the identifier
/// - `description_field = "field"` - field rendered with `Display` as the description;
///   an empty description when omitted
#[proc_macro_derive(Tracked, attributes(tracked))]
pub fn derive_tracked(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let config = match parse_tracked_config(&input) {
        Ok(config) => config,
        Err(e) => return e.to_compile_error().into(),
    };

    if let Err(e) = check_fields(&input, &config) {
        return e.to_compile_error().into();
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let tracking_id = tracking_id_body(&config);
    let tracking_description = tracking_description_body(&config);

    let expanded = quote! {
        impl #impl_generics ::screen_engagement::Tracked for #name #ty_generics #where_clause {
            fn tracking_id(&self) -> ::std::string::String {
                #tracking_id
            }

            fn tracking_description(&self) -> ::std::string::String {
                #tracking_description
            }
        }
    };

    expanded.into()
}

fn tracking_id_body(config: &TrackedConfig) -> TokenStream2 {
    let id_field = &config.id_field;
    match &config.id_prefix {
        Some(prefix) => quote! { ::std::format!("{}{}", #prefix, self.#id_field) },
        None => quote! { ::std::string::ToString::to_string(&self.#id_field) },
    }
}

fn tracking_description_body(config: &TrackedConfig) -> TokenStream2 {
    match &config.description_field {
        Some(field) => quote! { ::std::string::ToString::to_string(&self.#field) },
        None => quote! { ::std::string::String::new() },
    }
}

fn parse_tracked_config(input: &DeriveInput) -> Result<TrackedConfig, syn::Error> {
    let mut id_field = None;
    let mut id_prefix = None;
    let mut description_field = None;

    for attr in &input.attrs {
        if attr.path().is_ident("tracked") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id_field") {
                    let value: LitStr = meta.value()?.parse()?;
                    id_field = Some(field_ident(&value)?);
                    Ok(())
                } else if meta.path.is_ident("id_prefix") {
                    let value: LitStr = meta.value()?.parse()?;
                    id_prefix = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("description_field") {
                    let value: LitStr = meta.value()?.parse()?;
                    description_field = Some(field_ident(&value)?);
                    Ok(())
                } else {
                    Err(meta.error("unknown attribute"))
                }
            })?;
        }
    }

    let Some(id_field) = id_field else {
        return Err(syn::Error::new_spanned(
            input,
            "missing required attribute: #[tracked(id_field = \"...\")]",
        ));
    };

    Ok(TrackedConfig {
        id_field,
        id_prefix,
        description_field,
    })
}

fn field_ident(value: &LitStr) -> Result<Ident, syn::Error> {
    let mut ident = syn::parse_str::<Ident>(&value.value())
        .map_err(|_| syn::Error::new(value.span(), "expected a field name"))?;
    ident.set_span(value.span());
    Ok(ident)
}

/// Referenced fields must exist on a struct with named fields
fn check_fields(input: &DeriveInput, config: &TrackedConfig) -> Result<(), syn::Error> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(input.ident.span(), "Tracked can only be derived for structs"));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(data.fields.span(), "Tracked requires named fields"));
    };

    let referenced = std::iter::once(&config.id_field).chain(config.description_field.as_ref());
    for wanted in referenced {
        let found = fields.named.iter().any(|f| f.ident.as_ref() == Some(wanted));
        if !found {
            return Err(syn::Error::new(
                wanted.span(),
                format!("no field `{}` on `{}`", wanted, input.ident),
            ));
        }
    }
    Ok(())
}
