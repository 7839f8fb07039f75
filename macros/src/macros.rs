//! Procedural macros for siox.
//!
//! - `#[derive(Schema)]`: Implements `siox::Schema` for a struct with named fields.
//!   The generated impl lists the serialized field names in declaration order and
//!   maps each Rust field name to its serialized (aliased) name, honouring serde's
//!   `rename`, `rename_all` and `skip` attributes. An explicit display name is given
//!   with `#[schema(name = "...")]`; without it the type's own name is used.
//!
//! Usage:
//! ```rust,ignore
//! use serde::{Deserialize, Serialize};
//! use siox::Schema;
//!
//! #[derive(Serialize, Deserialize, schemars::JsonSchema, Schema)]
//! #[schema(name = "chat.Message")]
//! #[serde(rename_all = "camelCase")]
//! struct Message {
//!     room_id: u32,
//!     text: String,
//! }
//! ```
use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Token, parse_macro_input};

#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_schema(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand_schema(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let display_name = schema_name(&input.attrs)?;
    let rename_all = serde_container_rename_all(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "Schema can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Schema can only be derived for structs with named fields",
            ));
        }
    };

    let mut pairs = Vec::new();
    for field in fields {
        let field_attrs = serde_field_attrs(&field.attrs)?;
        if field_attrs.skip {
            continue;
        }
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = unraw(&field_ident.to_string());
        let serialized = match field_attrs.rename {
            Some(rename) => rename,
            None => match &rename_all {
                Some(rule) => apply_rename_rule(rule, &field_name),
                None => field_name.clone(),
            },
        };
        pairs.push((field_name, serialized));
    }

    let serialized = pairs.iter().map(|(_, s)| s);
    let alias_pairs = pairs.iter().map(|(f, s)| quote! { (#f, #s) });

    // Without an explicit name the trait's default (the type name) applies
    let name_impl = match display_name {
        Some(name) => quote! {
            fn name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#name)
            }
        },
        None => quote! {},
    };

    Ok(quote! {
        impl #impl_generics ::siox::Schema for #ident #ty_generics #where_clause {
            #name_impl

            fn fields() -> &'static [&'static str] {
                &[#(#serialized),*]
            }

            fn aliases() -> &'static [(&'static str, &'static str)] {
                &[#(#alias_pairs),*]
            }
        }
    })
}

fn schema_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("schema")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported schema attribute, expected `name`"))
            }
        })?;
    }
    Ok(name)
}

fn serde_container_rename_all(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut rule = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    rule = Some(value.value());
                } else {
                    // rename_all(serialize = "...", deserialize = "...")
                    meta.parse_nested_meta(|inner| {
                        let value: LitStr = inner.value()?.parse()?;
                        if inner.path.is_ident("serialize") {
                            rule = Some(value.value());
                        }
                        Ok(())
                    })?;
                }
                return Ok(());
            }
            skip_meta_value(&meta)
        })?;
    }
    Ok(rule)
}

#[derive(Default)]
struct SerdeFieldAttrs {
    rename: Option<String>,
    skip: bool,
}

fn serde_field_attrs(attrs: &[Attribute]) -> syn::Result<SerdeFieldAttrs> {
    let mut out = SerdeFieldAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    out.rename = Some(value.value());
                } else {
                    meta.parse_nested_meta(|inner| {
                        let value: LitStr = inner.value()?.parse()?;
                        if inner.path.is_ident("serialize") {
                            out.rename = Some(value.value());
                        }
                        Ok(())
                    })?;
                }
                return Ok(());
            }
            if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                out.skip = true;
                return Ok(());
            }
            skip_meta_value(&meta)
        })?;
    }
    Ok(out)
}

/// Consumes the value of a serde attribute we don't care about
/// (`default = "..."`, `with = "..."`, `bound(...)`, bare flags).
fn skip_meta_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: proc_macro2::TokenStream = content.parse()?;
    }
    Ok(())
}

fn unraw(name: &str) -> String {
    name.strip_prefix("r#").unwrap_or(name).to_string()
}

/// Applies serde's `rename_all` rule to a snake_case field name.
fn apply_rename_rule(rule: &str, field: &str) -> String {
    let words: Vec<&str> = field.split('_').filter(|w| !w.is_empty()).collect();
    match rule {
        "lowercase" => field.to_lowercase(),
        "UPPERCASE" => field.to_uppercase(),
        "PascalCase" => words.iter().map(|w| capitalize(w)).collect(),
        "camelCase" => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_string() } else { capitalize(w) })
            .collect(),
        "SCREAMING_SNAKE_CASE" => field.to_uppercase(),
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.to_uppercase().replace('_', "-"),
        _ => field.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
