//! Derive macros for scope-injector
//!
//! `#[derive(Inject)]` generates `from_scope()` and `from_global()`
//! constructors that fill a struct's fields from a `Scope`, the same way a
//! wrapped class resolves its attributes.
//!
//! ```rust,ignore
//! use scope_injector::{Inject, Scope};
//! use std::sync::Arc;
//!
//! struct Database { url: String }
//! struct Logger;
//!
//! #[derive(Inject)]
//! struct UserService {
//!     // looked up under "database"
//!     #[inject]
//!     database: Arc<Database>,
//!     // looked up under "primary_cache"
//!     #[inject(key = "primary_cache")]
//!     cache: Arc<String>,
//!     // None when unbound
//!     #[inject(optional)]
//!     logger: Option<Arc<Logger>>,
//!     // Default::default()
//!     request_count: u64,
//! }
//!
//! let scope = Scope::local("users").unwrap();
//! scope.set("database", Database { url: "postgres://localhost".into() });
//! scope.set("primary_cache", String::from("redis"));
//!
//! let service = UserService::from_scope(&scope).unwrap();
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Type, parse_macro_input};

/// Derive `from_scope()` / `from_global()` constructors.
///
/// # Attributes
///
/// - `#[inject]` - resolve the field under its own name. Type must be `Arc<T>`.
/// - `#[inject(key = "name")]` - resolve under `name` instead.
/// - `#[inject(optional)]` - `None` when unbound. Type must be `Option<Arc<T>>`.
///
/// Fields without `#[inject]` use `Default::default()`.
///
/// Unbound required fields are reported together in one
/// `DiError::MissingDependency` naming the struct and the fields.
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_inject(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_inject(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Inject can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Inject can only be derived for structs",
            ));
        }
    };

    let mut lookups = Vec::new();
    let mut required_vars = Vec::new();
    let mut field_inits = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let field_label = field_name.to_string();
        let var = format_ident!("__inject_{}", field_name);

        match parse_inject_attr(&field.attrs)? {
            Some(attr) if attr.optional => {
                let inner = extract_option_arc_inner_type(field_type).ok_or_else(|| {
                    syn::Error::new_spanned(
                        field_type,
                        "Fields marked with #[inject(optional)] must have type Option<Arc<T>>",
                    )
                })?;
                let key = attr.key.unwrap_or_else(|| field_label.clone());

                lookups.push(quote! {
                    let #var = scope.lookup::<#inner>(#key)?;
                });
                field_inits.push(quote! { #field_name: #var });
            }
            Some(attr) => {
                let inner = extract_arc_inner_type(field_type).ok_or_else(|| {
                    syn::Error::new_spanned(
                        field_type,
                        "Fields marked with #[inject] must have type Arc<T>",
                    )
                })?;
                let key = attr.key.unwrap_or_else(|| field_label.clone());

                lookups.push(quote! {
                    let #var = scope.lookup::<#inner>(#key)?;
                    if #var.is_none() {
                        __missing.push(::std::string::String::from(#field_label));
                    }
                });
                required_vars.push(var.clone());
                field_inits.push(quote! { #field_name: #var });
            }
            None => {
                field_inits.push(quote! {
                    #field_name: ::std::default::Default::default()
                });
            }
        }
    }

    let struct_label = name.to_string();
    let unpack = if required_vars.is_empty() {
        quote! {}
    } else {
        quote! {
            let (#(::std::option::Option::Some(#required_vars),)*) = (#(#required_vars,)*) else {
                return ::std::result::Result::Err(
                    ::scope_injector::DiError::missing(#struct_label, __missing),
                );
            };
        }
    };

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Build an instance, resolving every `#[inject]` field from `scope`.
            #[allow(unused_mut)]
            pub fn from_scope(
                scope: &::scope_injector::Scope,
            ) -> ::scope_injector::Result<Self> {
                let mut __missing: ::std::vec::Vec<::std::string::String> = ::std::vec::Vec::new();
                #(#lookups)*
                #unpack
                ::std::result::Result::Ok(Self {
                    #(#field_inits),*
                })
            }

            /// Build an instance from the global scope.
            pub fn from_global() -> ::scope_injector::Result<Self> {
                Self::from_scope(::scope_injector::Scope::global())
            }
        }
    })
}

#[derive(Default)]
struct InjectAttr {
    key: Option<String>,
    optional: bool,
}

/// Parse `#[inject]`, `#[inject(optional)]`, `#[inject(key = "...")]`
fn parse_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<InjectAttr>> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("inject")) else {
        return Ok(None);
    };

    let mut parsed = InjectAttr::default();
    if attr.meta.require_path_only().is_ok() {
        return Ok(Some(parsed));
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("optional") {
            parsed.optional = true;
            Ok(())
        } else if meta.path.is_ident("key") {
            let key: LitStr = meta.value()?.parse()?;
            if key.value().is_empty() {
                return Err(syn::Error::new_spanned(key, "inject key must not be empty"));
            }
            parsed.key = Some(key.value());
            Ok(())
        } else {
            Err(meta.error("expected `optional` or `key = \"...\"`"))
        }
    })?;

    Ok(Some(parsed))
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    generic_argument(ty, "Arc")
}

/// Extract T from Option<Arc<T>>
fn extract_option_arc_inner_type(ty: &Type) -> Option<&Type> {
    generic_argument(ty, "Option").and_then(extract_arc_inner_type)
}

fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
