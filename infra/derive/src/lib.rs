#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the workspace crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! automata-derive = { workspace = true }
//! ```
//!
//! Examples below are `ignore`d because they need the consuming crates in scope.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Defines a domain error enum wired into the workspace error conventions.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<ErrorName>Ext` trait adding `.context(...)` to `Result<T, ErrorName>` and to
///   `Result<T, SourceError>` for every variant wrapping a source.
/// * `From<SourceError>` for variants with a `source` field (or a `#[source]`/`#[from]` field).
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A module-local `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants use named fields. A variant wrapping a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use automata_derive::automata_error;
/// use std::borrow::Cow;
///
/// #[automata_error]
/// pub enum SettingsError {
///     #[error("Settings source error{}: {source}", format_context(.context))]
///     Source {
///         #[source]
///         source: config::ConfigError,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn automata_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Marks a struct as a discoverable service and fixes its registry name.
///
/// `#[service("health")]` registers the type under `"health"`; a bare `#[service]`
/// falls back to the snake_case struct name.
///
/// # Example
///
/// ```rust,ignore
/// #[automata_derive::service("health")]
/// pub struct HealthService {
///     state: ServiceState,
/// }
///
/// assert_eq!(<HealthService as ServiceMarker>::SERVICE_NAME, "health");
/// ```
#[proc_macro_attribute]
pub fn service(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::service::expand(args.into(), input).into()
}
