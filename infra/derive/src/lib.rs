#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the settings engine.
//! The crate removes the boilerplate around two recurring patterns:
//! fixed settings handlers (per-setting getter/setter tables) and domain error enums.
//!
//! ## Usage
//! Consumers normally reach the macros through `knob-core`, which re-exports
//! [`macro@settings_handler`]. Generated code refers to `::knob_core` by absolute path,
//! so the macro can only be used from crates that depend on `knob-core`.
//!
//! See each macro’s docstring for examples; they are `ignore`d to avoid compiling in this crate.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl, parse_macro_input};

/// Attribute macro that turns an inherent `impl` block into a fixed settings handler.
///
/// Methods marked with `#[getter("id")]` or `#[setter("id")]` are collected into a
/// binding table that is built once per handler type and looked up by setting id at
/// dispatch time. The markers are stripped from the emitted impl block.
///
/// # Method shapes
///
/// * Getter: `fn(&self, &Setting) -> Result<Option<Value>, SettingsError>`
/// * Setter: `fn(&self, &Setting, Option<Value>) -> Result<(), SettingsError>`
///
/// Both may be `async`. Synchronous methods are wrapped in a ready future.
///
/// # Generated Items
///
/// * `impl ::knob_core::fixed::FixedHandler for Type`, whose `bindings()` returns a
///   process-wide `LazyLock` table.
///
/// # Errors
///
/// Emits a compile-time error if the impl block is generic, is a trait impl, binds the
/// same setting id twice for the same role, or declares a setter without a getter.
///
/// # Example
///
/// ```rust,ignore
/// use knob_core::prelude::*;
///
/// #[derive(Debug)]
/// struct Clock;
///
/// #[knob_core::settings_handler]
/// impl Clock {
///     #[getter("hour")]
///     fn hour(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
///         Ok(Some(Value::from(12)))
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn settings_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    macros::handler::expand_settings_handler(args.into(), input).into()
}

/// Attribute macro for domain error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to `Result<T, Error>` and to `Result<T, Source>` for every wrapped source type.
/// * **Conversions**: Implements `From<Source>` for variants with a `source` field.
/// * **Formatting helper**: Emits a private `format_context` function for `#[error(...)]`
///   strings.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. `context` fields must be `Option<Cow<'static, str>>`.
/// 3. Variants with a `source` field must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[knob_derive::knob_error]
/// pub enum StoreError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Missing entry{}: {message}", format_context(.context))]
///     Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn knob_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}
