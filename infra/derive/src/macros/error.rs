use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, GenericArgument, Ident, PathArguments, Type};

struct VariantInfo<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfg: Vec<&'a Attribute>,
}

/// Expands `#[knob_error]` on an enum.
#[must_use]
pub fn expand_error(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let ext = format_ident!("{}Ext", name);

    let Data::Enum(data) = &input.data else {
        return Error::new_spanned(name, "knob_error can only be applied to enums").to_compile_error();
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        match inspect_variant(variant) {
            Ok(info) => variants.push(info),
            Err(err) => return err.to_compile_error(),
        }
    }

    let derives = missing_derives(&input.attrs);
    let context_arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = v.ident;
        let cfg = &v.cfg;
        quote! { #(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });
    let source_impls = variants.iter().filter_map(|v| source_impl(name, &ext, v));

    quote! {
        #derives
        #input

        pub trait #ext<T> {
            /// Attaches a human-readable context to the error branch.
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    #[allow(unreachable_patterns)]
                    match &mut err {
                        #(#context_arms)*
                        _ => {},
                    }
                    err
                })
            }
        }

        #(#source_impls)*

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            match context {
                Some(c) => std::borrow::Cow::Owned(format!(" ({c})")),
                None => std::borrow::Cow::Borrowed(""),
            }
        }
    }
}

fn inspect_variant(variant: &syn::Variant) -> Result<VariantInfo<'_>, Error> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(Error::new_spanned(
            variant,
            "knob_error variants must use named fields (`message`/`source` plus `context`)",
        ));
    };

    let mut has_context = false;
    let mut source = None;
    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        if ident == "context" {
            if !is_context_type(&field.ty) {
                return Err(Error::new_spanned(
                    &field.ty,
                    "context field must be Option<Cow<'static, str>>",
                ));
            }
            has_context = true;
        } else if ident == "source" || marked_source(field) {
            source = Some((ident, &field.ty));
        }
    }

    if source.is_some() && !has_context {
        return Err(Error::new_spanned(
            &variant.ident,
            "knob_error variants with a source also need `context: Option<Cow<'static, str>>`",
        ));
    }

    Ok(VariantInfo {
        ident: &variant.ident,
        source,
        has_context,
        cfg: variant.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).collect(),
    })
}

fn source_impl(name: &Ident, ext: &Ident, v: &VariantInfo<'_>) -> Option<TokenStream> {
    let (field, ty) = v.source?;
    let ident = v.ident;
    let cfg = &v.cfg;

    Some(quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self { Self::#ident { #field, context: None } }
        }

        #(#cfg)*
        #[automatically_derived]
        impl<T> #ext<T> for std::result::Result<T, #ty> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn missing_derives(attrs: &[Attribute]) -> TokenStream {
    let mut present = FxHashSet::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                present.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !present.contains("Error") {
        derives.push(quote! { ::thiserror::Error });
    }
    if derives.is_empty() { quote! {} } else { quote! { #[derive(#(#derives),*)] } }
}

fn marked_source(field: &Field) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident("source") || attr.path().is_ident("from"))
}

/// Matches `Option<Cow<'static, str>>` by the last path segments.
fn is_context_type(ty: &Type) -> bool {
    let Some(option) = single_generic(ty, "Option") else {
        return false;
    };
    let Type::Path(cow) = option else {
        return false;
    };
    let Some(segment) = cow.path.segments.last() else {
        return false;
    };
    if segment.ident != "Cow" {
        return false;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    let mut args = args.args.iter();
    let lifetime_ok =
        matches!(args.next(), Some(GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let str_ok = matches!(
        args.next(),
        Some(GenericArgument::Type(Type::Path(p)))
            if p.path.segments.last().is_some_and(|s| s.ident == "str")
    );
    lifetime_ok && str_ok
}

fn single_generic<'a>(ty: &'a Type, outer: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != outer {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else { return None };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
