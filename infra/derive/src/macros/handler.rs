use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Error, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Role {
    Getter,
    Setter,
}

impl Role {
    const fn marker(self) -> &'static str {
        match self {
            Self::Getter => "getter",
            Self::Setter => "setter",
        }
    }
}

struct BoundMethod {
    role: Role,
    id: LitStr,
    method: Ident,
    is_async: bool,
}

/// Expands `#[settings_handler]` on an inherent impl block.
#[must_use]
pub fn expand_settings_handler(args: TokenStream, mut input: ItemImpl) -> TokenStream {
    if !args.is_empty() {
        return Error::new_spanned(args, "#[settings_handler] does not take arguments")
            .to_compile_error();
    }
    if let Some((_, path, _)) = &input.trait_ {
        return Error::new_spanned(path, "#[settings_handler] must be placed on an inherent impl")
            .to_compile_error();
    }
    if !input.generics.params.is_empty() {
        return Error::new_spanned(
            &input.generics,
            "#[settings_handler] cannot bind generic handlers; the binding table is built once per type",
        )
        .to_compile_error();
    }

    let bound = match collect_bindings(&mut input) {
        Ok(bound) => bound,
        Err(err) => return err.to_compile_error(),
    };
    if let Err(err) = validate_bindings(&bound) {
        return err.to_compile_error();
    }

    let self_ty = &input.self_ty;
    let handler_name = LitStr::new(&type_label(self_ty), Span::call_site());
    let calls = bound.iter().map(|b| binding_call(self_ty, b));

    quote! {
        #input

        #[automatically_derived]
        impl ::knob_core::fixed::FixedHandler for #self_ty {
            fn bindings() -> &'static ::knob_core::fixed::Bindings<Self> {
                static BINDINGS: ::std::sync::LazyLock<::knob_core::fixed::Bindings<#self_ty>> =
                    ::std::sync::LazyLock::new(|| {
                        ::knob_core::fixed::Bindings::<#self_ty>::builder(#handler_name)
                            #(#calls)*
                            .build()
                    });
                &BINDINGS
            }
        }
    }
}

fn collect_bindings(input: &mut ItemImpl) -> Result<Vec<BoundMethod>, Error> {
    let mut bound = Vec::new();
    let mut errors: Option<Error> = None;

    for item in &mut input.items {
        let ImplItem::Fn(method) = item else { continue };

        let mut markers = Vec::new();
        method.attrs.retain(|attr| {
            let role = if attr.path().is_ident(Role::Getter.marker()) {
                Role::Getter
            } else if attr.path().is_ident(Role::Setter.marker()) {
                Role::Setter
            } else {
                return true;
            };
            markers.push((role, attr.clone()));
            false
        });

        for (role, attr) in markers {
            let parsed = attr
                .parse_args::<LitStr>()
                .and_then(|id| check_receiver(method, role).map(|()| id));
            match parsed {
                Ok(id) => bound.push(BoundMethod {
                    role,
                    id,
                    method: method.sig.ident.clone(),
                    is_async: method.sig.asyncness.is_some(),
                }),
                Err(err) => push_error(&mut errors, err),
            }
        }
    }

    errors.map_or(Ok(bound), Err)
}

fn check_receiver(method: &ImplItemFn, role: Role) -> Result<(), Error> {
    let receiver = method.sig.receiver().ok_or_else(|| {
        Error::new_spanned(&method.sig, format!("#[{}] methods must take `&self`", role.marker()))
    })?;
    if receiver.reference.is_none() || receiver.mutability.is_some() {
        return Err(Error::new_spanned(
            receiver,
            format!("#[{}] methods must take `&self`", role.marker()),
        ));
    }

    let expected = match role {
        Role::Getter => 1,
        Role::Setter => 2,
    };
    let typed = method.sig.inputs.iter().filter(|arg| matches!(arg, FnArg::Typed(_))).count();
    if typed != expected {
        let shape = match role {
            Role::Getter => "(&self, &Setting)",
            Role::Setter => "(&self, &Setting, Option<Value>)",
        };
        return Err(Error::new_spanned(
            &method.sig.inputs,
            format!("#[{}] methods must have the shape {shape}", role.marker()),
        ));
    }
    Ok(())
}

fn validate_bindings(bound: &[BoundMethod]) -> Result<(), Error> {
    let mut seen = FxHashSet::default();
    let mut errors: Option<Error> = None;

    for b in bound {
        if !seen.insert((b.role, b.id.value())) {
            push_error(
                &mut errors,
                Error::new_spanned(
                    &b.id,
                    format!("setting `{}` already has a {}", b.id.value(), b.role.marker()),
                ),
            );
        }
    }

    for b in bound.iter().filter(|b| b.role == Role::Setter) {
        if !seen.contains(&(Role::Getter, b.id.value())) {
            push_error(
                &mut errors,
                Error::new_spanned(
                    &b.id,
                    format!("setting `{}` has a setter but no getter", b.id.value()),
                ),
            );
        }
    }

    errors.map_or(Ok(()), Err)
}

fn binding_call(self_ty: &Type, b: &BoundMethod) -> TokenStream {
    let id = &b.id;
    let method = &b.method;

    match b.role {
        Role::Getter => {
            let call = if b.is_async {
                quote! { ::std::boxed::Box::pin(handler.#method(setting)) }
            } else {
                quote! { ::std::boxed::Box::pin(::std::future::ready(handler.#method(setting))) }
            };
            quote! {
                .getter(#id, {
                    fn bound<'a>(
                        handler: &'a #self_ty,
                        setting: &'a ::knob_core::Setting,
                    ) -> ::knob_core::fixed::BindingFuture<'a, ::std::option::Option<::knob_core::Value>> {
                        #call
                    }
                    bound
                })
            }
        },
        Role::Setter => {
            let call = if b.is_async {
                quote! { ::std::boxed::Box::pin(handler.#method(setting, value)) }
            } else {
                quote! { ::std::boxed::Box::pin(::std::future::ready(handler.#method(setting, value))) }
            };
            quote! {
                .setter(#id, {
                    fn bound<'a>(
                        handler: &'a #self_ty,
                        setting: &'a ::knob_core::Setting,
                        value: ::std::option::Option<::knob_core::Value>,
                    ) -> ::knob_core::fixed::BindingFuture<'a, ()> {
                        #call
                    }
                    bound
                })
            }
        },
    }
}

fn type_label(ty: &Type) -> String {
    if let Type::Path(path) = ty
        && let Some(segment) = path.path.segments.last()
    {
        return segment.ident.to_string();
    }
    quote!(#ty).to_string()
}

fn push_error(errors: &mut Option<Error>, err: Error) {
    match errors {
        Some(existing) => existing.combine(err),
        None => *errors = Some(err),
    }
}
