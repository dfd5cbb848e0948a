//! Procedural macros for interface-api
//!
//! Provides:
//! - `#[interface]` - Define an interface (generates the dispatch-table struct
//!   and the instance-header struct)
//! - `#[implement(Interface)]` - Bind a struct's methods into a dispatch table
//!   for that interface
//!
//! ## Naming convention
//!
//! Every generated symbol is derived from the interface, implementation, and
//! method names by a fixed, deterministic transform, so that descriptors,
//! method bodies, and bindings authored in separate modules line up without
//! any registration step:
//!
//! | Input | Generated symbol |
//! |-------|------------------|
//! | interface `Foo` | dispatch table type `FooVTable` |
//! | interface `Foo` | header field `header_foo` |
//! | interface `Foo` | accessor const `VTABLE_FOO` |
//! | (`Bar`, `Foo`, `baz`) | wrapper fn `__Bar__Foo__baz` |
//! | (`Bar`, `Foo`) | table static `__BAR_FOO_VTABLE` |
//!
//! A clash (two interfaces inducing the same symbol) surfaces as an ordinary
//! duplicate-definition error from rustc; the macros add no detection of
//! their own.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Attribute, Expr, FnArg, Ident, ImplItem, ItemImpl, ItemTrait, Pat, Token, TraitItem, Type,
    parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    spanned::Spanned,
};

/// Returns the path to the interface-api crate based on the `internal` flag.
///
/// When `internal` is true (used inside the interface-api crate itself), this
/// returns `crate::`. When false (external crates), `interface_api::`.
fn crate_path(internal: bool) -> TokenStream2 {
    if internal {
        quote! { crate }
    } else {
        quote! { interface_api }
    }
}

// =============================================================================
// Naming convention
// =============================================================================

/// Convert a camel-case interface name to snake case.
/// `Animal` -> `animal`, `MutexFactory` -> `mutex_factory`.
///
/// Must agree exactly with the `:snake` modifier of the `paste` crate, which
/// the declarative `define_class!` macro uses for the same derivation.
fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            // Underscore before an uppercase run boundary: previous char was
            // lowercase, or the next char is lowercase (handles "IOPort").
            if i > 0 {
                let prev_lower = chars[i - 1].is_lowercase();
                let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
                if prev_lower || next_lower {
                    result.push('_');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Dispatch-table type for an interface: `Animal` -> `AnimalVTable`.
fn vtable_type_name(interface: &Ident) -> Ident {
    format_ident!("{}VTable", interface)
}

/// Instance-header field inside a concrete object: `Animal` -> `header_animal`.
fn header_field_name(interface: &Ident) -> Ident {
    format_ident!("header_{}", snake_case(&interface.to_string()))
}

/// Wrapper fn bound into the table for (implementation, interface, method).
fn wrapper_fn_name(implementation: &Ident, interface: &Ident, method: &Ident) -> Ident {
    format_ident!("__{}__{}__{}", implementation, interface, method)
}

/// The one static dispatch table for an (implementation, interface) pair.
fn vtable_static_name(implementation: &Ident, interface: &Ident) -> Ident {
    format_ident!(
        "__{}_{}_VTABLE",
        snake_case(&implementation.to_string()).to_uppercase(),
        snake_case(&interface.to_string()).to_uppercase()
    )
}

/// Per-implementation accessor const: `Animal` -> `VTABLE_ANIMAL`.
fn vtable_const_name(interface: &Ident) -> Ident {
    format_ident!(
        "VTABLE_{}",
        snake_case(&interface.to_string()).to_uppercase()
    )
}

// =============================================================================
// Attribute arguments
// =============================================================================

/// One `name: Type = default` row from `properties(...)`.
struct PropertyDef {
    name: Ident,
    ty: Type,
    default: Expr,
}

impl Parse for PropertyDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let ty: Type = input.parse()?;
        input.parse::<Token![=]>()?;
        let default: Expr = input.parse()?;
        Ok(PropertyDef { name, ty, default })
    }
}

/// Arguments accepted by `#[interface(...)]`.
#[derive(Default)]
struct InterfaceArgs {
    /// Use `crate::` instead of `interface_api::` for generated paths.
    /// Set when defining interfaces inside the interface-api crate itself.
    internal: bool,
    /// Ordered property rows for the instance header.
    properties: Vec<PropertyDef>,
}

impl Parse for InterfaceArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = InterfaceArgs::default();
        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            if ident == "internal" {
                args.internal = true;
            } else if ident == "properties" {
                let content;
                parenthesized!(content in input);
                let rows = Punctuated::<PropertyDef, Token![,]>::parse_terminated(&content)?;
                args.properties = rows.into_iter().collect();
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    format!(
                        "unknown option '{}', expected 'internal' or 'properties(...)'",
                        ident
                    ),
                ));
            }
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

/// One `method = path` row from `alias(...)`.
struct AliasEntry {
    method: Ident,
    target: syn::Path,
}

impl Parse for AliasEntry {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let method: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let target: syn::Path = input.parse()?;
        Ok(AliasEntry { method, target })
    }
}

/// Arguments accepted by `#[implement(...)]`.
struct ImplementArgs {
    /// Interface whose dispatch table is being populated.
    interface: Ident,
    /// Use `crate::` instead of `interface_api::` for generated paths.
    internal: bool,
    /// Slots satisfied by borrowing an externally visible body instead of a
    /// fresh method: each target must be a fn with the slot's signature.
    aliases: Vec<AliasEntry>,
}

impl Parse for ImplementArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let interface: Ident = input.parse()?;
        let mut args = ImplementArgs {
            interface,
            internal: false,
            aliases: Vec::new(),
        };
        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            let ident: Ident = input.parse()?;
            if ident == "internal" {
                args.internal = true;
            } else if ident == "alias" {
                let content;
                parenthesized!(content in input);
                let rows = Punctuated::<AliasEntry, Token![,]>::parse_terminated(&content)?;
                args.aliases.extend(rows);
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    format!(
                        "unknown option '{}', expected 'internal' or 'alias(...)'",
                        ident
                    ),
                ));
            }
        }
        Ok(args)
    }
}

// =============================================================================
// Signature validation
// =============================================================================

/// Validate a method signature for dispatch-table compatibility.
///
/// Table slots are plain `fn` pointers, so methods must be monomorphic,
/// synchronous, and carry a by-reference receiver (the self slot of the
/// signature). Everything else is left to ordinary type checking.
fn validate_signature(sig: &syn::Signature) -> syn::Result<()> {
    let method_name = &sig.ident;
    let span = method_name.span();

    if sig.asyncness.is_some() {
        return Err(syn::Error::new(
            span,
            format!(
                "method '{}': async methods cannot be stored in a dispatch table",
                method_name
            ),
        ));
    }

    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            span,
            format!(
                "method '{}': generic methods cannot be stored in a dispatch table",
                method_name
            ),
        ));
    }

    let receiver = sig.inputs.iter().find_map(|arg| match arg {
        FnArg::Receiver(r) => Some(r),
        FnArg::Typed(_) => None,
    });
    let Some(receiver) = receiver else {
        return Err(syn::Error::new(
            span,
            format!(
                "method '{}': must take &self or &mut self (the self slot of the signature)",
                method_name
            ),
        ));
    };
    if receiver.reference.is_none() {
        return Err(syn::Error::new(
            receiver.self_token.span(),
            format!(
                "method '{}': self by value is not supported, use &self or &mut self",
                method_name
            ),
        ));
    }

    for arg in &sig.inputs {
        if let FnArg::Typed(pat_type) = arg
            && !matches!(pat_type.pat.as_ref(), Pat::Ident(_))
        {
            return Err(syn::Error::new(
                pat_type.pat.span(),
                format!(
                    "method '{}': parameter patterns must be plain identifiers",
                    method_name
                ),
            ));
        }
    }

    Ok(())
}

/// Method shape shared by the interface and implement expansions.
struct MethodInfo {
    name: Ident,
    attrs: Vec<Attribute>,
    is_mut: bool,
    param_names: Vec<Ident>,
    param_types: Vec<Type>,
    output: syn::ReturnType,
}

fn collect_params(sig: &syn::Signature) -> (Vec<Ident>, Vec<Type>) {
    let params: Vec<_> = sig
        .inputs
        .iter()
        .filter_map(|arg| {
            if let FnArg::Typed(pat_type) = arg
                && let Pat::Ident(pat_ident) = pat_type.pat.as_ref()
            {
                return Some((pat_ident.ident.clone(), pat_type.ty.as_ref().clone()));
            }
            None
        })
        .collect();
    (
        params.iter().map(|(n, _)| n.clone()).collect(),
        params.iter().map(|(_, t)| t.clone()).collect(),
    )
}

fn receiver_is_mut(sig: &syn::Signature) -> bool {
    sig.inputs
        .first()
        .is_some_and(|arg| matches!(arg, FnArg::Receiver(r) if r.mutability.is_some()))
}

// =============================================================================
// #[interface]
// =============================================================================

fn interface_internal(args: InterfaceArgs, input: ItemTrait) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "generic interfaces are not supported",
        ));
    }

    let mut methods: Vec<MethodInfo> = Vec::new();
    for item in &input.items {
        let TraitItem::Fn(method) = item else {
            return Err(syn::Error::new(
                item.span(),
                "only methods may appear in an interface",
            ));
        };
        validate_signature(&method.sig)?;
        if method.default.is_some() {
            return Err(syn::Error::new(
                method.sig.ident.span(),
                "interface methods carry no bodies; bind them with #[implement]",
            ));
        }
        let (param_names, param_types) = collect_params(&method.sig);
        methods.push(MethodInfo {
            name: method.sig.ident.clone(),
            attrs: method.attrs.clone(),
            is_mut: receiver_is_mut(&method.sig),
            param_names,
            param_types,
            output: method.sig.output.clone(),
        });
    }

    let name = &input.ident;
    let vis = &input.vis;
    let attrs = &input.attrs;
    let vtable_name = vtable_type_name(name);
    let krate = crate_path(args.internal);
    let method_count = methods.len();

    // One fn-pointer slot per method, in declaration order. The self slot
    // points at the instance header; slots for &mut methods take *mut.
    let mut vtable_fields = Vec::new();
    let mut invoke_wrappers = Vec::new();

    for method in &methods {
        let method_name = &method.name;
        let method_attrs = &method.attrs;
        let param_names = &method.param_names;
        let param_types = &method.param_types;
        let output = &method.output;

        let self_ptr = if method.is_mut {
            quote! { *mut #name }
        } else {
            quote! { *const #name }
        };

        vtable_fields.push(quote! {
            pub #method_name: unsafe fn(
                this: #self_ptr
                #(, #param_names: #param_types)*
            ) #output
        });

        // Invocation operator: read the table, read the slot, call with the
        // header as self. One indirection beyond a direct call.
        let (receiver, self_arg) = if method.is_mut {
            (quote! { &mut self }, quote! { self as *mut Self })
        } else {
            (quote! { &self }, quote! { self as *const Self })
        };

        invoke_wrappers.push(quote! {
            #(#method_attrs)*
            ///
            /// # Safety
            ///
            /// This object's header must be the one embedded in the
            /// implementation it is currently stamped as.
            #[inline]
            pub unsafe fn #method_name(#receiver #(, #param_names: #param_types)*) #output {
                unsafe { (self.vtable.#method_name)(#self_arg #(, #param_names)*) }
            }
        });
    }

    let prop_names: Vec<_> = args.properties.iter().map(|p| &p.name).collect();
    let prop_types: Vec<_> = args.properties.iter().map(|p| &p.ty).collect();
    let prop_defaults: Vec<_> = args.properties.iter().map(|p| &p.default).collect();

    let expanded = quote! {
        /// Dispatch table: one function-pointer slot per interface method, in
        /// declaration order. One value of this type exists per implementation,
        /// with static lifetime, and is never mutated after construction.
        #[repr(C)]
        #vis struct #vtable_name {
            #(#vtable_fields,)*
        }

        #(#attrs)*
        #[repr(C)]
        #vis struct #name {
            vtable: &'static #vtable_name,
            #(pub #prop_names: #prop_types,)*
        }

        impl #name {
            /// The dispatch table this object is currently stamped with.
            #[inline]
            #[must_use]
            pub fn vtable(&self) -> &'static #vtable_name {
                self.vtable
            }

            /// Fresh header stamped as implementation `K`, with every property
            /// at its declared default.
            #[inline]
            #[must_use]
            pub fn new_as<K: #krate::Implements<Self>>() -> Self {
                Self {
                    vtable: K::VTABLE,
                    #(#prop_names: #prop_defaults,)*
                }
            }

            /// Re-stamp this object as implementation `K` of the same
            /// interface. Fields outside the header are untouched; subsequent
            /// virtual calls dispatch to `K`'s bodies.
            ///
            /// # Safety
            ///
            /// Dispatch and the checked down-casts treat the stamp as proof
            /// of the surrounding allocation: this header must be embedded at
            /// `K`'s header offset inside a live object laid out like `K`.
            #[inline]
            pub unsafe fn init_as<K: #krate::Implements<Self>>(&mut self) {
                self.vtable = K::VTABLE;
            }

            /// Whether this object is currently stamped as implementation `K`.
            ///
            /// Table-address equality is both necessary and sufficient, since
            /// each implementation owns exactly one table.
            #[inline]
            #[must_use]
            pub fn is_instance<K: #krate::Implements<Self>>(&self) -> bool {
                ::core::ptr::eq(self.vtable, K::VTABLE)
            }

            #(#invoke_wrappers)*
        }

        unsafe impl #krate::Interface for #name {
            type VTable = #vtable_name;
            const METHOD_COUNT: usize = #method_count;

            #[inline]
            fn vtable_ptr(&self) -> *const #vtable_name {
                self.vtable
            }
        }
    };

    Ok(expanded)
}

/// Define an interface: a method set plus a property set.
///
/// Consumes the annotated trait and generates:
/// - `{Name}VTable` - the dispatch-table struct, one fn-pointer slot per
///   method in declaration order
/// - `{Name}` - the instance-header struct: a never-null dispatch-table
///   reference followed by the properties in declaration order. Embed it as
///   the first member of a concrete object.
/// - invoke wrappers, `new_as`/`init_as` stamping, and `is_instance` on the
///   header, plus an `Interface` impl
///
/// # Options
/// - `properties(name: Type = default, ...)` - typed properties stored in the
///   header; defaults are applied by `new_as`
/// - `internal` - generate `crate::` paths (for use inside interface-api)
///
/// # Example
/// ```ignore
/// #[interface(properties(counter: u64 = 0))]
/// pub trait Counter {
///     fn increment(&mut self) -> u64;
/// }
/// ```
#[proc_macro_attribute]
pub fn interface(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as InterfaceArgs);
    let input = parse_macro_input!(item as ItemTrait);
    match interface_internal(args, input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// =============================================================================
// #[implement]
// =============================================================================

fn implement_internal(args: ImplementArgs, input: ItemImpl) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "generic impl blocks cannot populate a dispatch table",
        ));
    }

    let interface = &args.interface;
    let struct_type = &input.self_ty;
    let struct_name = match struct_type.as_ref() {
        Type::Path(type_path) => type_path.path.segments.last().unwrap().ident.clone(),
        _ => return Err(syn::Error::new(struct_type.span(), "expected a type path")),
    };

    let vtable_name = vtable_type_name(interface);
    let header_field = header_field_name(interface);
    let krate = crate_path(args.internal);

    let mut wrapper_fns = Vec::new();
    let mut vtable_entries = Vec::new();
    let mut original_methods = Vec::new();

    for item in &input.items {
        let ImplItem::Fn(method) = item else {
            return Err(syn::Error::new(
                item.span(),
                "only methods may appear in an #[implement] block",
            ));
        };
        validate_signature(&method.sig)?;

        let method_name = method.sig.ident.clone();
        if let Some(alias) = args.aliases.iter().find(|a| a.method == method_name) {
            return Err(syn::Error::new(
                alias.method.span(),
                format!(
                    "method '{}' has both a body and an alias; pick one",
                    method_name
                ),
            ));
        }

        let (param_names, param_types) = collect_params(&method.sig);
        let output = &method.sig.output;
        let is_mut = receiver_is_mut(&method.sig);
        let wrapper_name = wrapper_fn_name(&struct_name, interface, &method_name);

        // Container-of: the self slot points at the embedded header, so the
        // concrete object starts `offset_of!` bytes before it.
        let (self_ptr, recover) = if is_mut {
            (
                quote! { *mut #interface },
                quote! {
                    let object = &mut *((this as *mut u8).sub(offset) as *mut #struct_type);
                },
            )
        } else {
            (
                quote! { *const #interface },
                quote! {
                    let object = &*((this as *const u8).sub(offset) as *const #struct_type);
                },
            )
        };

        wrapper_fns.push(quote! {
            #[allow(non_snake_case)]
            #[doc(hidden)]
            unsafe fn #wrapper_name(
                this: #self_ptr
                #(, #param_names: #param_types)*
            ) #output {
                unsafe {
                    let offset = ::core::mem::offset_of!(#struct_type, #header_field);
                    #recover
                    object.#method_name(#(#param_names),*)
                }
            }
        });

        vtable_entries.push(quote! {
            #method_name: #wrapper_name
        });

        original_methods.push(method.clone());
    }

    // Borrowed slots: bind the alias target directly. A slot that is neither
    // implemented nor aliased is a missing struct-literal field, and a slot
    // that matches no interface method is an extra one; both are ordinary
    // build-time diagnostics.
    for alias in &args.aliases {
        let method_name = &alias.method;
        let target = &alias.target;
        vtable_entries.push(quote! {
            #method_name: #target
        });
    }

    let vtable_static = vtable_static_name(&struct_name, interface);
    let vtable_const = vtable_const_name(interface);

    let expanded = quote! {
        #(#wrapper_fns)*

        #[doc(hidden)]
        static #vtable_static: #vtable_name = #vtable_name {
            #(#vtable_entries),*
        };

        impl #struct_type {
            /// Dispatch table for this implementation of the interface.
            /// Shared by every instance; never mutated.
            pub const #vtable_const: &'static #vtable_name = &#vtable_static;

            #(#original_methods)*
        }

        unsafe impl #krate::Implements<#interface> for #struct_type {
            const VTABLE: &'static #vtable_name = &#vtable_static;
            const HEADER_OFFSET: usize = ::core::mem::offset_of!(#struct_type, #header_field);
        }
    };

    Ok(expanded)
}

/// Bind a struct's methods into a dispatch table for an interface.
///
/// Applied to a plain `impl` block whose methods match the interface's
/// signatures. Generates:
/// - one wrapper fn per method that recovers the concrete object from the
///   header pointer and calls the inherent method
/// - the implementation's single static dispatch table
/// - a `VTABLE_{INTERFACE}` accessor const and an `Implements<Interface>` impl
///
/// The annotated struct must embed the interface's header under the
/// conventional field name (`header_{interface_snake}`); `define_class!` does
/// this for you.
///
/// # Options
/// - `alias(method = path, ...)` - satisfy a slot by borrowing an externally
///   visible fn with the slot's exact signature instead of writing a body.
///   This is the only cross-implementation reuse mechanism; there is no
///   inheritance chain.
/// - `internal` - generate `crate::` paths (for use inside interface-api)
///
/// # Example
/// ```ignore
/// #[implement(Counter)]
/// impl Tally {
///     fn increment(&mut self) -> u64 {
///         let previous = self.header_counter.counter;
///         self.header_counter.counter += 1;
///         previous
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn implement(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ImplementArgs);
    let input = parse_macro_input!(item as ItemImpl);
    match implement_internal(args, input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_simple() {
        assert_eq!(snake_case("Animal"), "animal");
        assert_eq!(snake_case("Counter"), "counter");
    }

    #[test]
    fn snake_case_multi_word() {
        assert_eq!(snake_case("MutexFactory"), "mutex_factory");
        assert_eq!(snake_case("SystemAllocator"), "system_allocator");
    }

    #[test]
    fn snake_case_uppercase_runs() {
        assert_eq!(snake_case("IOPort"), "io_port");
        assert_eq!(snake_case("HTTPServer"), "http_server");
    }

    #[test]
    fn derived_names() {
        let iface = format_ident!("MutexFactory");
        let imp = format_ident!("NullLockFactory");
        let method = format_ident!("create");

        assert_eq!(vtable_type_name(&iface).to_string(), "MutexFactoryVTable");
        assert_eq!(header_field_name(&iface).to_string(), "header_mutex_factory");
        assert_eq!(vtable_const_name(&iface).to_string(), "VTABLE_MUTEX_FACTORY");
        assert_eq!(
            wrapper_fn_name(&imp, &iface, &method).to_string(),
            "__NullLockFactory__MutexFactory__create"
        );
        assert_eq!(
            vtable_static_name(&imp, &iface).to_string(),
            "__NULL_LOCK_FACTORY_MUTEX_FACTORY_VTABLE"
        );
    }
}
