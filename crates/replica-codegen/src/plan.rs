// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Clone statement synthesis.
//!
//! Each [`FieldKind`] is lowered twice:
//! - [`clone_expr`]: an expression producing a fresh deep copy of `*src`
//! - [`reuse_stmt`]: a statement repopulating `*dst` from `*src`, keeping
//!   the allocations already owned by the target
//!
//! `src` is always an expression of type `&T` and `dst` of type `&mut T`.
//! Both are bound to fresh locals before use, named by nesting depth so that
//! recursive expansion never shadows an outer binding still in use.

use crate::kind::{FieldKind, PointerFlavor, SeqFlavor};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::spanned::Spanned;

fn local(prefix: &str, depth: usize) -> Ident {
    format_ident!("__replica_{}{}", prefix, depth, span = Span::mixed_site())
}

/// Expression cloning `*src` into a new value.
pub(crate) fn clone_expr(kind: &FieldKind, src: &TokenStream, depth: usize) -> TokenStream {
    let s = local("src", depth);
    let d = local("dst", depth);
    let e = local("elem", depth);

    match kind {
        FieldKind::Primitive => quote! { ::core::clone::Clone::clone(#src) },
        FieldKind::Nested(ty) => quote_spanned! {ty.span()=>
            ::replica::DeepClone::deep_clone(#src)
        },
        FieldKind::Unsupported(ty) => quote_spanned! {ty.span()=>
            ::core::compile_error!("unsupported field type")
        },
        FieldKind::Optional(inner) => {
            let inner = clone_expr(inner, &quote!(#s), depth + 1);
            quote! {
                match #src {
                    ::core::option::Option::Some(#s) => ::core::option::Option::Some(#inner),
                    ::core::option::Option::None => ::core::option::Option::None,
                }
            }
        }
        FieldKind::Pointer { flavor, inner } => {
            let inner = clone_expr(inner, &quote!(&**#s), depth + 1);
            let ctor = pointer_ctor(*flavor);
            quote! {{
                let #s = #src;
                #ctor(#inner)
            }}
        }
        FieldKind::Array { element } => {
            if element.is_primitive() {
                return quote! { ::core::clone::Clone::clone(#src) };
            }
            let i = local("index", depth);
            let inner = clone_expr(element, &quote!(&#s[#i]), depth + 1);
            quote! {{
                let #s = #src;
                ::core::array::from_fn(|#i| #inner)
            }}
        }
        FieldKind::Slice { element } => {
            if element.is_primitive() {
                return quote! { ::core::clone::Clone::clone(#src) };
            }
            let inner = clone_expr(element, &quote!(#e), depth + 1);
            quote! {{
                let #s = #src;
                #s.iter()
                    .map(|#e| #inner)
                    .collect::<::std::boxed::Box<[_]>>()
            }}
        }
        FieldKind::Sequence {
            ty,
            flavor,
            element,
        } => {
            if element.is_primitive() {
                return quote! { ::core::clone::Clone::clone(#src) };
            }
            let inner = clone_expr(element, &quote!(#e), depth + 1);
            let push = seq_push(*flavor);
            quote! {{
                let #s = #src;
                let mut #d: #ty = ::core::default::Default::default();
                #d.reserve(#s.len());
                for #e in #s.iter() {
                    #d.#push(#inner);
                }
                #d
            }}
        }
        FieldKind::Mapping {
            ty,
            reserve,
            key,
            value,
        } => {
            if key.is_primitive() && value.is_primitive() {
                return quote! { ::core::clone::Clone::clone(#src) };
            }
            let k = local("key", depth);
            let v = local("value", depth);
            let key = clone_expr(key, &quote!(#k), depth + 1);
            let value = clone_expr(value, &quote!(#v), depth + 1);
            let reserve = reserve.then(|| quote! { #d.reserve(#s.len()); });
            quote! {{
                let #s = #src;
                let mut #d: #ty = ::core::default::Default::default();
                #reserve
                for (#k, #v) in #s.iter() {
                    #d.insert(#key, #value);
                }
                #d
            }}
        }
        FieldKind::Set {
            ty,
            reserve,
            element,
        } => {
            if element.is_primitive() {
                return quote! { ::core::clone::Clone::clone(#src) };
            }
            let inner = clone_expr(element, &quote!(#e), depth + 1);
            let reserve = reserve.then(|| quote! { #d.reserve(#s.len()); });
            quote! {{
                let #s = #src;
                let mut #d: #ty = ::core::default::Default::default();
                #reserve
                for #e in #s.iter() {
                    #d.insert(#inner);
                }
                #d
            }}
        }
    }
}

/// Statement repopulating `*dst` from `*src` in place.
pub(crate) fn reuse_stmt(
    kind: &FieldKind,
    src: &TokenStream,
    dst: &TokenStream,
    depth: usize,
) -> TokenStream {
    let s = local("src", depth);
    let d = local("dst", depth);

    match kind {
        FieldKind::Primitive => quote! {
            ::core::clone::Clone::clone_from(#dst, #src);
        },
        FieldKind::Nested(ty) => quote_spanned! {ty.span()=>
            ::replica::DeepClone::deep_clone_into(#src, #dst);
        },
        FieldKind::Unsupported(ty) => quote_spanned! {ty.span()=>
            ::core::compile_error!("unsupported field type");
        },
        FieldKind::Optional(inner) => {
            let slot = local("slot", depth);
            let reuse = reuse_stmt(inner, &quote!(#s), &quote!(#d), depth + 1);
            let fresh = clone_expr(inner, &quote!(#s), depth + 1);
            quote! {
                match (#src, #dst) {
                    (::core::option::Option::Some(#s), ::core::option::Option::Some(#d)) => {
                        #reuse
                    }
                    (::core::option::Option::Some(#s), #slot) => {
                        *#slot = ::core::option::Option::Some(#fresh);
                    }
                    (::core::option::Option::None, #slot) => {
                        *#slot = ::core::option::Option::None;
                    }
                }
            }
        }
        FieldKind::Pointer {
            flavor: PointerFlavor::Box,
            inner,
        } => {
            let reuse = reuse_stmt(inner, &quote!(&**#s), &quote!(&mut **#d), depth + 1);
            quote! {{
                let #s = #src;
                let #d = #dst;
                #reuse
            }}
        }
        FieldKind::Pointer { .. } => {
            // Shared pointers cannot be mutated in place.
            let fresh = clone_expr(kind, &quote!(#s), depth);
            quote! {{
                let #s = #src;
                *#dst = #fresh;
            }}
        }
        FieldKind::Array { element } => {
            if element.is_primitive() {
                return quote! { ::core::clone::Clone::clone_from(#dst, #src); };
            }
            let (se, de) = (local("src_elem", depth), local("dst_elem", depth));
            let reuse = reuse_stmt(element, &quote!(#se), &quote!(#de), depth + 1);
            quote! {{
                let #s = #src;
                let #d = #dst;
                for (#se, #de) in #s.iter().zip(#d.iter_mut()) {
                    #reuse
                }
            }}
        }
        FieldKind::Slice { element } => {
            if element.is_primitive() {
                return quote! { ::core::clone::Clone::clone_from(#dst, #src); };
            }
            let (se, de) = (local("src_elem", depth), local("dst_elem", depth));
            let reuse = reuse_stmt(element, &quote!(#se), &quote!(#de), depth + 1);
            let fresh = clone_expr(kind, &quote!(#s), depth + 1);
            quote! {{
                let #s = #src;
                let #d = #dst;
                if #s.len() == #d.len() {
                    for (#se, #de) in #s.iter().zip(#d.iter_mut()) {
                        #reuse
                    }
                } else {
                    *#d = #fresh;
                }
            }}
        }
        FieldKind::Sequence {
            flavor, element, ..
        } => {
            if element.is_primitive() {
                return quote! { ::core::clone::Clone::clone_from(#dst, #src); };
            }
            let (se, de) = (local("src_elem", depth), local("dst_elem", depth));
            let kept = local("kept", depth);
            let reuse = reuse_stmt(element, &quote!(#se), &quote!(#de), depth + 1);
            let fresh = clone_expr(element, &quote!(#se), depth + 1);
            let push = seq_push(*flavor);
            quote! {{
                let #s = #src;
                let #d = #dst;
                #d.truncate(#s.len());
                let #kept = #d.len();
                for (#se, #de) in #s.iter().zip(#d.iter_mut()) {
                    #reuse
                }
                #d.reserve(#s.len() - #kept);
                for #se in #s.iter().skip(#kept) {
                    #d.#push(#fresh);
                }
            }}
        }
        FieldKind::Mapping {
            reserve,
            key,
            value,
            ..
        } => {
            if key.is_primitive() && value.is_primitive() {
                return quote! { ::core::clone::Clone::clone_from(#dst, #src); };
            }
            let k = local("key", depth);
            let v = local("value", depth);
            let key = clone_expr(key, &quote!(#k), depth + 1);
            let value = clone_expr(value, &quote!(#v), depth + 1);
            let reserve = reserve.then(|| quote! { #d.reserve(#s.len()); });
            quote! {{
                let #s = #src;
                let #d = #dst;
                #d.clear();
                #reserve
                for (#k, #v) in #s.iter() {
                    #d.insert(#key, #value);
                }
            }}
        }
        FieldKind::Set {
            reserve, element, ..
        } => {
            if element.is_primitive() {
                return quote! { ::core::clone::Clone::clone_from(#dst, #src); };
            }
            let e = local("elem", depth);
            let inner = clone_expr(element, &quote!(#e), depth + 1);
            let reserve = reserve.then(|| quote! { #d.reserve(#s.len()); });
            quote! {{
                let #s = #src;
                let #d = #dst;
                #d.clear();
                #reserve
                for #e in #s.iter() {
                    #d.insert(#inner);
                }
            }}
        }
    }
}

fn seq_push(flavor: SeqFlavor) -> TokenStream {
    match flavor {
        SeqFlavor::Vec => quote!(push),
        SeqFlavor::Deque => quote!(push_back),
    }
}

fn pointer_ctor(flavor: PointerFlavor) -> TokenStream {
    match flavor {
        PointerFlavor::Box => quote!(::std::boxed::Box::new),
        PointerFlavor::Rc => quote!(::std::rc::Rc::new),
        PointerFlavor::Arc => quote!(::std::sync::Arc::new),
    }
}
