// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

mod attrs;
mod kind;
mod plan;

use attrs::FieldAttrs;
use kind::FieldKind;
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::{
    parse_macro_input, parse_quote, Data, DataEnum, DeriveInput, Field, Fields, GenericParam,
    Ident, Index, Member, Token,
};

/// `#[derive(DeepClone)]` macro: synthesizes `replica::DeepClone` for a
/// struct with named fields or an enum.
///
/// Every named field is classified once and lowered to dedicated copy code:
/// - Primitives (integers, floats, `bool`, `char`, `String`, ...): `Clone`
/// - `[T; N]`, `Box<[T]>`: new array of the source length, bulk copy for primitives
/// - `Vec`/`VecDeque`, `HashMap`/`BTreeMap`, `HashSet`/`BTreeSet`: element-wise deep copy
/// - `Option<T>`: `None` propagates
/// - `Box<T>`, `Rc<T>`, `Arc<T>`: fresh pointer around a deep copy
/// - other named types and `Box<dyn ...>`: dispatched through `DeepClone`
///
/// Enum variants are matched and their fields lowered the same way, so a
/// fieldless enum is copied by value.
///
/// Field attributes:
/// - `#[replica(ignore)]`: not copied, the clone holds `Default::default()`
/// - `#[replica(base)]`: embedded base record, cloned first (structs only)
/// - `#[replica(primitive)]`: copied with `Clone` without classification
///
/// Example:
/// ```ignore
/// use replica::DeepClone;
///
/// #[derive(Default, DeepClone)]
/// struct Child {
///     id: i32,
/// }
///
/// #[derive(Default, DeepClone)]
/// struct FChild {
///     #[replica(base)]
///     base: Child,
///     name_f: String,
/// }
/// ```
#[proc_macro_derive(DeepClone, attributes(replica))]
pub fn derive_deep_clone(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// One field with its resolved strategy.
struct FieldPlan {
    attrs: FieldAttrs,
    kind: FieldKind,
}

/// Parse the attributes of `field` and classify its type. `owner` and
/// `label` name the field in diagnostics.
fn plan_field(owner: &str, label: &str, field: &Field) -> syn::Result<FieldPlan> {
    let attrs = FieldAttrs::parse(field)?;
    let kind = if attrs.primitive {
        FieldKind::Primitive
    } else if attrs.base {
        FieldKind::Nested(field.ty.clone())
    } else {
        kind::classify(&field.ty)
    };

    if !attrs.ignore {
        if let Some(offending) = kind.first_unsupported() {
            let field_ty = &field.ty;
            return Err(syn::Error::new_spanned(
                offending,
                format!(
                    "field `{owner}.{label}` has unsupported type `{}`. Supported types: \
                     primitives, String, arrays, Vec, VecDeque, HashMap, BTreeMap, HashSet, \
                     BTreeSet, Option, Box, Rc, Arc and DeepClone types.",
                    quote!(#field_ty)
                ),
            ));
        }
    }
    Ok(FieldPlan { attrs, kind })
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let (clone_body, reuse_body) = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => expand_struct(input, &fields.named)?,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "DeepClone requires a struct with named fields",
                ))
            }
        },
        Data::Enum(data) => expand_enum(input, data)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "DeepClone can only be derived for structs and enums",
            ))
        }
    };

    let mut generics = input.generics.clone();
    let type_params: Vec<Ident> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(ty) => Some(ty.ident.clone()),
            _ => None,
        })
        .collect();
    {
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(parse_quote!(#param: ::replica::DeepClone));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::replica::DeepClone for #name #ty_generics #where_clause {
            fn deep_clone(&self) -> Self {
                #clone_body
            }

            #[allow(unused_variables, unreachable_patterns)]
            fn deep_clone_into(&self, target: &mut Self) {
                #reuse_body
            }
        }
    })
}

fn expand_struct(
    input: &DeriveInput,
    fields: &Punctuated<Field, Token![,]>,
) -> syn::Result<(TokenStream2, TokenStream2)> {
    let owner = input.ident.to_string();
    let mut plans = Vec::with_capacity(fields.len());
    let mut base: Option<&Ident> = None;

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let plan = plan_field(&owner, &field_name.to_string(), field)?;
        if plan.attrs.base {
            if base.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked `#[replica(base)]`",
                ));
            }
            base = Some(field_name);
        }
        plans.push((field_name, plan));
    }

    // Base first so the embedded record is populated before the derived fields.
    plans.sort_by_key(|(_, plan)| !plan.attrs.base);

    let mut init_fields = Vec::with_capacity(plans.len());
    let mut reuse_stmts = Vec::with_capacity(plans.len());

    for (field, plan) in &plans {
        if plan.attrs.ignore {
            init_fields.push(quote! { #field: ::core::default::Default::default() });
            continue;
        }
        let src = quote!(&self.#field);
        let dst = quote!(&mut target.#field);
        let value = plan::clone_expr(&plan.kind, &src, 0);
        let reuse = plan::reuse_stmt(&plan.kind, &src, &dst, 0);
        init_fields.push(quote! { #field: #value });
        reuse_stmts.push(quote! { { #reuse } });
    }

    Ok((
        quote! { Self { #(#init_fields),* } },
        quote! { #(#reuse_stmts)* },
    ))
}

/// Enums are matched variant by variant. A target holding the same variant
/// is repopulated field by field; any other target is replaced.
fn expand_enum(
    input: &DeriveInput,
    data: &DataEnum,
) -> syn::Result<(TokenStream2, TokenStream2)> {
    if data.variants.is_empty() {
        return Ok((quote! { match *self {} }, quote! { match *self {} }));
    }

    let mut clone_arms = Vec::with_capacity(data.variants.len());
    let mut reuse_arms = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        let ident = &variant.ident;
        let owner = format!("{}::{}", input.ident, ident);
        let mut src_pats = Vec::with_capacity(variant.fields.len());
        let mut dst_pats = Vec::with_capacity(variant.fields.len());
        let mut inits = Vec::with_capacity(variant.fields.len());
        let mut reuses = Vec::with_capacity(variant.fields.len());

        for (index, field) in variant.fields.iter().enumerate() {
            let (member, label) = match &field.ident {
                Some(name) => (Member::Named(name.clone()), name.to_string()),
                None => (Member::Unnamed(Index::from(index)), index.to_string()),
            };
            let plan = plan_field(&owner, &label, field)?;
            if plan.attrs.base {
                return Err(syn::Error::new_spanned(
                    field,
                    "`#[replica(base)]` is only allowed on struct fields",
                ));
            }
            if plan.attrs.ignore {
                src_pats.push(quote! { #member: _ });
                dst_pats.push(quote! { #member: _ });
                inits.push(quote! { #member: ::core::default::Default::default() });
                continue;
            }

            let src = format_ident!("__replica_field_src{}", index, span = Span::mixed_site());
            let dst = format_ident!("__replica_field_dst{}", index, span = Span::mixed_site());
            let value = plan::clone_expr(&plan.kind, &quote!(#src), 0);
            let reuse = plan::reuse_stmt(&plan.kind, &quote!(#src), &quote!(#dst), 0);
            src_pats.push(quote! { #member: #src });
            dst_pats.push(quote! { #member: #dst });
            inits.push(quote! { #member: #value });
            reuses.push(quote! { { #reuse } });
        }

        clone_arms.push(quote! {
            Self::#ident { #(#src_pats),* } => Self::#ident { #(#inits),* },
        });
        reuse_arms.push(quote! {
            (Self::#ident { #(#src_pats),* }, Self::#ident { #(#dst_pats),* }) => {
                #(#reuses)*
            }
        });
    }

    let source = format_ident!("__replica_source", span = Span::mixed_site());
    let slot = format_ident!("__replica_slot", span = Span::mixed_site());
    Ok((
        quote! {
            match self {
                #(#clone_arms)*
            }
        },
        quote! {
            match (self, &mut *target) {
                #(#reuse_arms)*
                (#source, #slot) => {
                    *#slot = ::replica::DeepClone::deep_clone(#source);
                }
            }
        },
    ))
}
