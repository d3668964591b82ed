// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `#[replica(...)]` field attribute parsing.

use syn::{Attribute, Field};

/// Per-field options.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FieldAttrs {
    /// `#[replica(ignore)]`: left at its default value.
    pub ignore: bool,
    /// `#[replica(base)]`: embedded base record, cloned before the other fields.
    pub base: bool,
    /// `#[replica(primitive)]`: copied with `Clone`, bypassing classification.
    pub primitive: bool,
}

impl FieldAttrs {
    pub(crate) fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();
        for attr in field.attrs.iter().filter(|a| is_replica(a)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignore") {
                    attrs.ignore = true;
                } else if meta.path.is_ident("base") {
                    attrs.base = true;
                } else if meta.path.is_ident("primitive") {
                    attrs.primitive = true;
                } else {
                    return Err(meta.error(
                        "unknown replica attribute, expected `ignore`, `base` or `primitive`",
                    ));
                }
                Ok(())
            })?;
        }

        if attrs.base && (attrs.ignore || attrs.primitive) {
            return Err(syn::Error::new_spanned(
                field,
                "`#[replica(base)]` cannot be combined with `ignore` or `primitive`",
            ));
        }
        Ok(attrs)
    }
}

fn is_replica(attr: &Attribute) -> bool {
    attr.path().is_ident("replica")
}
