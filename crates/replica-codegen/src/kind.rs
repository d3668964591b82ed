// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field kind classification over `syn` types.

use syn::{GenericArgument, PathArguments, Type, TypePath, TypeReference};

/// Scalar and immutable types copied with `Clone`.
const PRIMITIVES: &[&str] = &[
    "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
    "usize", "f32", "f64", "String", "PathBuf", "OsString", "Duration", "Instant", "SystemTime",
];

/// Growable sequence containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SeqFlavor {
    Vec,
    Deque,
}

/// Owning pointer wrappers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PointerFlavor {
    Box,
    Rc,
    Arc,
}

/// Copy strategy for one field (or one element/key/value inside a field).
#[derive(Clone, Debug)]
pub(crate) enum FieldKind {
    /// Copied with `Clone`, no deep work.
    Primitive,
    /// `[T; N]`
    Array { element: Box<FieldKind> },
    /// `Box<[T]>`, length taken from the source.
    Slice { element: Box<FieldKind> },
    /// `Vec<T>` / `VecDeque<T>`
    Sequence {
        ty: Type,
        flavor: SeqFlavor,
        element: Box<FieldKind>,
    },
    /// `HashMap<K, V>` / `BTreeMap<K, V>`
    Mapping {
        ty: Type,
        reserve: bool,
        key: Box<FieldKind>,
        value: Box<FieldKind>,
    },
    /// `HashSet<T>` / `BTreeSet<T>`
    Set {
        ty: Type,
        reserve: bool,
        element: Box<FieldKind>,
    },
    /// `Option<T>`: `None` propagates without recursive work.
    Optional(Box<FieldKind>),
    /// `Box<T>` / `Rc<T>` / `Arc<T>` owning a sized value.
    Pointer {
        flavor: PointerFlavor,
        inner: Box<FieldKind>,
    },
    /// User type (or trait object) dispatched through `DeepClone`.
    Nested(Type),
    /// No strategy applies; carries the offending type.
    Unsupported(Type),
}

impl FieldKind {
    /// Whether the kind is copied by plain `Clone` (bulk copy candidate).
    pub(crate) fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive)
    }

    /// First unsupported type anywhere in the kind tree.
    pub(crate) fn first_unsupported(&self) -> Option<&Type> {
        match self {
            Self::Unsupported(ty) => Some(ty),
            Self::Primitive | Self::Nested(_) => None,
            Self::Array { element }
            | Self::Slice { element }
            | Self::Sequence { element, .. }
            | Self::Set { element, .. } => element.first_unsupported(),
            Self::Optional(inner) | Self::Pointer { inner, .. } => inner.first_unsupported(),
            Self::Mapping { key, value, .. } => {
                key.first_unsupported().or_else(|| value.first_unsupported())
            }
        }
    }
}

/// Classify a field type.
pub(crate) fn classify(ty: &Type) -> FieldKind {
    match ty {
        Type::Paren(inner) => classify(&inner.elem),
        Type::Group(inner) => classify(&inner.elem),
        Type::Tuple(tuple) if tuple.elems.is_empty() => FieldKind::Primitive,
        Type::Array(array) => FieldKind::Array {
            element: Box::new(classify(&array.elem)),
        },
        Type::Reference(reference) if is_static_str(reference) => FieldKind::Primitive,
        Type::Path(path) if path.qself.is_none() => classify_path(ty, path),
        _ => FieldKind::Unsupported(ty.clone()),
    }
}

fn classify_path(ty: &Type, path: &TypePath) -> FieldKind {
    let Some(segment) = path.path.segments.last() else {
        return FieldKind::Unsupported(ty.clone());
    };
    let ident = segment.ident.to_string();

    let args = match &segment.arguments {
        PathArguments::None => Vec::new(),
        PathArguments::AngleBracketed(bracketed) => bracketed
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(inner) => Some(inner),
                _ => None,
            })
            .collect(),
        PathArguments::Parenthesized(_) => return FieldKind::Unsupported(ty.clone()),
    };

    match (ident.as_str(), args.as_slice()) {
        (name, []) if PRIMITIVES.contains(&name) => FieldKind::Primitive,
        ("PhantomData", _) => FieldKind::Primitive,
        ("Box" | "Rc" | "Arc", [inner]) if is_path_ident(inner, "str") => FieldKind::Primitive,
        ("Box", [Type::Slice(slice)]) => FieldKind::Slice {
            element: Box::new(classify(&slice.elem)),
        },
        ("Box", [Type::TraitObject(_)]) => FieldKind::Nested(ty.clone()),
        ("Box", [inner]) => pointer(PointerFlavor::Box, inner),
        ("Rc", [inner]) => pointer(PointerFlavor::Rc, inner),
        ("Arc", [inner]) => pointer(PointerFlavor::Arc, inner),
        ("Option", [inner]) => FieldKind::Optional(Box::new(classify(inner))),
        ("Vec", [element]) => sequence(ty, SeqFlavor::Vec, element),
        ("VecDeque", [element]) => sequence(ty, SeqFlavor::Deque, element),
        ("HashMap", [key, value] | [key, value, _]) => mapping(ty, true, key, value),
        ("BTreeMap", [key, value]) => mapping(ty, false, key, value),
        ("HashSet", [element] | [element, _]) => set(ty, true, element),
        ("BTreeSet", [element]) => set(ty, false, element),
        (_, []) if segment.arguments.is_none() => FieldKind::Nested(ty.clone()),
        _ => FieldKind::Unsupported(ty.clone()),
    }
}

fn pointer(flavor: PointerFlavor, inner: &Type) -> FieldKind {
    FieldKind::Pointer {
        flavor,
        inner: Box::new(classify(inner)),
    }
}

fn sequence(ty: &Type, flavor: SeqFlavor, element: &Type) -> FieldKind {
    FieldKind::Sequence {
        ty: ty.clone(),
        flavor,
        element: Box::new(classify(element)),
    }
}

fn mapping(ty: &Type, reserve: bool, key: &Type, value: &Type) -> FieldKind {
    FieldKind::Mapping {
        ty: ty.clone(),
        reserve,
        key: Box::new(classify(key)),
        value: Box::new(classify(value)),
    }
}

fn set(ty: &Type, reserve: bool, element: &Type) -> FieldKind {
    FieldKind::Set {
        ty: ty.clone(),
        reserve,
        element: Box::new(classify(element)),
    }
}

fn is_static_str(reference: &TypeReference) -> bool {
    reference.mutability.is_none()
        && reference
            .lifetime
            .as_ref()
            .is_some_and(|lifetime| lifetime.ident == "static")
        && is_path_ident(&reference.elem, "str")
}

fn is_path_ident(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(path) => path.qself.is_none() && path.path.is_ident(name),
        _ => false,
    }
}
