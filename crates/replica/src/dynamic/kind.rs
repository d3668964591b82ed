// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Copy-strategy classification of declared field types.

use crate::dynamic::{PrimitiveKind, TypeModel, TypeRef};
use std::fmt;

/// Generic names treated as ordered sequences.
pub const SEQUENCE_TYPES: &[&str] = &["List", "Vec", "VecDeque", "Sequence"];
/// Generic names treated as key/value mappings.
pub const MAPPING_TYPES: &[&str] = &["Dictionary", "HashMap", "BTreeMap", "Map", "Mapping"];
/// Generic names treated as sets.
pub const SET_TYPES: &[&str] = &["HashSet", "BTreeSet", "Set"];

/// Copy strategy of a declared type, with nested sub-strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Copied by value.
    Primitive(PrimitiveKind),
    /// New array of the source's lengths.
    Array { rank: usize, element: Box<Kind> },
    Sequence(Box<Kind>),
    Mapping { key: Box<Kind>, value: Box<Kind> },
    Set(Box<Kind>),
    /// Cloneable user-defined type, dispatched on the runtime type.
    Nested(String),
    /// No copy strategy applies.
    Unsupported(TypeRef),
}

impl Kind {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// False if an `Unsupported` appears anywhere in the tree.
    pub fn is_supported(&self) -> bool {
        self.first_unsupported().is_none()
    }

    /// Innermost declared type without a copy strategy.
    pub fn first_unsupported(&self) -> Option<&TypeRef> {
        match self {
            Self::Primitive(_) | Self::Nested(_) => None,
            Self::Array { element, .. } | Self::Sequence(element) | Self::Set(element) => {
                element.first_unsupported()
            }
            Self::Mapping { key, value } => key
                .first_unsupported()
                .or_else(|| value.first_unsupported()),
            Self::Unsupported(ty) => Some(ty),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::Array { rank, element } => write!(f, "array[{rank}] of {element}"),
            Self::Sequence(element) => write!(f, "sequence of {element}"),
            Self::Mapping { key, value } => write!(f, "mapping of {key} to {value}"),
            Self::Set(element) => write!(f, "set of {element}"),
            Self::Nested(name) => write!(f, "object {name}"),
            Self::Unsupported(ty) => write!(f, "unsupported {ty}"),
        }
    }
}

/// Classify a declared type. Pure and total: anything without a strategy
/// becomes [`Kind::Unsupported`].
pub fn classify(ty: &TypeRef, model: &dyn TypeModel) -> Kind {
    match ty {
        TypeRef::Primitive(kind) => Kind::Primitive(*kind),
        TypeRef::Array { rank, element } if *rank > 0 => Kind::Array {
            rank: *rank,
            element: Box::new(classify(element, model)),
        },
        TypeRef::Generic { name, .. } => {
            let args = model.generic_arguments(ty);
            let name = name.as_str();
            match args.as_slice() {
                [element] if SEQUENCE_TYPES.contains(&name) => {
                    Kind::Sequence(Box::new(classify(element, model)))
                }
                [key, value] if MAPPING_TYPES.contains(&name) => Kind::Mapping {
                    key: Box::new(classify(key, model)),
                    value: Box::new(classify(value, model)),
                },
                [element] if SET_TYPES.contains(&name) => {
                    Kind::Set(Box::new(classify(element, model)))
                }
                _ => Kind::Unsupported(ty.clone()),
            }
        }
        TypeRef::Named(name) if model.is_cloneable(name) => Kind::Nested(name.clone()),
        _ => Kind::Unsupported(ty.clone()),
    }
}
