// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for clone plan building and execution.

use crate::diagnostics::UnsupportedField;
use std::fmt;

/// Errors raised while building or running clone routines.
///
/// Every error is reported to the immediate caller; none is fatal to the
/// process or to routines already cached for other types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The runtime type of the instance never opted in to cloning.
    NotCloneable { type_name: String },
    /// A field type has no copy strategy; the owning type's plan is abandoned.
    UnsupportedFieldType(UnsupportedField),
    /// A cloneable type does not meet structural prerequisites.
    MalformedDeclaration { type_name: String, reason: String },
    /// The type model has no descriptor with this name.
    UnknownType(String),
    /// An object has no field with this name.
    UnknownField { type_name: String, field: String },
    /// `clone_into` was given a target of a different runtime type.
    TargetMismatch { source: String, target: String },
    /// Instance data does not match the declared type of its field.
    ValueMismatch {
        type_name: String,
        field: String,
        expected: String,
        found: &'static str,
    },
}

impl Error {
    pub(crate) fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDeclaration {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_cloneable(type_name: impl Into<String>) -> Self {
        Self::NotCloneable {
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCloneable { type_name } => {
                write!(f, "{type_name} isn't a cloneable type")
            }
            Self::UnsupportedFieldType(report) => write!(f, "{report}"),
            Self::MalformedDeclaration { type_name, reason } => {
                write!(f, "malformed cloneable type {type_name}: {reason}")
            }
            Self::UnknownType(name) => write!(f, "unknown type: {name}"),
            Self::UnknownField { type_name, field } => {
                write!(f, "type {type_name} has no field `{field}`")
            }
            Self::TargetMismatch { source, target } => {
                write!(f, "cannot clone {source} into a {target} target")
            }
            Self::ValueMismatch {
                type_name,
                field,
                expected,
                found,
            } => write!(
                f,
                "field {type_name}.{field}: expected {expected}, found {found}"
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<UnsupportedField> for Error {
    fn from(report: UnsupportedField) -> Self {
        Self::UnsupportedFieldType(report)
    }
}

/// Result alias for replica operations.
pub type Result<T> = std::result::Result<T, Error>;
