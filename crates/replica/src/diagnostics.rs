// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structured reports for fields no copy strategy applies to.

use std::fmt;

/// Position of a declaration in its source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePos {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A field whose declared type cannot be classified.
///
/// Raised while building a clone plan; the whole plan for `owner` is
/// abandoned and nothing is cached for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedField {
    /// Type declaring the field.
    pub owner: String,
    /// Field name.
    pub field: String,
    /// Rendered declared type of the field.
    pub field_type: String,
    /// Declaration site, when the type model knows it.
    pub position: Option<SourcePos>,
}

impl UnsupportedField {
    pub fn new(
        owner: impl Into<String>,
        field: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            field: field.into(),
            field_type: field_type.into(),
            position: None,
        }
    }

    #[must_use]
    pub fn at(mut self, position: Option<SourcePos>) -> Self {
        self.position = position;
        self
    }
}

impl fmt::Display for UnsupportedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = &self.position {
            write!(f, "{pos}: ")?;
        }
        write!(
            f,
            "field `{}.{}` has unsupported type `{}`",
            self.owner, self.field, self.field_type
        )
    }
}
