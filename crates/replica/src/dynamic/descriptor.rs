// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for the interpreted backend.

use crate::diagnostics::SourcePos;
use crate::dynamic::Value;
use std::fmt;
use std::sync::Arc;

/// Primitive type kinds. All of them are copied by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    /// Immutable string, shared between source and clone.
    String,
    /// Opaque shared object, copied by reference.
    Opaque,
    /// Enumeration constant held as its integer discriminant.
    Enum,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
            Self::Opaque => "opaque",
            Self::Enum => "enum",
        }
    }

    /// Value held by a freshly constructed field of this kind.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::Char => Value::Char('\0'),
            Self::String => Value::Str(Arc::from("")),
            Self::Opaque => Value::Null,
            Self::Enum => Value::I32(0),
        }
    }

    /// Whether `value` is a legal instance of this kind. `Null` is accepted
    /// for strings and opaque objects only.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (Self::I8, Value::I8(_))
                | (Self::I16, Value::I16(_))
                | (Self::I32, Value::I32(_))
                | (Self::I64, Value::I64(_))
                | (Self::U8, Value::U8(_))
                | (Self::U16, Value::U16(_))
                | (Self::U32, Value::U32(_))
                | (Self::U64, Value::U64(_))
                | (Self::F32, Value::F32(_))
                | (Self::F64, Value::F64(_))
                | (Self::Char, Value::Char(_))
                | (Self::String, Value::Str(_) | Value::Null)
                | (Self::Opaque, Value::Opaque(_) | Value::Null)
                | (
                    Self::Enum,
                    Value::I8(_)
                        | Value::I16(_)
                        | Value::I32(_)
                        | Value::I64(_)
                        | Value::U8(_)
                        | Value::U16(_)
                        | Value::U32(_)
                        | Value::U64(_)
                )
        )
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// Rectangular array; `rank` is the number of dimensions.
    Array { rank: usize, element: Box<TypeRef> },
    /// Instantiated generic, e.g. `List<i32>` or `Dictionary<string, A>`.
    Generic { name: String, args: Vec<TypeRef> },
    /// User-defined type, resolved through the type model.
    Named(String),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn array(element: TypeRef, rank: usize) -> Self {
        Self::Array {
            rank,
            element: Box::new(element),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Generic {
            name: name.into(),
            args,
        }
    }

    /// `List<element>`
    pub fn list(element: TypeRef) -> Self {
        Self::generic("List", vec![element])
    }

    /// `Dictionary<key, value>`
    pub fn dictionary(key: TypeRef, value: TypeRef) -> Self {
        Self::generic("Dictionary", vec![key, value])
    }

    /// `HashSet<element>`
    pub fn set(element: TypeRef) -> Self {
        Self::generic("HashSet", vec![element])
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Value held by a freshly constructed field of this type. Everything
    /// but primitives starts out absent.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Primitive(kind) => kind.default_value(),
            _ => Value::Null,
        }
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::Array { rank, element } => {
                write!(f, "{element}[{}]", ",".repeat(rank.saturating_sub(1)))
            }
            Self::Generic { name, args } => {
                write!(f, "{name}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Field of a user-defined type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
    /// Excluded from cloning; the clone keeps the field's default.
    pub ignored: bool,
    /// Declaration site, used in unsupported-type reports.
    pub position: Option<SourcePos>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ignored: false,
            position: None,
        }
    }

    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    #[must_use]
    pub fn at(mut self, position: SourcePos) -> Self {
        self.position = Some(position);
        self
    }
}

/// A user-defined record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    /// Direct base type, if any.
    pub base: Option<String>,
    /// Own fields in declaration order (inherited ones excluded).
    pub fields: Vec<FieldDescriptor>,
    /// Opted in to cloning.
    pub cloneable: bool,
    /// Can be default-constructed (false for abstract types).
    pub constructible: bool,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            fields: Vec::new(),
            cloneable: false,
            constructible: true,
        }
    }

    /// Own field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef::dictionary(
            PrimitiveKind::String.into(),
            TypeRef::list(TypeRef::array(PrimitiveKind::I32.into(), 2)),
        );
        assert_eq!(ty.to_string(), "Dictionary<string, List<i32[,]>>");
        assert_eq!(TypeRef::array(TypeRef::named("A"), 1).to_string(), "A[]");
    }

    #[test]
    fn test_primitive_accepts() {
        assert!(PrimitiveKind::I32.accepts(&Value::I32(4)));
        assert!(!PrimitiveKind::I32.accepts(&Value::I64(4)));
        assert!(!PrimitiveKind::I32.accepts(&Value::Null));
        assert!(PrimitiveKind::String.accepts(&Value::Null));
        assert!(PrimitiveKind::Enum.accepts(&Value::U8(2)));
        assert!(PrimitiveKind::Enum.accepts(&PrimitiveKind::Enum.default_value()));
        assert!(!PrimitiveKind::Enum.accepts(&Value::str("Red")));
        assert!(!PrimitiveKind::Enum.accepts(&Value::Null));
    }
}
