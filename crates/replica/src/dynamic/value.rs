// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance model of the interpreted backend.
//!
//! Scalars are stored inline. Arrays, sequences, mappings, sets and objects
//! are shared cells (`Arc<RwLock<_>>`), so reference identity is observable
//! with [`Value::ptr_eq`] and a clone can be told apart from its source.

use crate::{Error, Result};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared, interior-mutable cell.
pub type Shared<T> = Arc<RwLock<T>>;

fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

fn addr<T: ?Sized>(cell: &Arc<T>) -> *const () {
    Arc::as_ptr(cell).cast::<()>()
}

/// A dynamically typed value.
///
/// Equality and hashing compare scalars by value (floats by bit pattern)
/// and reference values by identity, which makes any value usable as a
/// mapping key. Use [`Value::deep_eq`] for structural comparison.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(Arc<str>),
    Opaque(Arc<dyn Any + Send + Sync>),
    Array(Shared<ArrayValue>),
    Sequence(Shared<Vec<Value>>),
    Mapping(Shared<HashMap<Value, Value>>),
    Set(Shared<HashSet<Value>>),
    Object(ObjectRef),
}

impl Value {
    pub fn str(text: impl AsRef<str>) -> Self {
        Self::Str(Arc::from(text.as_ref()))
    }

    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Arc::new(value))
    }

    pub fn array(array: ArrayValue) -> Self {
        Self::Array(shared(array))
    }

    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Sequence(shared(items.into_iter().collect()))
    }

    pub fn mapping(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::Mapping(shared(entries.into_iter().collect()))
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Set(shared(items.into_iter().collect()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value is a shared cell rather than a scalar.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::Opaque(_)
                | Self::Array(_)
                | Self::Sequence(_)
                | Self::Mapping(_)
                | Self::Set(_)
                | Self::Object(_)
        )
    }

    /// Both values are the very same reference.
    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Self::Opaque(a), Self::Opaque(b)) => addr(a) == addr(b),
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            (Self::Sequence(a), Self::Sequence(b)) => Arc::ptr_eq(a, b),
            (Self::Mapping(a), Self::Mapping(b)) => Arc::ptr_eq(a, b),
            (Self::Set(a), Self::Set(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Short name of the variant, used in mismatch reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Opaque(_) => "opaque",
            Self::Array(_) => "array",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Set(_) => "set",
            Self::Object(_) => "object",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Shared<ArrayValue>> {
        match self {
            Self::Array(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Shared<Vec<Value>>> {
        match self {
            Self::Sequence(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Shared<HashMap<Value, Value>>> {
        match self {
            Self::Mapping(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Shared<HashSet<Value>>> {
        match self {
            Self::Set(cell) => Some(cell),
            _ => None,
        }
    }

    /// Structural equality: containers and objects are compared by content.
    pub fn deep_eq(&self, other: &Value) -> bool {
        if Self::ptr_eq(self, other) {
            return true;
        }
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => {
                let (a, b) = (a.read(), b.read());
                a.lengths == b.lengths && all_deep_eq(&a.elements, &b.elements)
            }
            (Self::Sequence(a), Self::Sequence(b)) => all_deep_eq(&a.read(), &b.read()),
            (Self::Mapping(a), Self::Mapping(b)) => {
                let (a, b) = (a.read(), b.read());
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        if key.is_reference() {
                            b.iter()
                                .any(|(k, v)| key.deep_eq(k) && value.deep_eq(v))
                        } else {
                            b.get(key).is_some_and(|v| value.deep_eq(v))
                        }
                    })
            }
            (Self::Set(a), Self::Set(b)) => {
                let (a, b) = (a.read(), b.read());
                a.len() == b.len()
                    && a.iter().all(|item| {
                        if item.is_reference() {
                            b.iter().any(|other| item.deep_eq(other))
                        } else {
                            b.contains(item)
                        }
                    })
            }
            (Self::Object(a), Self::Object(b)) => a.deep_eq(b),
            _ => self == other,
        }
    }
}

fn all_deep_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_eq(y))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => Self::ptr_eq(self, other),
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::I8(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::U8(v) => v.hash(state),
            Self::U16(v) => v.hash(state),
            Self::U32(v) => v.hash(state),
            Self::U64(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::Char(v) => v.hash(state),
            Self::Str(v) => v.hash(state),
            Self::Opaque(v) => addr(v).hash(state),
            Self::Array(v) => addr(v).hash(state),
            Self::Sequence(v) => addr(v).hash(state),
            Self::Mapping(v) => addr(v).hash(state),
            Self::Set(v) => addr(v).hash(state),
            Self::Object(v) => addr(&v.0).hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::I8(v) => write!(f, "I8({v})"),
            Self::I16(v) => write!(f, "I16({v})"),
            Self::I32(v) => write!(f, "I32({v})"),
            Self::I64(v) => write!(f, "I64({v})"),
            Self::U8(v) => write!(f, "U8({v})"),
            Self::U16(v) => write!(f, "U16({v})"),
            Self::U32(v) => write!(f, "U32({v})"),
            Self::U64(v) => write!(f, "U64({v})"),
            Self::F32(v) => write!(f, "F32({v})"),
            Self::F64(v) => write!(f, "F64({v})"),
            Self::Char(v) => write!(f, "Char({v:?})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Opaque(v) => write!(f, "Opaque({:p})", addr(v)),
            Self::Array(v) => f.debug_tuple("Array").field(&v.read()).finish(),
            Self::Sequence(v) => f.debug_tuple("Sequence").field(&v.read()).finish(),
            Self::Mapping(v) => f.debug_tuple("Mapping").field(&v.read()).finish(),
            Self::Set(v) => f.debug_tuple("Set").field(&v.read()).finish(),
            Self::Object(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool => Bool, i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    f32 => F32, f64 => F64, char => Char,
    ObjectRef => Object,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::str(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<ArrayValue> for Value {
    fn from(v: ArrayValue) -> Self {
        Self::array(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Rectangular array of any rank, stored row-major.
///
/// Jagged arrays are rank-1 arrays whose elements are arrays.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    lengths: Vec<usize>,
    elements: Vec<Value>,
}

impl ArrayValue {
    /// Rank-1 array.
    pub fn new(elements: Vec<Value>) -> Self {
        Self {
            lengths: vec![elements.len()],
            elements,
        }
    }

    /// Array with explicit per-dimension lengths. `None` if `lengths` is
    /// empty or does not match the element count.
    pub fn with_shape(lengths: Vec<usize>, elements: Vec<Value>) -> Option<Self> {
        if lengths.is_empty() || lengths.iter().product::<usize>() != elements.len() {
            return None;
        }
        Some(Self { lengths, elements })
    }

    pub fn rank(&self) -> usize {
        self.lengths.len()
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    /// Element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<&Value> {
        if index.len() != self.lengths.len() {
            return None;
        }
        let mut flat = 0;
        for (i, len) in index.iter().zip(&self.lengths) {
            if i >= len {
                return None;
            }
            flat = flat * len + i;
        }
        self.elements.get(flat)
    }

    pub(crate) fn from_parts(lengths: Vec<usize>, elements: Vec<Value>) -> Self {
        debug_assert_eq!(lengths.iter().product::<usize>(), elements.len());
        Self { lengths, elements }
    }

    /// Overwrite the elements, keeping the shape.
    pub(crate) fn set_elements(&mut self, elements: Vec<Value>) {
        debug_assert_eq!(elements.len(), self.elements.len());
        self.elements = elements;
    }
}

struct ObjectCell {
    type_name: Arc<str>,
    names: Arc<[String]>,
    values: RwLock<Vec<Value>>,
}

/// Shared handle to an instance of a user-defined type.
///
/// The runtime type and the field layout are fixed at construction; field
/// values are interior-mutable.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

impl ObjectRef {
    /// Build an instance from `(field, value)` pairs in layout order.
    pub fn new(
        type_name: impl AsRef<str>,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        let (names, values): (Vec<String>, Vec<Value>) = fields.into_iter().unzip();
        Self::from_layout(Arc::from(type_name.as_ref()), names.into(), values)
    }

    pub(crate) fn from_layout(
        type_name: Arc<str>,
        names: Arc<[String]>,
        values: Vec<Value>,
    ) -> Self {
        Self(Arc::new(ObjectCell {
            type_name,
            names,
            values: RwLock::new(values),
        }))
    }

    /// Runtime type of the instance.
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    pub fn field_names(&self) -> &[String] {
        &self.0.names
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.names.iter().position(|n| n == name)
    }

    // Layout index, verified against the name.
    fn slot(&self, index: usize, name: &str) -> Option<usize> {
        match self.0.names.get(index) {
            Some(n) if n == name => Some(index),
            _ => self.position(name),
        }
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        let index = self.position(field)?;
        self.0.values.read().get(index).cloned()
    }

    pub fn set(&self, field: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.position(field).ok_or_else(|| Error::UnknownField {
            type_name: self.type_name().to_string(),
            field: field.to_string(),
        })?;
        if let Some(slot) = self.0.values.write().get_mut(index) {
            *slot = value.into();
        }
        Ok(())
    }

    pub(crate) fn read_slot(&self, index: usize, name: &str) -> Option<Value> {
        let index = self.slot(index, name)?;
        self.0.values.read().get(index).cloned()
    }

    pub(crate) fn write_slot(&self, index: usize, name: &str, value: Value) -> bool {
        let Some(index) = self.slot(index, name) else {
            return false;
        };
        match self.0.values.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Same runtime type and structurally equal field values.
    pub fn deep_eq(&self, other: &ObjectRef) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.0.type_name != other.0.type_name || self.0.names != other.0.names {
            return false;
        }
        let (a, b) = (self.0.values.read(), other.0.values.read());
        all_deep_eq(&a, &b)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(&self.0.type_name);
        match self.0.values.try_read() {
            Some(values) => {
                for (name, value) in self.0.names.iter().zip(values.iter()) {
                    out.field(name, value);
                }
            }
            None => {
                out.field("values", &"<locked>");
            }
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_identity_vs_structure() {
        let a = Value::sequence([Value::I32(1), Value::I32(2)]);
        let b = Value::sequence([Value::I32(1), Value::I32(2)]);
        assert_ne!(a, b);
        assert!(a.deep_eq(&b));
        assert!(Value::ptr_eq(&a, &a.clone()));
    }

    #[test]
    fn test_float_keys_hash_by_bits() {
        let map = Value::mapping([(Value::F64(f64::NAN), Value::str("nan"))]);
        let cell = map.as_mapping().expect("mapping");
        assert_eq!(cell.read().get(&Value::F64(f64::NAN)), Some(&Value::str("nan")));
    }

    #[test]
    fn test_array_shape() {
        let grid = ArrayValue::with_shape(
            vec![2, 2],
            vec![Value::I32(1), Value::I32(1), Value::I32(2), Value::I32(2)],
        )
        .expect("2x2");
        assert_eq!(grid.rank(), 2);
        assert_eq!(grid.get(&[1, 0]), Some(&Value::I32(2)));
        assert_eq!(grid.get(&[2, 0]), None);
        assert!(ArrayValue::with_shape(vec![3], vec![Value::Null]).is_none());
    }

    #[test]
    fn test_object_fields() {
        let obj = ObjectRef::new(
            "Child",
            [("id".to_string(), Value::I32(1)), ("name".to_string(), Value::Null)],
        );
        obj.set("name", "first").expect("set name");
        assert_eq!(obj.get("name"), Some(Value::str("first")));
        assert!(matches!(
            obj.set("missing", 1),
            Err(Error::UnknownField { .. })
        ));
        assert_eq!(obj.read_slot(5, "id"), Some(Value::I32(1)));
    }
}
