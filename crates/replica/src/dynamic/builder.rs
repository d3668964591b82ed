// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::diagnostics::SourcePos;
use crate::dynamic::{FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeRef};

/// Builder for creating TypeDescriptor instances.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    desc: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    /// Create a new builder. Types are not cloneable until opted in.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            desc: TypeDescriptor::new(name),
        }
    }

    /// Add a primitive field.
    pub fn field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field_with_type(name, TypeRef::Primitive(kind))
    }

    /// Add a field of any declared type.
    pub fn field_with_type(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.desc.fields.push(FieldDescriptor::new(name, ty));
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String)
    }

    /// Add a `List<element>` field.
    pub fn sequence_field(self, name: impl Into<String>, element: impl Into<TypeRef>) -> Self {
        self.field_with_type(name, TypeRef::list(element.into()))
    }

    /// Add a `Dictionary<key, value>` field.
    pub fn mapping_field(
        self,
        name: impl Into<String>,
        key: impl Into<TypeRef>,
        value: impl Into<TypeRef>,
    ) -> Self {
        self.field_with_type(name, TypeRef::dictionary(key.into(), value.into()))
    }

    /// Add a `HashSet<element>` field.
    pub fn set_field(self, name: impl Into<String>, element: impl Into<TypeRef>) -> Self {
        self.field_with_type(name, TypeRef::set(element.into()))
    }

    /// Add an array field of the given rank.
    pub fn array_field(
        self,
        name: impl Into<String>,
        element: impl Into<TypeRef>,
        rank: usize,
    ) -> Self {
        self.field_with_type(name, TypeRef::array(element.into(), rank))
    }

    /// Add a field referencing another user-defined type.
    pub fn nested_field(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field_with_type(name, TypeRef::Named(type_name.into()))
    }

    /// Add a field excluded from cloning.
    pub fn ignored_field(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.desc
            .fields
            .push(FieldDescriptor::new(name, ty).ignored());
        self
    }

    /// Record the declaration site of the last added field.
    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        if let Some(field) = self.desc.fields.last_mut() {
            field.position = Some(SourcePos::new(file, line, column));
        }
        self
    }

    /// Set the direct base type.
    pub fn base(mut self, name: impl Into<String>) -> Self {
        self.desc.base = Some(name.into());
        self
    }

    /// Opt in to (or out of) cloning.
    pub fn cloneable(mut self, cloneable: bool) -> Self {
        self.desc.cloneable = cloneable;
        self
    }

    /// Mark the type abstract: it cannot be default-constructed.
    pub fn abstract_type(mut self) -> Self {
        self.desc.constructible = false;
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        self.desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_fields() {
        let desc = TypeDescriptorBuilder::new("A")
            .field("id", PrimitiveKind::I32)
            .sequence_field("ints", PrimitiveKind::I32)
            .mapping_field("meta", PrimitiveKind::String, PrimitiveKind::String)
            .nested_field("child", "Child")
            .at("model.rs", 10, 5)
            .ignored_field("cache", TypeRef::named("Cache"))
            .cloneable(true)
            .build();

        assert_eq!(desc.fields.len(), 5);
        assert!(desc.cloneable);
        assert!(desc.constructible);
        assert_eq!(
            desc.field("meta").map(|f| f.ty.to_string()).as_deref(),
            Some("Dictionary<string, string>")
        );
        let child = desc.field("child").expect("child");
        assert_eq!(child.position, Some(SourcePos::new("model.rs", 10, 5)));
        assert!(desc.field("cache").expect("cache").ignored);
    }

    #[test]
    fn test_not_cloneable_by_default() {
        let desc = TypeDescriptorBuilder::new("Plain").abstract_type().build();
        assert!(!desc.cloneable);
        assert!(!desc.constructible);
    }
}
