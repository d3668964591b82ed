// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type metadata source for the interpreted backend.
//!
//! [`TypeModel`] is the read-only view the plan builder works from. Only
//! [`TypeModel::descriptor`] and [`TypeModel::type_names`] are required; the
//! rest derive from descriptors. [`TypeRegistry`] is the concurrent
//! in-memory implementation, populated once at startup.

use crate::dynamic::{FieldDescriptor, ObjectRef, TypeDescriptor, TypeRef, Value};
use crate::{Error, Result};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Read-only per-type metadata.
pub trait TypeModel: Send + Sync {
    /// Descriptor of a user-defined type.
    fn descriptor(&self, name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Names of every known type.
    fn type_names(&self) -> Vec<String>;

    /// All fields of `name`, inherited included, base-to-derived.
    fn fields(&self, name: &str) -> Result<Vec<FieldDescriptor>> {
        let chain = self.ancestry(name)?;
        Ok(chain
            .iter()
            .rev()
            .flat_map(|desc| desc.fields.iter().cloned())
            .collect())
    }

    /// `name` followed by its ancestors, nearest first.
    fn ancestry(&self, name: &str) -> Result<Vec<Arc<TypeDescriptor>>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name.to_string());
        while let Some(type_name) = current {
            if !seen.insert(type_name.clone()) {
                return Err(Error::malformed(name, "inheritance cycle"));
            }
            let desc = match self.descriptor(&type_name) {
                Some(desc) => desc,
                None if type_name == name => return Err(Error::UnknownType(type_name)),
                None => {
                    return Err(Error::malformed(
                        name,
                        format!("base type `{type_name}` is not registered"),
                    ))
                }
            };
            current = desc.base.clone();
            chain.push(desc);
        }
        Ok(chain)
    }

    fn base_type(&self, name: &str) -> Option<String> {
        self.descriptor(name)?.base.clone()
    }

    fn is_cloneable(&self, name: &str) -> bool {
        self.descriptor(name).is_some_and(|desc| desc.cloneable)
    }

    fn is_ignored(&self, field: &FieldDescriptor) -> bool {
        field.ignored
    }

    /// Type arguments of a generic, or the element type of an array.
    fn generic_arguments(&self, ty: &TypeRef) -> Vec<TypeRef> {
        match ty {
            TypeRef::Generic { args, .. } => args.clone(),
            TypeRef::Array { element, .. } => vec![(**element).clone()],
            _ => Vec::new(),
        }
    }

    /// New instance of `name` with every field, inherited included, at its
    /// default.
    fn default_object(&self, name: &str) -> Result<ObjectRef> {
        let desc = self
            .descriptor(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))?;
        if !desc.constructible {
            return Err(Error::malformed(name, "abstract type cannot be instantiated"));
        }
        let fields = self.fields(name)?;
        let values: Vec<Value> = fields.iter().map(|f| f.ty.default_value()).collect();
        let names: Vec<String> = fields.into_iter().map(|f| f.name).collect();
        Ok(ObjectRef::from_layout(
            Arc::from(desc.name.as_str()),
            names.into(),
            values,
        ))
    }
}

/// Concurrent [`TypeModel`] backed by a `DashMap`.
///
/// # Example
///
/// ```rust
/// use replica::dynamic::{PrimitiveKind, TypeDescriptorBuilder, TypeModel, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// registry
///     .register(
///         TypeDescriptorBuilder::new("Child")
///             .field("id", PrimitiveKind::I32)
///             .cloneable(true)
///             .build(),
///     )
///     .unwrap();
///
/// assert!(registry.is_cloneable("Child"));
/// ```
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Names are unique and own field names must be
    /// distinct.
    pub fn register(&self, desc: TypeDescriptor) -> Result<()> {
        let mut names = HashSet::new();
        for field in &desc.fields {
            if !names.insert(field.name.as_str()) {
                return Err(Error::malformed(
                    &desc.name,
                    format!("field `{}` is declared twice", field.name),
                ));
            }
        }
        match self.types.entry(desc.name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::malformed(
                &desc.name,
                "type is already registered",
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                log::debug!(
                    "[replica::model] registered {} ({} fields, cloneable={})",
                    desc.name,
                    desc.fields.len(),
                    desc.cloneable
                );
                slot.insert(Arc::new(desc));
                Ok(())
            }
        }
    }

    /// Register several descriptors, stopping at the first failure.
    pub fn register_all(&self, descs: impl IntoIterator<Item = TypeDescriptor>) -> Result<()> {
        descs.into_iter().try_for_each(|desc| self.register(desc))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeModel for TypeRegistry {
    fn descriptor(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).map(|desc| Arc::clone(desc.value()))
    }

    fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|entry| entry.key().clone()).collect()
    }
}
