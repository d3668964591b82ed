// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Explicit clone capability registry keyed by `TypeId`.
//!
//! Lets callers deep-clone values they only hold as `&dyn Any`. A type takes
//! part once registered (typically at startup); anything else is rejected
//! with [`Error::NotCloneable`].
//!
//! # Example
//!
//! ```rust
//! use replica::{registry, DeepClone};
//!
//! #[derive(Debug, Default, PartialEq, DeepClone)]
//! struct Settings {
//!     retries: u32,
//!     hosts: Vec<String>,
//! }
//!
//! registry().register::<Settings>();
//!
//! let source = Settings { retries: 3, hosts: vec!["a".into()] };
//! let copy = registry().make(&source).unwrap();
//! assert_eq!(copy, source);
//! ```

use crate::{DeepClone, Error, Result};
use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::sync::OnceLock;

type CloneFn = fn(&dyn Any) -> Option<Box<dyn Any + Send + Sync>>;
type CloneIntoFn = fn(&dyn Any, &mut dyn Any) -> bool;

/// Type-erased routines of one registered type.
#[derive(Clone, Copy)]
struct Entry {
    type_name: &'static str,
    clone: CloneFn,
    clone_into: CloneIntoFn,
}

fn clone_erased<T: DeepClone + Any + Send + Sync>(
    source: &dyn Any,
) -> Option<Box<dyn Any + Send + Sync>> {
    source
        .downcast_ref::<T>()
        .map(|value| Box::new(value.deep_clone()) as Box<dyn Any + Send + Sync>)
}

fn clone_into_erased<T: DeepClone + Any + Send + Sync>(
    source: &dyn Any,
    target: &mut dyn Any,
) -> bool {
    match (source.downcast_ref::<T>(), target.downcast_mut::<T>()) {
        (Some(source), Some(target)) => {
            source.deep_clone_into(target);
            true
        }
        _ => false,
    }
}

/// Concurrent registry of clone routines.
#[derive(Default)]
pub struct CloneRegistry {
    entries: DashMap<TypeId, Entry>,
}

impl CloneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`. Returns `false` if it was already registered.
    pub fn register<T: DeepClone + Any + Send + Sync>(&self) -> bool {
        let entry = Entry {
            type_name: type_name::<T>(),
            clone: clone_erased::<T>,
            clone_into: clone_into_erased::<T>,
        };
        let fresh = self.entries.insert(TypeId::of::<T>(), entry).is_none();
        if fresh {
            log::debug!("[replica::registry] registered {}", entry.type_name);
        }
        fresh
    }

    pub fn is_registered<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Registered type names, in no particular order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.value().type_name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: TypeId) -> Option<Entry> {
        self.entries.get(&id).map(|e| *e.value())
    }

    /// Deep-clone a value of any registered runtime type.
    pub fn clone_any(&self, source: &dyn Any) -> Result<Box<dyn Any + Send + Sync>> {
        let id = source.type_id();
        let entry = self
            .entry(id)
            .ok_or_else(|| Error::not_cloneable(format!("{id:?}")))?;
        (entry.clone)(source).ok_or_else(|| Error::not_cloneable(entry.type_name))
    }

    /// Deep-clone `source` into `target`; both must have the same runtime type.
    pub fn clone_any_into(&self, source: &dyn Any, target: &mut dyn Any) -> Result<()> {
        let id = source.type_id();
        let entry = self
            .entry(id)
            .ok_or_else(|| Error::not_cloneable(format!("{id:?}")))?;
        if (*target).type_id() != id {
            return Err(Error::TargetMismatch {
                source: entry.type_name.to_string(),
                target: format!("{:?}", (*target).type_id()),
            });
        }
        if (entry.clone_into)(source, target) {
            Ok(())
        } else {
            Err(Error::not_cloneable(entry.type_name))
        }
    }

    /// Typed entry point: deep-clone `source` if `T` is registered.
    pub fn make<T: Any>(&self, source: &T) -> Result<T> {
        let boxed = self.clone_any(source).map_err(|err| match err {
            Error::NotCloneable { .. } => Error::not_cloneable(type_name::<T>()),
            other => other,
        })?;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::not_cloneable(type_name::<T>()))
    }
}

impl std::fmt::Debug for CloneRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloneRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

static GLOBAL_REGISTRY: OnceLock<CloneRegistry> = OnceLock::new();

/// Process-wide registry.
pub fn registry() -> &'static CloneRegistry {
    GLOBAL_REGISTRY.get_or_init(CloneRegistry::new)
}
