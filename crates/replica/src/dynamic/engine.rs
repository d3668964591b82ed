// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interpreted clone engine with a per-runtime-type dispatch cache.
//!
//! Routines are looked up by the runtime type name of the instance, so a
//! derived object held in a base-typed field clones as the derived type.
//! The cache is append-only: a routine is built on first use (or by
//! [`CloneEngine::prepare`]) and then shared by every thread.
//!
//! # Example
//!
//! ```rust
//! use replica::dynamic::{CloneEngine, PrimitiveKind, TypeDescriptorBuilder, TypeRegistry, Value};
//! use std::sync::Arc;
//!
//! let types = TypeRegistry::new();
//! types
//!     .register(
//!         TypeDescriptorBuilder::new("A")
//!             .sequence_field("ints", PrimitiveKind::I32)
//!             .cloneable(true)
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let engine = CloneEngine::new(Arc::new(types));
//! let source = engine.instantiate("A").unwrap();
//! source.set("ints", Value::sequence([Value::I32(1), Value::I32(2)])).unwrap();
//!
//! let copy = engine.clone(&source).unwrap();
//! assert!(copy.deep_eq(&source));
//! assert!(!Value::ptr_eq(&copy.get("ints").unwrap(), &source.get("ints").unwrap()));
//! ```

use crate::config::EngineConfig;
use crate::dynamic::{CloneRoutine, ClonePlan, ObjectRef, PlanBuilder, TypeModel, Value};
use crate::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Dispatch cache counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to build (or wait for) a routine.
    pub misses: u64,
    /// Routines compiled, including discarded duplicates.
    pub builds: u64,
    /// Duplicate routines dropped after losing a build race.
    pub discarded: u64,
    /// Routines currently cached.
    pub cached: usize,
}

/// Deep-clones [`ObjectRef`] instances described by a [`TypeModel`].
pub struct CloneEngine {
    plans: PlanBuilder,
    routines: DashMap<String, Arc<CloneRoutine>>,
    config: EngineConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    discarded: AtomicU64,
}

impl CloneEngine {
    pub fn new(model: Arc<dyn TypeModel>) -> Self {
        Self::with_config(model, EngineConfig::default())
    }

    pub fn with_config(model: Arc<dyn TypeModel>, config: EngineConfig) -> Self {
        Self {
            plans: PlanBuilder::new(model),
            routines: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model(&self) -> &Arc<dyn TypeModel> {
        self.plans.model()
    }

    /// Memoized plan of `name`.
    pub fn plan(&self, name: &str) -> Result<Arc<ClonePlan>> {
        self.plans.build(name)
    }

    /// Whether a routine for `name` is cached.
    pub fn is_prepared(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }

    /// Routine of runtime type `name`, built on first use.
    pub fn routine(&self, name: &str) -> Result<Arc<CloneRoutine>> {
        if let Some(routine) = self.routines.get(name) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("[replica::engine] cache hit for {}", name);
            return Ok(Arc::clone(routine.value()));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // No cache guard is held while building: the base routine goes
        // through this same path.
        let plan = self.plans.build(name)?;
        let base = match plan.base() {
            Some(base) => Some(self.routine(base)?),
            None => None,
        };
        let routine = Arc::new(CloneRoutine::compile(&plan, base, &self.config));
        self.builds.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "[replica::engine] compiled routine for {} ({} fields, base={:?})",
            name,
            routine.field_count(),
            plan.base()
        );

        match self.routines.entry(name.to_string()) {
            Entry::Occupied(existing) => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "[replica::engine] discarded duplicate routine for {} (lost build race)",
                    name
                );
                Ok(Arc::clone(existing.get()))
            }
            Entry::Vacant(slot) => Ok(Arc::clone(slot.insert(routine).value())),
        }
    }

    /// Routine of the runtime type of `obj`. A type missing from the model
    /// has not opted in.
    fn runtime_routine(&self, obj: &ObjectRef) -> Result<Arc<CloneRoutine>> {
        let name = obj.type_name();
        if !self.routines.contains_key(name) && self.model().descriptor(name).is_none() {
            return Err(Error::not_cloneable(name));
        }
        self.routine(name)
    }

    /// Build the routine of `name` now so plan errors surface up front.
    pub fn prepare(&self, name: &str) -> Result<()> {
        self.routine(name).map(|_| ())
    }

    /// Prepare every cloneable type of the model. Returns how many routines
    /// are ready; stops at the first failure.
    pub fn prepare_all(&self) -> Result<usize> {
        let model = Arc::clone(self.model());
        let mut names: Vec<String> = model
            .type_names()
            .into_iter()
            .filter(|name| model.is_cloneable(name))
            .collect();
        names.sort();
        for name in &names {
            self.prepare(name)?;
        }
        log::debug!("[replica::engine] prepared {} routines", names.len());
        Ok(names.len())
    }

    /// Default-constructed instance of `name`.
    pub fn instantiate(&self, name: &str) -> Result<ObjectRef> {
        self.model().default_object(name)
    }

    /// Deep copy of `source`, of the same runtime type. Fails with
    /// [`Error::NotCloneable`] when the runtime type is not in the model or
    /// has not opted in.
    pub fn clone(&self, source: &ObjectRef) -> Result<ObjectRef> {
        let routine = self.runtime_routine(source)?;
        let target = self.instantiate(source.type_name())?;
        routine.apply(source, &target, self)?;
        Ok(target)
    }

    /// Deep-copy `source` into `target`, which must have the same runtime
    /// type. Ignored fields of `target` are left untouched. Cloning an
    /// object into itself does nothing.
    ///
    /// On error no field slot of `target` is reassigned. With target reuse
    /// enabled, containers and nested objects already repopulated in place
    /// before the failing field keep their new contents.
    pub fn clone_into(&self, source: &ObjectRef, target: &ObjectRef) -> Result<ObjectRef> {
        if source.ptr_eq(target) {
            return Ok(target.clone());
        }
        if source.type_name() != target.type_name() {
            return Err(Error::TargetMismatch {
                source: source.type_name().to_string(),
                target: target.type_name().to_string(),
            });
        }
        let routine = self.runtime_routine(source)?;
        routine.apply(source, target, self)?;
        Ok(target.clone())
    }

    /// Clone an untyped value: `Null` stays `Null`, objects are cloned.
    /// Other values carry no declared type to clone by.
    pub fn clone_value(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Object(obj) => self.clone(obj).map(Value::Object),
            other => Err(Error::ValueMismatch {
                type_name: "<root>".to_string(),
                field: "<value>".to_string(),
                expected: "object or null".to_string(),
                found: other.kind_name(),
            }),
        }
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            cached: self.routines.len(),
        }
    }
}

impl std::fmt::Debug for CloneEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloneEngine")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
