// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interpreted deep cloning
//!
//! Clones values whose types are only known at runtime, from metadata held
//! in a [`TypeModel`].
//!
//! # Features
//!
//! - **TypeDescriptor**: record types with base types, ignored fields and a
//!   cloneable opt-in flag
//! - **Kind classification**: primitives, arrays, sequences, mappings, sets
//!   and nested objects
//! - **ClonePlan**: memoized per-type copy instructions
//! - **CloneEngine**: plans compiled to closures, cached per runtime type
//!
//! # Example
//!
//! ```rust
//! use replica::dynamic::{CloneEngine, PrimitiveKind, TypeDescriptorBuilder, TypeRegistry, Value};
//! use std::sync::Arc;
//!
//! let types = TypeRegistry::new();
//! types
//!     .register_all([
//!         TypeDescriptorBuilder::new("Child")
//!             .field("id", PrimitiveKind::I32)
//!             .cloneable(true)
//!             .build(),
//!         TypeDescriptorBuilder::new("FChild")
//!             .base("Child")
//!             .string_field("name_f")
//!             .cloneable(true)
//!             .build(),
//!     ])
//!     .unwrap();
//!
//! let engine = CloneEngine::new(Arc::new(types));
//! let child = engine.instantiate("FChild").unwrap();
//! child.set("id", 7).unwrap();
//! child.set("name_f", "first").unwrap();
//!
//! let copy = engine.clone(&child).unwrap();
//! assert_eq!(copy.type_name(), "FChild");
//! assert_eq!(copy.get("name_f"), Some(Value::str("first")));
//! ```

mod builder;
mod descriptor;
mod engine;
mod kind;
mod model;
mod plan;
mod routine;
mod value;

pub use builder::TypeDescriptorBuilder;
pub use descriptor::{FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeRef};
pub use engine::{CloneEngine, EngineStats};
pub use kind::{classify, Kind, MAPPING_TYPES, SEQUENCE_TYPES, SET_TYPES};
pub use model::{TypeModel, TypeRegistry};
pub use plan::{CloneStep, ClonePlan, FieldOp, PlanBuilder};
pub use routine::CloneRoutine;
pub use value::{ArrayValue, ObjectRef, Shared, Value};
