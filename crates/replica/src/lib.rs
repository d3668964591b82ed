// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # replica - type-directed deep cloning
//!
//! Produces fully independent deep copies of record-like values without
//! hand-written per-type code. Two backends share one clone plan model:
//!
//! - **Ahead-of-time**: `#[derive(DeepClone)]` classifies every field once at
//!   compile time and emits dedicated copy code. Polymorphic slots hold
//!   `Box<dyn CloneObject>` and clone through the concrete type's vtable.
//! - **Interpreted**: [`dynamic::CloneEngine`] builds a [`dynamic::ClonePlan`]
//!   per runtime type from a [`dynamic::TypeModel`], compiles it to closures
//!   and caches the result.
//!
//! ## Quick Start
//!
//! ```rust
//! use replica::DeepClone;
//! use std::collections::HashMap;
//!
//! #[derive(Debug, Default, PartialEq, DeepClone)]
//! struct Record {
//!     ids: Vec<i32>,
//!     meta: HashMap<String, String>,
//!     #[replica(ignore)]
//!     scratch: Vec<u8>,
//! }
//!
//! let source = Record {
//!     ids: vec![1, 2, 3],
//!     meta: HashMap::from([("k".to_string(), "v".to_string())]),
//!     scratch: vec![0xFF],
//! };
//!
//! let mut copy = source.deep_clone();
//! copy.ids.push(4);
//!
//! assert_eq!(source.ids, vec![1, 2, 3]);
//! assert_eq!(copy.meta, source.meta);
//! assert!(copy.scratch.is_empty());
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DeepClone`] | Compile-time clone capability (derive or std impls) |
//! | [`CloneObject`] | Object-safe form for polymorphic `Box<dyn CloneObject>` slots |
//! | [`CloneRegistry`] | `TypeId` keyed capability registry for `dyn Any` values |
//! | [`dynamic::CloneEngine`] | Interpreted engine with a per-runtime-type dispatch cache |
//!
//! ## Limitations
//!
//! Shared identity is not preserved: two fields pointing at one object
//! produce two independent copies. Cyclic instance graphs are not detected
//! and recurse without bound.

// Allow the derive macro to work inside this crate's tests
extern crate self as replica;

/// Interpreted engine configuration.
pub mod config;
mod deep;
/// Structured reports for unsupported field types.
pub mod diagnostics;
/// Interpreted backend: type model, plans, dispatch cache.
pub mod dynamic;
mod error;
/// `TypeId` keyed clone capability registry.
pub mod registry;

pub use config::EngineConfig;
pub use deep::{CloneObject, DeepClone};
pub use error::{Error, Result};
pub use registry::{registry, CloneRegistry};

// Derive macro (for #[derive(replica::DeepClone)])
pub use replica_codegen::DeepClone;
