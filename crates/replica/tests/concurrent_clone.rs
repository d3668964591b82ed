// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test index conversions
#![allow(clippy::cast_possible_wrap)] // Test index conversions
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! Concurrent first use of the clone engine and registry
//!
//! Many threads hit an empty dispatch cache at once; each type must end up
//! with exactly one cached routine and every clone must be correct.

use replica::dynamic::{
    CloneEngine, PrimitiveKind, TypeDescriptorBuilder, TypeRef, TypeRegistry, Value,
};
use replica::{CloneRegistry, DeepClone};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const ROUNDS: usize = 50;

fn model() -> Arc<TypeRegistry> {
    let types = TypeRegistry::new();
    types
        .register_all([
            TypeDescriptorBuilder::new("Child")
                .field("id", PrimitiveKind::I32)
                .string_field("name")
                .cloneable(true)
                .build(),
            TypeDescriptorBuilder::new("FChild")
                .base("Child")
                .string_field("name_f")
                .cloneable(true)
                .build(),
            TypeDescriptorBuilder::new("A")
                .field("id", PrimitiveKind::I32)
                .sequence_field("ints", PrimitiveKind::I32)
                .mapping_field("meta", PrimitiveKind::String, PrimitiveKind::String)
                .nested_field("child", "Child")
                .field_with_type("children", TypeRef::list(TypeRef::named("Child")))
                .cloneable(true)
                .build(),
        ])
        .expect("model registers");
    Arc::new(types)
}

fn sample(engine: &CloneEngine, seed: i32) -> replica::dynamic::ObjectRef {
    let child = engine.instantiate("FChild").expect("FChild");
    child.set("id", seed).expect("id");
    child.set("name", format!("child-{seed}")).expect("name");
    child.set("name_f", "f").expect("name_f");

    let a = engine.instantiate("A").expect("A");
    a.set("id", seed).expect("id");
    let ints: Vec<Value> = (0..8).map(|_| Value::I32(fastrand::i32(..))).collect();
    a.set("ints", Value::sequence(ints)).expect("ints");
    a.set(
        "meta",
        Value::mapping([(Value::str("k"), Value::str(format!("v{seed}")))]),
    )
    .expect("meta");
    a.set("child", child.clone()).expect("child");
    a.set("children", Value::sequence([Value::Object(child)]))
        .expect("children");
    a
}

#[test]
fn test_concurrent_first_use_caches_one_routine_per_type() {
    let engine = CloneEngine::new(model());

    thread::scope(|scope| {
        for t in 0..THREADS {
            let engine = &engine;
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    let source = sample(engine, (t * ROUNDS + round) as i32);
                    let copy = engine.clone(&source).expect("clone");
                    assert!(copy.deep_eq(&source));
                    assert!(!copy.ptr_eq(&source));

                    let child = copy.get("child").expect("child");
                    let child = child.as_object().expect("object");
                    assert_eq!(child.type_name(), "FChild");
                }
            });
        }
    });

    let stats = engine.stats();
    // A, FChild and the Child base of FChild
    assert_eq!(stats.cached, 3);
    assert_eq!(stats.builds - stats.discarded, 3);
    assert!(stats.hits > 0);
}

#[test]
fn test_concurrent_clone_into_distinct_targets() {
    let engine = CloneEngine::new(model());
    let source = sample(&engine, 42);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let engine = &engine;
            let source = &source;
            scope.spawn(move || {
                let target = engine.instantiate("A").expect("A");
                for _ in 0..ROUNDS {
                    engine.clone_into(source, &target).expect("clone_into");
                    assert!(target.deep_eq(source));
                }
            });
        }
    });
    assert_eq!(engine.stats().cached, 3);
}

#[derive(Debug, Default, PartialEq, DeepClone)]
struct Frame {
    seq: u64,
    payload: Vec<u8>,
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = CloneRegistry::new();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let registry = &registry;
            scope.spawn(move || {
                registry.register::<Frame>();
                let frame = Frame {
                    seq: t as u64,
                    payload: vec![t as u8; 16],
                };
                let copy = registry.make(&frame).expect("registered");
                assert_eq!(copy, frame);
            });
        }
    });

    assert_eq!(registry.len(), 1);
}
