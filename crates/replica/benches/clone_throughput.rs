// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Bench size conversions
#![allow(clippy::cast_possible_wrap)] // Bench size conversions
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! Deep-clone throughput: derived code vs the interpreted engine
//!
//! Clones the same record shape both ways: a list of ints, a string map
//! and a polymorphic child.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use replica::dynamic::{CloneEngine, ObjectRef, PrimitiveKind, TypeDescriptorBuilder, TypeRegistry, Value};
use replica::{CloneObject, DeepClone};
use std::collections::HashMap;
use std::sync::Arc;

const SIZES: &[usize] = &[16, 256, 4096];

#[derive(Debug, Default, DeepClone)]
struct Child {
    id: i32,
    name: String,
}

#[derive(Debug, Default, DeepClone)]
struct FChild {
    #[replica(base)]
    base: Child,
    name_f: String,
}

#[derive(Debug, Default, DeepClone)]
struct Record {
    id: i32,
    ids: Vec<i32>,
    meta: HashMap<String, String>,
    child: Option<Box<dyn CloneObject>>,
}

fn record(len: usize) -> Record {
    Record {
        id: 1,
        ids: (0..len).map(|_| fastrand::i32(..)).collect(),
        meta: (0..8).map(|i| (format!("k{i}"), format!("v{i}"))).collect(),
        child: Some(Box::new(FChild {
            base: Child {
                id: 2,
                name: "child".into(),
            },
            name_f: "f".into(),
        })),
    }
}

fn engine() -> CloneEngine {
    let types = TypeRegistry::new();
    let registered = types.register_all([
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
        TypeDescriptorBuilder::new("Record")
            .field("id", PrimitiveKind::I32)
            .sequence_field("ids", PrimitiveKind::I32)
            .mapping_field("meta", PrimitiveKind::String, PrimitiveKind::String)
            .nested_field("child", "Child")
            .cloneable(true)
            .build(),
    ]);
    assert!(registered.is_ok());
    CloneEngine::new(Arc::new(types))
}

fn dynamic_record(engine: &CloneEngine, len: usize) -> ObjectRef {
    let child = engine.instantiate("FChild").expect("FChild");
    child.set("id", 2).expect("id");
    child.set("name", "child").expect("name");
    child.set("name_f", "f").expect("name_f");

    let obj = engine.instantiate("Record").expect("Record");
    obj.set("id", 1).expect("id");
    obj.set(
        "ids",
        Value::sequence((0..len).map(|_| Value::I32(fastrand::i32(..)))),
    )
    .expect("ids");
    obj.set(
        "meta",
        Value::mapping((0..8).map(|i| (Value::str(format!("k{i}")), Value::str(format!("v{i}"))))),
    )
    .expect("meta");
    obj.set("child", child).expect("child");
    obj
}

fn bench_derived(c: &mut Criterion) {
    let mut group = c.benchmark_group("derived");
    for &len in SIZES {
        let source = record(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("deep_clone", len), &source, |b, src| {
            b.iter(|| black_box(src.deep_clone()));
        });
        let mut target = record(len);
        group.bench_with_input(BenchmarkId::new("deep_clone_into", len), &source, |b, src| {
            b.iter(|| src.deep_clone_into(black_box(&mut target)));
        });
    }
    group.finish();
}

fn bench_interpreted(c: &mut Criterion) {
    let engine = engine();
    assert!(engine.prepare_all().is_ok());

    let mut group = c.benchmark_group("interpreted");
    for &len in SIZES {
        let source = dynamic_record(&engine, len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("clone", len), &source, |b, src| {
            b.iter(|| black_box(engine.clone(src).expect("clone")));
        });
        let target = engine.instantiate("Record").expect("Record");
        group.bench_with_input(BenchmarkId::new("clone_into", len), &source, |b, src| {
            b.iter(|| black_box(engine.clone_into(src, &target).expect("clone_into")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_derived, bench_interpreted);
criterion_main!(benches);
