// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! Process-wide clone registry: erased clones of derived types.

use replica::{registry, CloneObject, DeepClone, Error};
use std::any::Any;
use std::collections::HashMap;

#[derive(Debug, Default, PartialEq, DeepClone)]
struct Route {
    name: String,
    hops: Vec<u16>,
    weights: HashMap<String, f64>,
}

#[derive(Debug, Default, PartialEq, DeepClone)]
struct Unregistered {
    id: u8,
}

fn route() -> Route {
    Route {
        name: "edge".into(),
        hops: vec![1, 4, 9],
        weights: HashMap::from([("latency".to_string(), 0.5)]),
    }
}

#[test]
fn test_erased_clone_of_registered_type() {
    registry().register::<Route>();
    assert!(registry().is_registered::<Route>());
    assert!(registry()
        .type_names()
        .contains(&std::any::type_name::<Route>()));

    let source = route();
    let erased: &dyn Any = &source;
    let copy = registry().clone_any(erased).expect("registered");
    assert_eq!(copy.downcast_ref::<Route>(), Some(&source));
}

#[test]
fn test_erased_clone_into_existing_value() {
    registry().register::<Route>();
    let source = route();
    let mut target = Route {
        hops: Vec::with_capacity(32),
        ..Route::default()
    };
    let buffer = target.hops.as_ptr();

    registry()
        .clone_any_into(&source, &mut target)
        .expect("same type");
    assert_eq!(target, source);
    assert_eq!(target.hops.as_ptr(), buffer);

    let mut wrong = Unregistered::default();
    let err = registry().clone_any_into(&source, &mut wrong).unwrap_err();
    assert!(matches!(err, Error::TargetMismatch { .. }));
}

#[test]
fn test_unregistered_type_reports_its_name() {
    let err = registry().make(&Unregistered { id: 1 }).unwrap_err();
    match err {
        Error::NotCloneable { type_name } => assert!(type_name.ends_with("Unregistered")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_trait_objects_clone_without_registration() {
    let boxed: Box<dyn CloneObject> = Box::new(Unregistered { id: 3 });
    let copy = (*boxed).clone_object();
    assert_eq!(copy.downcast_ref::<Unregistered>(), Some(&Unregistered { id: 3 }));
}
