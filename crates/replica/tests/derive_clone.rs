// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::items_after_statements)] // Test helpers
#![allow(clippy::too_many_lines)] // Example/test code

//! `#[derive(DeepClone)]` end-to-end tests
//!
//! Validates independence, field fidelity, ignored fields, polymorphic
//! slots, null propagation and in-place re-cloning on derived types.

use replica::{CloneObject, DeepClone};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq, DeepClone)]
struct Child {
    id: i32,
    name: String,
}

#[derive(Debug, Default, Clone, PartialEq, DeepClone)]
struct FChild {
    #[replica(base)]
    base: Child,
    name_f: String,
}

#[derive(Debug, Default, Clone, PartialEq, DeepClone)]
struct MChild {
    #[replica(base)]
    base: Child,
    name_m: String,
}

#[derive(Debug, Default, DeepClone)]
struct A {
    id: i32,
    ints: Vec<i32>,
    list_of_list: Vec<Vec<i32>>,
    meta: HashMap<String, String>,
    meta_meta: HashMap<String, HashMap<String, String>>,
    id_map: BTreeMap<i32, Child>,
    child: Option<Box<dyn CloneObject>>,
    children: Vec<Box<dyn CloneObject>>,
    grid: [[i32; 2]; 2],
    jagged: Box<[Box<[i32]>]>,
    tags: HashSet<String>,
    #[replica(ignore)]
    scratch: Vec<u8>,
}

fn f_child(id: i32) -> FChild {
    FChild {
        base: Child {
            id,
            name: format!("child-{id}"),
        },
        name_f: "f".into(),
    }
}

fn m_child(id: i32) -> MChild {
    MChild {
        base: Child {
            id,
            name: format!("child-{id}"),
        },
        name_m: "m".into(),
    }
}

fn sample() -> A {
    let mut meta_meta = HashMap::new();
    meta_meta.insert(
        "outer".to_string(),
        HashMap::from([("inner".to_string(), "x".to_string())]),
    );
    A {
        id: 1,
        ints: vec![1, 2, 3],
        list_of_list: vec![vec![1], vec![2, 2]],
        meta: HashMap::from([("k".to_string(), "v".to_string())]),
        meta_meta,
        id_map: BTreeMap::from([(5, f_child(5).base)]),
        child: Some(Box::new(f_child(1))),
        children: vec![Box::new(f_child(2)), Box::new(m_child(3))],
        grid: [[1, 1], [2, 2]],
        jagged: vec![vec![1, 1].into_boxed_slice(), vec![2, 2].into_boxed_slice()]
            .into_boxed_slice(),
        tags: HashSet::from(["red".to_string(), "blue".to_string()]),
        scratch: vec![0xFF; 4],
    }
}

#[test]
fn test_sequence_and_mapping_are_independent() {
    let source = sample();
    let mut copy = source.deep_clone();

    assert_eq!(copy.id, 1);
    assert_eq!(copy.ints, vec![1, 2, 3]);
    assert_eq!(copy.meta, source.meta);
    assert_eq!(copy.meta_meta, source.meta_meta);
    assert_eq!(copy.id_map, source.id_map);
    assert_eq!(copy.list_of_list, source.list_of_list);
    assert_eq!(copy.tags, source.tags);
    assert_ne!(copy.ints.as_ptr(), source.ints.as_ptr());

    copy.ints.push(4);
    copy.list_of_list[0].push(9);
    copy.meta.insert("extra".into(), "y".into());
    copy.meta_meta
        .get_mut("outer")
        .expect("outer")
        .insert("more".into(), "z".into());

    assert_eq!(source.ints, vec![1, 2, 3]);
    assert_eq!(source.list_of_list, vec![vec![1], vec![2, 2]]);
    assert_eq!(source.meta.len(), 1);
    assert_eq!(source.meta_meta["outer"].len(), 1);
}

#[test]
fn test_ignored_field_is_default() {
    let source = sample();
    let copy = source.deep_clone();
    assert!(copy.scratch.is_empty());
    assert_eq!(source.scratch.len(), 4);
}

#[test]
fn test_polymorphic_slots_keep_concrete_type() {
    let source = sample();
    let copy = source.deep_clone();

    let first = copy.children[0]
        .downcast_ref::<FChild>()
        .expect("FChild survives");
    assert_eq!(first, &f_child(2));
    let second = copy.children[1]
        .downcast_ref::<MChild>()
        .expect("MChild survives");
    assert_eq!(second.name_m, "m");
    assert_eq!(second.base.id, 3);

    let child = copy.child.as_ref().expect("child present");
    assert!(child.is::<FChild>());
    assert_eq!((**child).type_name(), std::any::type_name::<FChild>());
}

#[test]
fn test_base_fields_are_cloned() {
    let source = f_child(7);
    let mut copy = source.deep_clone();
    assert_eq!(copy, source);
    copy.base.name.push_str("-changed");
    assert_eq!(source.base.name, "child-7");
}

#[test]
fn test_none_propagates() {
    let mut source = sample();
    source.child = None;
    let copy = source.deep_clone();
    assert!(copy.child.is_none());
}

#[test]
fn test_reclone_is_idempotent() {
    let source = sample();
    let once = source.deep_clone();
    let twice = once.deep_clone();

    assert_eq!(twice.ints, once.ints);
    assert_eq!(twice.meta, once.meta);
    assert_eq!(twice.grid, once.grid);
    assert_eq!(twice.jagged, once.jagged);
    assert_eq!(
        twice.children[1].downcast_ref::<MChild>(),
        once.children[1].downcast_ref::<MChild>()
    );
}

#[test]
fn test_jagged_array_is_independent() {
    let source = sample();
    let mut copy = source.deep_clone();
    assert_eq!(copy.jagged.len(), 2);
    assert_eq!(&*copy.jagged[0], &[1, 1]);
    assert_eq!(&*copy.jagged[1], &[2, 2]);

    copy.jagged[0][0] = 7;
    copy.grid[1][1] = 9;
    assert_eq!(&*source.jagged[0], &[1, 1]);
    assert_eq!(source.grid, [[1, 1], [2, 2]]);
}

#[test]
fn test_deep_clone_into_reuses_allocations() {
    let source = sample();
    let mut target = A {
        ints: Vec::with_capacity(16),
        children: vec![Box::new(f_child(0))],
        scratch: vec![1, 2],
        ..A::default()
    };
    let ints_buffer = target.ints.as_ptr();
    let first_child = target.children[0]
        .downcast_ref::<FChild>()
        .map(|c| c as *const FChild)
        .expect("FChild");

    source.deep_clone_into(&mut target);

    assert_eq!(target.ints, source.ints);
    assert_eq!(target.ints.as_ptr(), ints_buffer);
    assert_eq!(target.children.len(), 2);
    let reused = target.children[0]
        .downcast_ref::<FChild>()
        .map(|c| c as *const FChild)
        .expect("FChild");
    assert_eq!(reused, first_child);
    assert_eq!(target.children[0].downcast_ref::<FChild>(), Some(&f_child(2)));
    assert!(target.children[1].is::<MChild>());
    // ignored fields are left alone
    assert_eq!(target.scratch, vec![1, 2]);
}

#[test]
fn test_deep_clone_into_replaces_mismatched_trait_object() {
    let source = sample();
    let mut target = A {
        children: vec![Box::new(m_child(0)), Box::new(m_child(1)), Box::new(m_child(2))],
        child: None,
        ..A::default()
    };

    source.deep_clone_into(&mut target);

    assert_eq!(target.children.len(), 2);
    assert!(target.children[0].is::<FChild>());
    assert!(target.children[1].is::<MChild>());
    assert!(target.child.as_ref().is_some_and(|c| c.is::<FChild>()));
}

#[test]
fn test_whole_record_through_trait_object() {
    let boxed: Box<dyn CloneObject> = Box::new(sample());
    let copy = boxed.deep_clone();
    let a = copy.downcast_ref::<A>().expect("A");
    assert_eq!(a.ints, vec![1, 2, 3]);
    assert!(a.scratch.is_empty());
}

#[derive(Debug, Default, PartialEq, DeepClone)]
struct Holder<T> {
    items: Vec<T>,
    label: Option<String>,
}

#[test]
fn test_generic_struct() {
    let source = Holder {
        items: vec![f_child(1), f_child(2)],
        label: Some("pair".into()),
    };
    let copy = source.deep_clone();
    assert_eq!(copy, source);
}

#[derive(Debug, DeepClone)]
struct Pointers {
    shared: Arc<Vec<i32>>,
    local: Rc<String>,
    boxed: Box<Child>,
    queue: VecDeque<Child>,
    ordered: BTreeSet<i64>,
    #[replica(primitive)]
    pair: (i32, i32),
}

#[test]
fn test_pointer_wrappers_get_fresh_allocations() {
    let source = Pointers {
        shared: Arc::new(vec![1, 2]),
        local: Rc::new("text".into()),
        boxed: Box::new(Child {
            id: 4,
            name: "boxed".into(),
        }),
        queue: VecDeque::from([Child::default()]),
        ordered: BTreeSet::from([3, 1, 2]),
        pair: (1, 2),
    };
    let copy = source.deep_clone();

    assert!(!Arc::ptr_eq(&copy.shared, &source.shared));
    assert_eq!(copy.shared, source.shared);
    assert!(!Rc::ptr_eq(&copy.local, &source.local));
    assert_eq!(copy.boxed, source.boxed);
    assert_eq!(copy.queue, source.queue);
    assert_eq!(copy.ordered.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(copy.pair, (1, 2));
}

#[derive(Debug, Default, PartialEq, DeepClone)]
struct Link {
    value: u32,
    next: Option<Box<Link>>,
}

#[test]
fn test_recursive_type_with_acyclic_instance() {
    let mut head = None;
    for value in 0..4 {
        head = Some(Box::new(Link { value, next: head }));
    }
    let source = Link { value: 99, next: head };
    let copy = source.deep_clone();
    assert_eq!(copy, source);
}

#[derive(Debug, PartialEq, DeepClone)]
enum Color {
    Red,
    Green,
    Blue = 7,
}

#[derive(Debug, PartialEq, DeepClone)]
enum Shape {
    Circle { radius: f64 },
    Poly(Vec<Child>, #[replica(ignore)] Vec<u8>),
    Empty,
}

#[derive(Debug, PartialEq, DeepClone)]
struct Sprite {
    color: Color,
    palette: Vec<Color>,
    shape: Shape,
    previous: Option<Shape>,
}

fn sprite() -> Sprite {
    Sprite {
        color: Color::Blue,
        palette: vec![Color::Red, Color::Green],
        shape: Shape::Poly(vec![f_child(1).base, f_child(2).base], vec![1, 2, 3]),
        previous: Some(Shape::Circle { radius: 1.5 }),
    }
}

#[test]
fn test_enum_fields_copy_by_value() {
    let source = sprite();
    let copy = source.deep_clone();

    assert_eq!(copy.color, Color::Blue);
    assert_eq!(copy.palette, vec![Color::Red, Color::Green]);
    assert_eq!(copy.previous, Some(Shape::Circle { radius: 1.5 }));
    match (&copy.shape, &source.shape) {
        (Shape::Poly(copied, scratch), Shape::Poly(original, _)) => {
            assert_eq!(copied, original);
            assert_ne!(copied.as_ptr(), original.as_ptr());
            assert!(scratch.is_empty());
        }
        other => panic!("variant changed: {other:?}"),
    }
    assert_eq!(Shape::Empty.deep_clone(), Shape::Empty);
}

#[test]
fn test_enum_deep_clone_into_same_and_other_variant() {
    let source = sprite();
    let mut target = Sprite {
        color: Color::Red,
        palette: Vec::new(),
        shape: Shape::Poly(Vec::with_capacity(8), vec![9]),
        previous: Some(Shape::Empty),
    };
    let buffer = match &target.shape {
        Shape::Poly(children, _) => children.as_ptr(),
        _ => unreachable!(),
    };

    source.deep_clone_into(&mut target);

    assert_eq!(target.color, Color::Blue);
    assert_eq!(target.previous, source.previous);
    match &target.shape {
        Shape::Poly(children, scratch) => {
            assert_eq!(children.len(), 2);
            assert_eq!(children.as_ptr(), buffer);
            // ignored fields of a matching variant are left alone
            assert_eq!(scratch, &vec![9]);
        }
        other => panic!("variant changed: {other:?}"),
    }
}
