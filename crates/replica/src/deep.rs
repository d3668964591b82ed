// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compile-time clone capability.
//!
//! [`DeepClone`] is implemented by `#[derive(DeepClone)]` for user structs and
//! here for the std types the derive knows how to lower. [`CloneObject`] is
//! the object-safe face of the same capability: a `Box<dyn CloneObject>`
//! clones through the vtable of the concrete value, so a derived record held
//! in a base-typed slot keeps all of its fields.

use crate::{Error, Result};
use std::any::{type_name, Any};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::ffi::OsString;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// A type whose values can be copied into fully independent instances.
pub trait DeepClone: Sized {
    /// Return a deep copy of `self`.
    fn deep_clone(&self) -> Self;

    /// Overwrite `target` with a deep copy of `self`, reusing the
    /// allocations `target` already owns where possible.
    fn deep_clone_into(&self, target: &mut Self) {
        *target = self.deep_clone();
    }
}

macro_rules! impl_deep_clone_by_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepClone for $ty {
                #[inline]
                fn deep_clone(&self) -> Self {
                    self.clone()
                }

                #[inline]
                fn deep_clone_into(&self, target: &mut Self) {
                    target.clone_from(self);
                }
            }
        )*
    };
}

impl_deep_clone_by_clone!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, (),
    String, &'static str, Box<str>, Rc<str>, Arc<str>, PathBuf, OsString, Duration, Instant,
    SystemTime,
);

impl<T: ?Sized> DeepClone for PhantomData<T> {
    fn deep_clone(&self) -> Self {
        PhantomData
    }
}

impl<T: DeepClone> DeepClone for Option<T> {
    fn deep_clone(&self) -> Self {
        self.as_ref().map(DeepClone::deep_clone)
    }

    fn deep_clone_into(&self, target: &mut Self) {
        match (self, target) {
            (Some(src), Some(dst)) => src.deep_clone_into(dst),
            (src, slot) => *slot = src.deep_clone(),
        }
    }
}

impl<T: DeepClone> DeepClone for Box<T> {
    fn deep_clone(&self) -> Self {
        Box::new((**self).deep_clone())
    }

    fn deep_clone_into(&self, target: &mut Self) {
        (**self).deep_clone_into(&mut **target);
    }
}

impl<T: DeepClone> DeepClone for Rc<T> {
    fn deep_clone(&self) -> Self {
        Rc::new((**self).deep_clone())
    }
}

impl<T: DeepClone> DeepClone for Arc<T> {
    fn deep_clone(&self) -> Self {
        Arc::new((**self).deep_clone())
    }
}

impl<T: DeepClone, const N: usize> DeepClone for [T; N] {
    fn deep_clone(&self) -> Self {
        std::array::from_fn(|i| self[i].deep_clone())
    }

    fn deep_clone_into(&self, target: &mut Self) {
        for (src, dst) in self.iter().zip(target.iter_mut()) {
            src.deep_clone_into(dst);
        }
    }
}

impl<T: DeepClone> DeepClone for Box<[T]> {
    fn deep_clone(&self) -> Self {
        self.iter().map(DeepClone::deep_clone).collect()
    }

    fn deep_clone_into(&self, target: &mut Self) {
        if self.len() != target.len() {
            *target = self.deep_clone();
            return;
        }
        for (src, dst) in self.iter().zip(target.iter_mut()) {
            src.deep_clone_into(dst);
        }
    }
}

impl<T: DeepClone> DeepClone for Vec<T> {
    fn deep_clone(&self) -> Self {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.iter().map(DeepClone::deep_clone));
        out
    }

    fn deep_clone_into(&self, target: &mut Self) {
        target.truncate(self.len());
        let kept = target.len();
        for (src, dst) in self.iter().zip(target.iter_mut()) {
            src.deep_clone_into(dst);
        }
        target.extend(self[kept..].iter().map(DeepClone::deep_clone));
    }
}

impl<T: DeepClone> DeepClone for VecDeque<T> {
    fn deep_clone(&self) -> Self {
        let mut out = VecDeque::with_capacity(self.len());
        out.extend(self.iter().map(DeepClone::deep_clone));
        out
    }

    fn deep_clone_into(&self, target: &mut Self) {
        target.truncate(self.len());
        let kept = target.len();
        for (src, dst) in self.iter().zip(target.iter_mut()) {
            src.deep_clone_into(dst);
        }
        target.extend(self.iter().skip(kept).map(DeepClone::deep_clone));
    }
}

impl<K, V, S> DeepClone for HashMap<K, V, S>
where
    K: DeepClone + Eq + Hash,
    V: DeepClone,
    S: BuildHasher + Default,
{
    fn deep_clone(&self) -> Self {
        let mut out = HashMap::with_capacity_and_hasher(self.len(), S::default());
        for (key, value) in self {
            out.insert(key.deep_clone(), value.deep_clone());
        }
        out
    }

    fn deep_clone_into(&self, target: &mut Self) {
        target.clear();
        target.reserve(self.len());
        for (key, value) in self {
            target.insert(key.deep_clone(), value.deep_clone());
        }
    }
}

impl<K: DeepClone + Ord, V: DeepClone> DeepClone for BTreeMap<K, V> {
    fn deep_clone(&self) -> Self {
        self.iter()
            .map(|(key, value)| (key.deep_clone(), value.deep_clone()))
            .collect()
    }
}

impl<T, S> DeepClone for HashSet<T, S>
where
    T: DeepClone + Eq + Hash,
    S: BuildHasher + Default,
{
    fn deep_clone(&self) -> Self {
        let mut out = HashSet::with_capacity_and_hasher(self.len(), S::default());
        out.extend(self.iter().map(DeepClone::deep_clone));
        out
    }

    fn deep_clone_into(&self, target: &mut Self) {
        target.clear();
        target.extend(self.iter().map(DeepClone::deep_clone));
    }
}

impl<T: DeepClone + Ord> DeepClone for BTreeSet<T> {
    fn deep_clone(&self) -> Self {
        self.iter().map(DeepClone::deep_clone).collect()
    }
}

/// Object-safe clone capability, implemented for every `DeepClone` type.
///
/// Store polymorphic values as `Box<dyn CloneObject>`; cloning the box
/// produces a value of the same concrete type. Use the inherent
/// [`downcast_ref`](trait.CloneObject.html#method.downcast_ref) on the
/// boxed value (not `as_any` on the box itself) to get it back.
pub trait CloneObject: Any + Send + Sync {
    /// Deep copy into a new box of the same concrete type.
    fn clone_object(&self) -> Box<dyn CloneObject>;

    /// Deep copy into `target`, which must have the same concrete type.
    fn clone_object_into(&self, target: &mut dyn CloneObject) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T: DeepClone + Any + Send + Sync> CloneObject for T {
    fn clone_object(&self) -> Box<dyn CloneObject> {
        Box::new(self.deep_clone())
    }

    fn clone_object_into(&self, target: &mut dyn CloneObject) -> Result<()> {
        let target_name = target.type_name();
        match target.as_any_mut().downcast_mut::<T>() {
            Some(target) => {
                self.deep_clone_into(target);
                Ok(())
            }
            None => Err(Error::TargetMismatch {
                source: type_name::<T>().to_string(),
                target: target_name.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl dyn CloneObject {
    /// Whether the concrete type is `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl DeepClone for Box<dyn CloneObject> {
    fn deep_clone(&self) -> Self {
        // Explicit deref: the box itself is also a `CloneObject`.
        (**self).clone_object()
    }

    fn deep_clone_into(&self, target: &mut Self) {
        if (**self).clone_object_into(&mut **target).is_err() {
            *target = (**self).clone_object();
        }
    }
}

impl std::fmt::Debug for dyn CloneObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CloneObject({})", self.type_name())
    }
}
