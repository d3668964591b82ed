// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled clone routines.
//!
//! A [`ClonePlan`] is lowered once into a tree of closures, one per field,
//! so cloning never re-inspects the type model. Nested objects are the only
//! late-bound step: they go back through the engine's dispatch cache to
//! reach the routine of their runtime type.

use crate::config::EngineConfig;
use crate::diagnostics::UnsupportedField;
use crate::dynamic::value::Shared;
use crate::dynamic::{ArrayValue, ClonePlan, CloneEngine, Kind, ObjectRef, PrimitiveKind, Value};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Produces the new value of a slot from the source value and, when target
/// reuse applies, the value currently held by the target slot.
type Copier = Box<dyn Fn(&Value, Option<&Value>, &CloneEngine) -> Result<Value> + Send + Sync>;

/// Field being copied, for error reports.
#[derive(Clone)]
struct Site {
    type_name: Arc<str>,
    field: Arc<str>,
}

impl Site {
    fn mismatch(&self, expected: impl Into<String>, found: &Value) -> Error {
        Error::ValueMismatch {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            expected: expected.into(),
            found: found.kind_name(),
        }
    }
}

struct FieldCopier {
    field: String,
    index: usize,
    copy: Copier,
}

/// Clone routine bound to exactly one runtime type.
pub struct CloneRoutine {
    type_name: Arc<str>,
    base: Option<Arc<CloneRoutine>>,
    fields: Vec<FieldCopier>,
    reuse: bool,
}

impl CloneRoutine {
    /// Lower `plan`. `base` must be the routine of the plan's base step.
    pub(crate) fn compile(
        plan: &ClonePlan,
        base: Option<Arc<CloneRoutine>>,
        config: &EngineConfig,
    ) -> Self {
        let type_name: Arc<str> = Arc::from(plan.type_name.as_str());
        let fields = plan
            .field_ops()
            .map(|op| {
                let site = Site {
                    type_name: Arc::clone(&type_name),
                    field: Arc::from(op.field.as_str()),
                };
                FieldCopier {
                    field: op.field.clone(),
                    index: op.index,
                    copy: compile(&op.kind, &site, config),
                }
            })
            .collect();
        Self {
            type_name,
            base,
            fields,
            reuse: config.reuses_targets(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn base(&self) -> Option<&Arc<CloneRoutine>> {
        self.base.as_ref()
    }

    /// Fields copied by this routine, excluding those of its base.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Copy base fields, then own fields, from `source` into `target`.
    ///
    /// Every field is copied before any slot of `target` is assigned, so a
    /// failing field leaves all slots of `target` as they were.
    pub(crate) fn apply(
        &self,
        source: &ObjectRef,
        target: &ObjectRef,
        engine: &CloneEngine,
    ) -> Result<()> {
        let mut staged = Vec::new();
        self.stage(source, target, engine, &mut staged)?;
        for (field, copy) in staged {
            if !target.write_slot(field.index, &field.field, copy) {
                return Err(missing_field(target, &field.field));
            }
        }
        Ok(())
    }

    fn stage<'a>(
        &'a self,
        source: &ObjectRef,
        target: &ObjectRef,
        engine: &CloneEngine,
        staged: &mut Vec<(&'a FieldCopier, Value)>,
    ) -> Result<()> {
        if let Some(base) = &self.base {
            base.stage(source, target, engine, staged)?;
        }
        for field in &self.fields {
            let value = source
                .read_slot(field.index, &field.field)
                .ok_or_else(|| missing_field(source, &field.field))?;
            let existing = target
                .read_slot(field.index, &field.field)
                .ok_or_else(|| missing_field(target, &field.field))?;
            let reuse = self.reuse.then_some(&existing);
            let copy = (field.copy)(&value, reuse, engine)?;
            staged.push((field, copy));
        }
        Ok(())
    }
}

impl fmt::Debug for CloneRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloneRoutine")
            .field("type_name", &self.type_name)
            .field("base", &self.base.as_ref().map(|b| b.type_name()))
            .field(
                "fields",
                &self.fields.iter().map(|f| f.field.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn missing_field(obj: &ObjectRef, field: &str) -> Error {
    Error::UnknownField {
        type_name: obj.type_name().to_string(),
        field: field.to_string(),
    }
}

fn copier<F>(f: F) -> Copier
where
    F: Fn(&Value, Option<&Value>, &CloneEngine) -> Result<Value> + Send + Sync + 'static,
{
    Box::new(f)
}

fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

// Target slot to repopulate in place: present and not the source itself.
fn reusable<'a>(existing: Option<&'a Value>, source: &Value) -> Option<&'a Value> {
    existing.filter(|target| !Value::ptr_eq(target, source))
}

/// Element kind copied in bulk, when bulk copying applies.
fn bulk_kind(kind: &Kind, config: &EngineConfig) -> Option<PrimitiveKind> {
    match kind {
        Kind::Primitive(primitive) if config.bulk_copies_primitives() => Some(*primitive),
        _ => None,
    }
}

// Bulk copies skip the element copier, not its type check.
fn check_bulk<'a>(
    site: &Site,
    kind: PrimitiveKind,
    items: impl IntoIterator<Item = &'a Value>,
) -> Result<()> {
    match items.into_iter().find(|item| !kind.accepts(item)) {
        Some(item) => Err(site.mismatch(kind.name(), item)),
        None => Ok(()),
    }
}

fn copy_all(
    copy: &Copier,
    items: &[Value],
    old: Option<&[Value]>,
    engine: &CloneEngine,
) -> Result<Vec<Value>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| copy(item, old.and_then(|old| old.get(i)), engine))
        .collect()
}

fn compile(kind: &Kind, site: &Site, config: &EngineConfig) -> Copier {
    let site = site.clone();
    match kind {
        Kind::Primitive(primitive) => {
            let primitive = *primitive;
            copier(move |src, _, _| {
                if primitive.accepts(src) {
                    Ok(src.clone())
                } else {
                    Err(site.mismatch(primitive.name(), src))
                }
            })
        }

        Kind::Array { rank, element } => {
            let rank = *rank;
            let bulk_element = bulk_kind(element, config);
            let bulk = bulk_element.is_some();
            let element = compile(element, &site, config);
            copier(move |src, existing, engine| {
                let cell = match src {
                    Value::Null => return Ok(Value::Null),
                    Value::Array(cell) => cell,
                    other => return Err(site.mismatch(format!("array of rank {rank}"), other)),
                };
                let (lengths, items) = {
                    let array = cell.read();
                    if array.rank() != rank {
                        return Err(site.mismatch(format!("array of rank {rank}"), src));
                    }
                    (array.lengths().to_vec(), array.elements().to_vec())
                };
                if let Some(kind) = bulk_element {
                    check_bulk(&site, kind, &items)?;
                }

                if let Some((target, Value::Array(dst))) = reusable(existing, src).map(|t| (t, t)) {
                    let old = {
                        let array = dst.read();
                        (array.lengths() == lengths.as_slice()).then(|| array.elements().to_vec())
                    };
                    if let Some(old) = old {
                        let copied = if bulk {
                            items
                        } else {
                            copy_all(&element, &items, Some(old.as_slice()), engine)?
                        };
                        dst.write().set_elements(copied);
                        return Ok(target.clone());
                    }
                }

                let copied = if bulk {
                    items
                } else {
                    copy_all(&element, &items, None, engine)?
                };
                Ok(Value::array(ArrayValue::from_parts(lengths, copied)))
            })
        }

        Kind::Sequence(element) => {
            let bulk_element = bulk_kind(element, config);
            let bulk = bulk_element.is_some();
            let element = compile(element, &site, config);
            copier(move |src, existing, engine| {
                let items = match src {
                    Value::Null => return Ok(Value::Null),
                    Value::Sequence(cell) => cell.read().clone(),
                    other => return Err(site.mismatch("sequence", other)),
                };
                if let Some(kind) = bulk_element {
                    check_bulk(&site, kind, &items)?;
                }

                if let Some((target, Value::Sequence(dst))) = reusable(existing, src).map(|t| (t, t)) {
                    let old = dst.read().clone();
                    let copied = if bulk {
                        items
                    } else {
                        copy_all(&element, &items, Some(old.as_slice()), engine)?
                    };
                    let mut guard = dst.write();
                    guard.clear();
                    guard.extend(copied);
                    drop(guard);
                    return Ok(target.clone());
                }

                let copied = if bulk {
                    items
                } else {
                    copy_all(&element, &items, None, engine)?
                };
                Ok(Value::Sequence(shared(copied)))
            })
        }

        Kind::Mapping { key, value } => {
            let bulk_pair = bulk_kind(key, config).zip(bulk_kind(value, config));
            let key = compile(key, &site, config);
            let value = compile(value, &site, config);
            copier(move |src, existing, engine| {
                let pairs: Vec<(Value, Value)> = match src {
                    Value::Null => return Ok(Value::Null),
                    Value::Mapping(cell) => cell
                        .read()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                    other => return Err(site.mismatch("mapping", other)),
                };
                let copied = if let Some((key_kind, value_kind)) = bulk_pair {
                    check_bulk(&site, key_kind, pairs.iter().map(|(k, _)| k))?;
                    check_bulk(&site, value_kind, pairs.iter().map(|(_, v)| v))?;
                    pairs
                } else {
                    pairs
                        .iter()
                        .map(|(k, v)| Ok((key(k, None, engine)?, value(v, None, engine)?)))
                        .collect::<Result<Vec<_>>>()?
                };

                if let Some((target, Value::Mapping(dst))) = reusable(existing, src).map(|t| (t, t)) {
                    let mut guard = dst.write();
                    guard.clear();
                    guard.extend(copied);
                    drop(guard);
                    return Ok(target.clone());
                }
                let mut map = HashMap::with_capacity(copied.len());
                map.extend(copied);
                Ok(Value::Mapping(shared(map)))
            })
        }

        Kind::Set(element) => {
            let bulk_element = bulk_kind(element, config);
            let element = compile(element, &site, config);
            copier(move |src, existing, engine| {
                let items: Vec<Value> = match src {
                    Value::Null => return Ok(Value::Null),
                    Value::Set(cell) => cell.read().iter().cloned().collect(),
                    other => return Err(site.mismatch("set", other)),
                };
                let copied = if let Some(kind) = bulk_element {
                    check_bulk(&site, kind, &items)?;
                    items
                } else {
                    copy_all(&element, &items, None, engine)?
                };

                if let Some((target, Value::Set(dst))) = reusable(existing, src).map(|t| (t, t)) {
                    let mut guard = dst.write();
                    guard.clear();
                    guard.extend(copied);
                    drop(guard);
                    return Ok(target.clone());
                }
                let mut set = HashSet::with_capacity(copied.len());
                set.extend(copied);
                Ok(Value::Set(shared(set)))
            })
        }

        Kind::Nested(declared) => {
            let expected = format!("object {declared}");
            copier(move |src, existing, engine| match src {
                Value::Null => Ok(Value::Null),
                Value::Object(obj) => {
                    if let Some(Value::Object(dst)) = existing {
                        if !dst.ptr_eq(obj) && dst.type_name() == obj.type_name() {
                            engine.clone_into(obj, dst)?;
                            return Ok(Value::Object(dst.clone()));
                        }
                    }
                    engine.clone(obj).map(Value::Object)
                }
                other => Err(site.mismatch(expected.as_str(), other)),
            })
        }

        Kind::Unsupported(ty) => {
            let rendered = ty.to_string();
            copier(move |_, _, _| {
                Err(UnsupportedField::new(&*site.type_name, &*site.field, rendered.as_str()).into())
            })
        }
    }
}
