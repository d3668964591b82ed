// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Clone plans: per-type copy instructions built from the type model.

use crate::diagnostics::UnsupportedField;
use crate::dynamic::{classify, FieldDescriptor, Kind, TypeModel};
use crate::{Error, Result};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Copy instruction for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOp {
    pub field: String,
    /// Position of the field in the instance layout (inherited fields first).
    pub index: usize,
    pub kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneStep {
    /// Run the routine of this cloneable base type first.
    Base(String),
    Field(FieldOp),
}

/// Ordered copy instructions for one type. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClonePlan {
    pub type_name: String,
    pub steps: Vec<CloneStep>,
    /// Fields left at their default in the clone.
    pub ignored: Vec<String>,
}

impl ClonePlan {
    pub fn base(&self) -> Option<&str> {
        self.steps.iter().find_map(|step| match step {
            CloneStep::Base(name) => Some(name.as_str()),
            CloneStep::Field(_) => None,
        })
    }

    pub fn field_ops(&self) -> impl Iterator<Item = &FieldOp> {
        self.steps.iter().filter_map(|step| match step {
            CloneStep::Field(op) => Some(op),
            CloneStep::Base(_) => None,
        })
    }
}

/// Builds and memoizes [`ClonePlan`]s. Failed builds are not cached.
pub struct PlanBuilder {
    model: Arc<dyn TypeModel>,
    plans: DashMap<String, Arc<ClonePlan>>,
}

impl PlanBuilder {
    pub fn new(model: Arc<dyn TypeModel>) -> Self {
        Self {
            model,
            plans: DashMap::new(),
        }
    }

    pub fn model(&self) -> &Arc<dyn TypeModel> {
        &self.model
    }

    pub fn cached(&self, name: &str) -> Option<Arc<ClonePlan>> {
        self.plans.get(name).map(|plan| Arc::clone(plan.value()))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn build(&self, name: &str) -> Result<Arc<ClonePlan>> {
        if let Some(plan) = self.cached(name) {
            return Ok(plan);
        }
        let plan = Arc::new(self.plan(name)?);
        log::debug!(
            "[replica::plan] built plan for {} ({} steps, {} ignored)",
            name,
            plan.steps.len(),
            plan.ignored.len()
        );
        Ok(Arc::clone(
            self.plans.entry(name.to_string()).or_insert(plan).value(),
        ))
    }

    fn plan(&self, name: &str) -> Result<ClonePlan> {
        let model = self.model.as_ref();
        let chain = model.ancestry(name)?;
        let Some(desc) = chain.first() else {
            return Err(Error::UnknownType(name.to_string()));
        };
        if !desc.cloneable {
            return Err(Error::not_cloneable(name));
        }

        // Walk up to the nearest cloneable ancestor; the ones in between
        // have their fields copied here.
        let mut base = None;
        let mut inlined = 0;
        for ancestor in &chain[1..] {
            if ancestor.cloneable {
                base = Some(ancestor.name.clone());
                break;
            }
            inlined += 1;
        }

        let layout = model.fields(name)?;
        let base_len = match &base {
            Some(base) => model.fields(base)?.len(),
            None => 0,
        };
        let mut seen: HashSet<&str> = layout[..base_len]
            .iter()
            .map(|f| f.name.as_str())
            .collect();

        let mut steps = Vec::with_capacity(layout.len() + 1);
        if let Some(base) = &base {
            steps.push(CloneStep::Base(base.clone()));
        }
        let mut ignored = Vec::new();

        // Copied here: inlined ancestors base-to-derived, then own fields.
        let owners = chain[..=inlined].iter().rev();
        let mut index = base_len;
        for owner in owners {
            for field in &owner.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(Error::malformed(
                        name,
                        format!(
                            "field `{}` of {} is already declared by an ancestor",
                            field.name, owner.name
                        ),
                    ));
                }
                if model.is_ignored(field) {
                    ignored.push(field.name.clone());
                } else {
                    let kind = self.classify_field(&owner.name, field)?;
                    steps.push(CloneStep::Field(FieldOp {
                        field: field.name.clone(),
                        index,
                        kind,
                    }));
                }
                index += 1;
            }
        }

        Ok(ClonePlan {
            type_name: name.to_string(),
            steps,
            ignored,
        })
    }

    fn classify_field(&self, owner: &str, field: &FieldDescriptor) -> Result<Kind> {
        let kind = classify(&field.ty, self.model.as_ref());
        if kind.is_supported() {
            return Ok(kind);
        }
        Err(UnsupportedField::new(owner, &field.name, field.ty.to_string())
            .at(field.position.clone())
            .into())
    }
}

impl std::fmt::Debug for PlanBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanBuilder")
            .field("plans", &self.plans.len())
            .finish()
    }
}
