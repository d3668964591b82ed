// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration.
//!
//! Only the interpreted backend is configurable. The derived
//! `deep_clone_into` always reuses target allocations and always bulk-copies
//! primitive containers.

/// Default for [`EngineConfig::reuse_targets`].
pub const DEFAULT_REUSE_TARGETS: bool = true;

/// Default for [`EngineConfig::bulk_copy_primitives`].
pub const DEFAULT_BULK_COPY_PRIMITIVES: bool = true;

/// Settings of a [`CloneEngine`](crate::dynamic::CloneEngine).
///
/// # Example
///
/// ```rust
/// use replica::EngineConfig;
///
/// let config = EngineConfig::default().reuse_targets(false);
/// assert!(!config.reuses_targets());
/// assert!(config.bulk_copies_primitives());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    reuse_targets: bool,
    bulk_copy_primitives: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reuse_targets: DEFAULT_REUSE_TARGETS,
            bulk_copy_primitives: DEFAULT_BULK_COPY_PRIMITIVES,
        }
    }
}

impl EngineConfig {
    /// Repopulate containers and objects already present in the target
    /// instead of allocating new ones. Never applies when the target slot
    /// holds the very same reference as the source.
    #[must_use]
    pub fn reuse_targets(mut self, enabled: bool) -> Self {
        self.reuse_targets = enabled;
        self
    }

    /// Copy arrays and sequences of primitives in one pass instead of
    /// element by element.
    #[must_use]
    pub fn bulk_copy_primitives(mut self, enabled: bool) -> Self {
        self.bulk_copy_primitives = enabled;
        self
    }

    pub fn reuses_targets(&self) -> bool {
        self.reuse_targets
    }

    pub fn bulk_copies_primitives(&self) -> bool {
        self.bulk_copy_primitives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.reuses_targets(), DEFAULT_REUSE_TARGETS);
        assert_eq!(config.bulk_copies_primitives(), DEFAULT_BULK_COPY_PRIMITIVES);
    }

    #[test]
    fn test_builder_setters() {
        let config = EngineConfig::default()
            .reuse_targets(false)
            .bulk_copy_primitives(false);
        assert!(!config.reuses_targets());
        assert!(!config.bulk_copies_primitives());
    }
}
