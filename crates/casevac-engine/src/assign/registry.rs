//! Registry for assignment solver backends.
//!
//! A small service locator: backends register under their id, and
//! `select_backend` walks a fixed preference order. The deterministic
//! branch-and-bound backend is preferred; the LP relaxation is the
//! fallback when it is compiled in.

use std::collections::HashMap;
use std::sync::Arc;

use super::branch_bound::BranchBoundBackend;
use super::traits::AssignmentBackend;

pub struct SolverRegistry {
    backends: HashMap<String, Arc<dyn AssignmentBackend>>,
}

impl Default for SolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Create a registry with the built-in backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_backend(Arc::new(BranchBoundBackend));
        #[cfg(feature = "solver-clarabel")]
        registry.register_backend(Arc::new(super::clarabel::ClarabelBackend));
        registry
    }

    /// Register a custom backend.
    pub fn register_backend(&mut self, backend: Arc<dyn AssignmentBackend>) {
        self.backends.insert(backend.id().to_string(), backend);
    }

    /// Get a backend by id.
    pub fn get_backend(&self, id: &str) -> Option<Arc<dyn AssignmentBackend>> {
        self.backends.get(id).cloned()
    }

    /// List registered backend ids.
    pub fn list_backends(&self) -> Vec<&str> {
        self.backends.keys().map(|s| s.as_str()).collect()
    }

    /// Select the preferred available backend.
    pub fn select_backend(&self) -> Option<Arc<dyn AssignmentBackend>> {
        for id in ["branch-bound", "clarabel"] {
            if let Some(backend) = self.backends.get(id) {
                if backend.is_available() {
                    return Some(backend.clone());
                }
            }
        }
        // Fall back to any available custom backend, in id order for
        // determinism
        let mut ids: Vec<&String> = self.backends.keys().collect();
        ids.sort();
        for id in ids {
            let backend = &self.backends[id];
            if backend.is_available() {
                return Some(backend.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_prefer_branch_bound() {
        let registry = SolverRegistry::with_defaults();
        let backend = registry.select_backend().expect("a backend");
        assert_eq!(backend.id(), "branch-bound");
    }

    #[test]
    fn test_get_by_id() {
        let registry = SolverRegistry::with_defaults();
        assert!(registry.get_backend("branch-bound").is_some());
        assert!(registry.get_backend("simplex").is_none());
    }

    #[test]
    fn test_empty_registry_selects_nothing() {
        let registry = SolverRegistry::new();
        assert!(registry.select_backend().is_none());
    }
}
