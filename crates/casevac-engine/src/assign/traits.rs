//! Backend trait and shared solver types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::DEFAULT_SOLVE_DEADLINE_MS;

use super::problem::AssignmentProblem;
use super::solution::AssignmentSolution;

/// Terminal state of one solve.
///
/// Only `Optimal` and `Feasible` carry an assignment. `Feasible` means the
/// deadline expired with an incumbent in hand; `Unknown` means it expired
/// with nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolverStatus {
    /// True when the status carries a usable assignment.
    pub fn has_assignment(&self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverStatus::Optimal => write!(f, "OPTIMAL"),
            SolverStatus::Feasible => write!(f, "FEASIBLE"),
            SolverStatus::Infeasible => write!(f, "INFEASIBLE"),
            SolverStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Configuration passed to backend solvers.
#[derive(Debug, Clone)]
pub struct SolveConfig {
    /// Wall-clock deadline in milliseconds.
    pub deadline_ms: u64,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            deadline_ms: DEFAULT_SOLVE_DEADLINE_MS,
        }
    }
}

/// Solver-layer failures.
///
/// Infeasibility is not an error: it is a [`SolverStatus`] the decision
/// layer maps to a forfeit. Errors here mean the problem or backend was
/// broken.
#[derive(Debug, Clone, Error)]
pub enum SolveError {
    /// The problem violates a structural precondition.
    #[error("malformed assignment problem: {0}")]
    Malformed(String),
    /// The backend itself failed.
    #[error("assignment backend failed: {0}")]
    Backend(String),
}

/// A binary assignment solver.
///
/// Implementations must be deterministic for a fixed problem: the returned
/// assignment is required to be the rank-key minimum among optimal
/// assignments.
pub trait AssignmentBackend: Send + Sync {
    /// Unique identifier (e.g. "branch-bound", "clarabel").
    fn id(&self) -> &str;

    /// Check if this backend is usable at runtime.
    fn is_available(&self) -> bool;

    /// Solve the problem under `config`.
    fn solve(
        &self,
        problem: &AssignmentProblem,
        config: &SolveConfig,
    ) -> Result<AssignmentSolution, SolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trait must stay object-safe; the registry stores `dyn` backends.
    #[test]
    fn test_backend_trait_is_object_safe() {
        fn _accepts(_b: &dyn AssignmentBackend) {}
    }

    #[test]
    fn test_backend_trait_is_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<Box<dyn AssignmentBackend>>();
        _assert_sync::<Box<dyn AssignmentBackend>>();
    }

    #[test]
    fn test_status_assignment_carriers() {
        assert!(SolverStatus::Optimal.has_assignment());
        assert!(SolverStatus::Feasible.has_assignment());
        assert!(!SolverStatus::Infeasible.has_assignment());
        assert!(!SolverStatus::Unknown.has_assignment());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&SolverStatus::Optimal).unwrap(),
            "\"OPTIMAL\""
        );
        assert_eq!(SolverStatus::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_default_deadline() {
        assert_eq!(SolveConfig::default().deadline_ms, 5_000);
    }
}
