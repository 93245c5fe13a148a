//! Binary assignment solver port.
//!
//! The MCI/PHE optimizer is formulated as a binary assignment problem:
//! variables `x[p,f] ∈ {0,1}`, one facility per patient (hard), shared
//! facility resource capacity (hard), a caller-supplied exclusion set
//! (drives alternatives enumeration), and a linear cost objective.
//!
//! The engine depends only on the [`AssignmentBackend`] trait; any correct
//! binary ILP implementation satisfies the contract. Two backends ship:
//!
//! - [`BranchBoundBackend`]: deterministic depth-first branch-and-bound,
//!   always available, honors the wall-clock deadline.
//! - `ClarabelBackend` (feature `solver-clarabel`, on by default): LP
//!   relaxation through `good_lp`; exact for unit-demand single-patient
//!   instances because capacity-violating columns are fixed to zero.
//!
//! Both backends extract assignments through the cost model's rank key, so
//! a fixed problem yields the same assignment regardless of backend.

mod branch_bound;
#[cfg(feature = "solver-clarabel")]
mod clarabel;
mod problem;
mod registry;
mod solution;
mod traits;

pub use branch_bound::BranchBoundBackend;
#[cfg(feature = "solver-clarabel")]
pub use clarabel::ClarabelBackend;
pub use problem::AssignmentProblem;
pub use registry::SolverRegistry;
pub use solution::AssignmentSolution;
pub use traits::{AssignmentBackend, SolveConfig, SolveError, SolverStatus};

/// Solve with the preferred available backend from the default registry.
pub fn solve_assignment(
    problem: &AssignmentProblem,
    config: &SolveConfig,
) -> Result<AssignmentSolution, SolveError> {
    let registry = SolverRegistry::with_defaults();
    let backend = registry
        .select_backend()
        .ok_or_else(|| SolveError::Backend("no assignment backend available".into()))?;
    backend.solve(problem, config)
}
