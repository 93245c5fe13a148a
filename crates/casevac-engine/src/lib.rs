//! # casevac-engine: Transfer Decision Engine
//!
//! Given one triaged patient and a set of candidate facilities, produce a
//! deterministic assignment decision: a single-destination transfer, a
//! multi-hop NATO evacuation chain, or an explicit forfeit.
//!
//! ## Dispatch modes
//!
//! | Incident | Strategy | Output |
//! |----------|----------|--------|
//! | MCI / PHE | Binary assignment solve over the facility grid | Destination + ranked alternatives |
//! | MEDEVAC | Greedy Role 1 → 2 → 3 chain under cumulative budgets | Evacuation chain + compliance flags |
//!
//! ## Architecture
//!
//! - **[`decision::decide`]**: the orchestrator and only public
//!   operation. Pure per call; safe to invoke concurrently.
//! - **[`survival`]**: survival-window derivation and the pre-dispatch
//!   triage gate (deceased, expired window, missing location).
//! - **[`assign`]**: the binary-assignment solver port. Backends plug in
//!   behind [`assign::AssignmentBackend`]; a deterministic
//!   branch-and-bound backend is always compiled in, and an LP-relaxation
//!   backend through `good_lp`/Clarabel sits behind the
//!   `solver-clarabel` feature.
//! - **[`cost`]**: the scalar cost model (acuity-weighted ETA, capability
//!   mismatch, scarcity stewardship, resource stress) and the rank key
//!   that makes every selection deterministic.
//! - **[`rules`]**: the constant tables behind all of the above.
//!
//! Domain failures never raise: every outcome is a structured
//! [`decision::TransferDecision`] carrying a
//! [`decision::ReasoningCode`].
//!
//! ## Example
//!
//! ```rust
//! use casevac_core::*;
//! use casevac_engine::{decide, DecisionContext};
//!
//! let patient = Patient::new("P-1", Acuity::Immediate)
//!     .at(GeoPoint::new(43.6532, -79.3832))
//!     .require_capability(Capability::TraumaCenter);
//!
//! let facility = Facility::new("F-1", "Mercy General", 1, GeoPoint::new(43.6591, -79.3877))
//!     .with_capability(Capability::TraumaCenter)
//!     .with_resource(Resource::Ward, 12);
//!
//! let decision = decide(
//!     &patient,
//!     &[facility],
//!     IncidentType::Mci,
//!     &DecisionContext::new(1_700_000_000.0),
//! );
//! assert!(decision.is_transfer());
//! ```

pub mod assign;
pub mod cost;
pub mod decision;
pub mod eta;
pub mod feasibility;
pub mod rules;
pub mod survival;

mod chain;
mod optimizer;

pub use assign::{
    solve_assignment, AssignmentBackend, AssignmentProblem, AssignmentSolution,
    BranchBoundBackend, SolveConfig, SolveError, SolverRegistry, SolverStatus,
};
#[cfg(feature = "solver-clarabel")]
pub use assign::ClarabelBackend;
pub use cost::{assignment_cost, RankKey};
pub use decision::{
    decide, ChainHop, DecisionAction, DecisionContext, Destination, NatoCompliance,
    ReasoningCode, TransferDecision,
};
pub use eta::{eta_minutes, round_minutes, TransportMode};
pub use feasibility::{
    capabilities_match, missing_capabilities, resources_sufficient, short_resources,
};
pub use survival::{survival_window_minutes, triage_gate, TriageGate};
