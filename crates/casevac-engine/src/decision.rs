//! Decision output types and the orchestrator entry point.
//!
//! [`decide`] is the single public operation: it runs the triage gate,
//! dispatches by incident type, and assembles a [`TransferDecision`].
//! Domain failures (deceased patient, no viable chain, infeasible
//! assignment) are structured forfeit decisions; the function never
//! returns an error and never panics.
//!
//! The orchestrator is pure: it holds no state across calls and may be
//! invoked concurrently from multiple threads on disjoint inputs.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::debug;

use casevac_core::{EchelonRole, Facility, FacilityId, IncidentType, Patient};

use crate::assign::SolverStatus;
use crate::eta::TransportMode;
use crate::rules::DEFAULT_SOLVE_DEADLINE_MS;
use crate::survival::{triage_gate, TriageGate};
use crate::{chain, optimizer};

/// Whether the engine committed to moving the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Transfer,
    Forfeit,
}

/// Machine-readable explanation of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasoningCode {
    /// 3-hop NATO chain built within timeline
    EvacuationChainOptimal,
    /// Single-destination optimal assignment
    TransferOptimal,
    /// Dead flag set, acuity Dead, or survival window expired
    PatientDeceased,
    /// Best assignment or chain exceeds the survival window
    DeadOnArrival,
    /// Empty facility set or infeasible assignment
    NoFacilitiesAvailable,
    /// MEDEVAC cannot satisfy the Role 1/2/3 timeline
    NoViableChain,
    /// Patient location absent
    NoLocation,
}

impl ReasoningCode {
    pub fn action(&self) -> DecisionAction {
        match self {
            ReasoningCode::EvacuationChainOptimal | ReasoningCode::TransferOptimal => {
                DecisionAction::Transfer
            }
            _ => DecisionAction::Forfeit,
        }
    }
}

fn round1<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(crate::eta::round_minutes(*value))
}

fn round1_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(crate::eta::round_minutes(*v)),
        None => serializer.serialize_none(),
    }
}

/// A single-destination target (primary or alternative).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Destination {
    pub facility_id: FacilityId,
    pub facility_name: String,
    #[serde(serialize_with = "round1")]
    pub eta_minutes: f64,
}

/// One hop of a MEDEVAC chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainHop {
    pub role: EchelonRole,
    pub level: u8,
    pub facility_id: FacilityId,
    pub facility_name: String,
    #[serde(serialize_with = "round1")]
    pub eta_minutes: f64,
    #[serde(serialize_with = "round1")]
    pub cumulative_time: f64,
    pub timeline_compliance: bool,
}

/// NATO timeline summary for a completed chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NatoCompliance {
    pub role1_compliant: bool,
    pub role2_compliant: bool,
    pub survival_compliant: bool,
}

/// The engine's answer for one patient.
///
/// Transfer payloads carry either a destination (MCI/PHE) or an
/// evacuation chain (MEDEVAC); forfeits carry only the code and the
/// reasoning text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferDecision {
    pub action: DecisionAction,
    pub reasoning_code: ReasoningCode,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Destination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_status: Option<SolverStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evacuation_chain: Vec<ChainHop>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "round1_opt")]
    pub total_time_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "round1_opt")]
    pub survival_window_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nato_compliance: Option<NatoCompliance>,
}

impl TransferDecision {
    /// A forfeit carrying only the code and reasoning.
    pub fn forfeit(code: ReasoningCode, reasoning: impl Into<String>) -> Self {
        Self {
            action: DecisionAction::Forfeit,
            reasoning_code: code,
            reasoning: reasoning.into(),
            destination: None,
            alternatives: Vec::new(),
            solver_status: None,
            evacuation_chain: Vec::new(),
            total_time_minutes: None,
            survival_window_minutes: None,
            nato_compliance: None,
        }
    }

    pub(crate) fn transfer_single(
        destination: Destination,
        alternatives: Vec<Destination>,
        solver_status: SolverStatus,
        reasoning: String,
    ) -> Self {
        Self {
            action: DecisionAction::Transfer,
            reasoning_code: ReasoningCode::TransferOptimal,
            reasoning,
            destination: Some(destination),
            alternatives,
            solver_status: Some(solver_status),
            evacuation_chain: Vec::new(),
            total_time_minutes: None,
            survival_window_minutes: None,
            nato_compliance: None,
        }
    }

    pub(crate) fn transfer_chain(
        evacuation_chain: Vec<ChainHop>,
        total_time_minutes: f64,
        survival_window_minutes: Option<f64>,
        nato_compliance: NatoCompliance,
        reasoning: String,
    ) -> Self {
        Self {
            action: DecisionAction::Transfer,
            reasoning_code: ReasoningCode::EvacuationChainOptimal,
            reasoning,
            destination: None,
            alternatives: Vec::new(),
            solver_status: None,
            evacuation_chain,
            total_time_minutes: Some(total_time_minutes),
            survival_window_minutes,
            nato_compliance: Some(nato_compliance),
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.action == DecisionAction::Transfer
    }
}

/// Per-call context: wall clock, transport mode, solver deadline.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext {
    /// Current time in POSIX seconds
    pub now_epoch_secs: f64,
    pub transport_mode: TransportMode,
    pub solve_deadline_ms: u64,
}

impl DecisionContext {
    pub fn new(now_epoch_secs: f64) -> Self {
        Self {
            now_epoch_secs,
            transport_mode: TransportMode::Ground,
            solve_deadline_ms: DEFAULT_SOLVE_DEADLINE_MS,
        }
    }

    /// Build a context from a `chrono` timestamp.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::new(now.timestamp_millis() as f64 / 1_000.0)
    }

    pub fn with_transport_mode(mut self, mode: TransportMode) -> Self {
        self.transport_mode = mode;
        self
    }

    pub fn with_solve_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.solve_deadline_ms = deadline_ms;
        self
    }
}

/// Produce a transfer decision for one patient.
///
/// Steps: triage gate (early forfeit), empty-input check, dispatch by
/// incident type (MCI/PHE to the assignment optimizer, MEDEVAC to the
/// chain builder).
pub fn decide(
    patient: &Patient,
    facilities: &[Facility],
    incident_type: IncidentType,
    ctx: &DecisionContext,
) -> TransferDecision {
    debug!(
        patient = %patient.id,
        incident = %incident_type,
        n_facilities = facilities.len(),
        "decision requested"
    );

    let survival_window_minutes = match triage_gate(patient, ctx.now_epoch_secs) {
        TriageGate::Forfeit(code) => {
            let reasoning = match code {
                ReasoningCode::PatientDeceased => format!(
                    "Patient {} is deceased or past the survival window; no transfer initiated.",
                    patient.id
                ),
                ReasoningCode::NoLocation => format!(
                    "Patient {} has no recorded location; a transfer cannot be routed.",
                    patient.id
                ),
                _ => format!("Patient {} cannot be routed.", patient.id),
            };
            return TransferDecision::forfeit(code, reasoning);
        }
        TriageGate::Proceed {
            survival_window_minutes,
        } => survival_window_minutes,
    };

    if facilities.is_empty() {
        return TransferDecision::forfeit(
            ReasoningCode::NoFacilitiesAvailable,
            "No candidate facilities were provided.",
        );
    }
    if let Some(bad) = facilities.iter().find(|f| f.role().is_none()) {
        // Schema validation should have caught this; refuse rather than
        // route around a malformed registry entry.
        return TransferDecision::forfeit(
            ReasoningCode::NoFacilitiesAvailable,
            format!(
                "Facility {} reports level {}, outside the 1..=3 echelon mapping.",
                bad.id, bad.level
            ),
        );
    }

    match incident_type {
        IncidentType::Mci | IncidentType::Phe => {
            optimizer::solve_single_destination(patient, facilities, survival_window_minutes, ctx)
        }
        IncidentType::Medevac => {
            chain::build_evacuation_chain(patient, facilities, survival_window_minutes, ctx)
        }
    }
}
