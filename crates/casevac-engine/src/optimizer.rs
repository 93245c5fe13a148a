//! Single-destination optimizer for MCI and PHE incidents.
//!
//! Wraps the assignment solver port: formulate the singleton problem,
//! solve, apply the survival override, then enumerate ranked alternatives
//! by re-solving with the previous choice excluded.

use tracing::debug;

use casevac_core::{Facility, Patient};

use crate::assign::{AssignmentProblem, SolveConfig, SolverRegistry, SolverStatus};
use crate::decision::{DecisionContext, Destination, ReasoningCode, TransferDecision};
use crate::rules::MAX_ALTERNATIVES;

pub(crate) fn solve_single_destination(
    patient: &Patient,
    facilities: &[Facility],
    survival_window_minutes: Option<f64>,
    ctx: &DecisionContext,
) -> TransferDecision {
    let problem =
        match AssignmentProblem::for_single_patient(patient, facilities, ctx.transport_mode) {
            Ok(problem) => problem,
            Err(err) => {
                return TransferDecision::forfeit(
                    ReasoningCode::NoFacilitiesAvailable,
                    format!("Assignment could not be formulated: {}", err),
                );
            }
        };

    let registry = SolverRegistry::with_defaults();
    let Some(backend) = registry.select_backend() else {
        return TransferDecision::forfeit(
            ReasoningCode::NoFacilitiesAvailable,
            "No assignment backend is available.",
        );
    };
    let config = SolveConfig {
        deadline_ms: ctx.solve_deadline_ms,
    };

    let primary = match backend.solve(&problem, &config) {
        Ok(solution) => solution,
        Err(err) => {
            return TransferDecision::forfeit(
                ReasoningCode::NoFacilitiesAvailable,
                format!("Assignment solve failed: {}", err),
            );
        }
    };

    if !primary.status.has_assignment() {
        let reasoning = match primary.status {
            SolverStatus::Unknown => {
                "Solver deadline expired before any assignment was found.".to_string()
            }
            _ => "No facility can satisfy the assignment constraints.".to_string(),
        };
        return TransferDecision::forfeit(ReasoningCode::NoFacilitiesAvailable, reasoning);
    }
    let Some(chosen) = primary.assignment[0] else {
        return TransferDecision::forfeit(
            ReasoningCode::NoFacilitiesAvailable,
            "Solver reported an assignment but returned none.",
        );
    };

    let eta = problem.etas[0][chosen];
    if let Some(window) = survival_window_minutes {
        if eta > window {
            return TransferDecision::forfeit(
                ReasoningCode::DeadOnArrival,
                format!(
                    "Best destination {} is {:.1} min out, beyond the {:.1} min survival window.",
                    facilities[chosen].name, eta, window
                ),
            );
        }
    }

    // Alternatives: re-solve with each previous choice excluded, stopping
    // at the first infeasible re-solution.
    let mut alternatives = Vec::new();
    let mut excluded_problem = problem.clone();
    let mut last = chosen;
    for _ in 0..MAX_ALTERNATIVES {
        excluded_problem.exclude(0, last);
        let Ok(resolution) = backend.solve(&excluded_problem, &config) else {
            break;
        };
        if !resolution.status.has_assignment() {
            break;
        }
        let Some(alternative) = resolution.assignment[0] else {
            break;
        };
        alternatives.push(make_destination(facilities, &problem, alternative));
        last = alternative;
    }

    debug!(
        patient = %patient.id,
        destination = %facilities[chosen].id,
        eta_minutes = eta,
        n_alternatives = alternatives.len(),
        status = %primary.status,
        "single-destination transfer selected"
    );

    let reasoning = format!(
        "Optimal destination {} at {:.1} min for {} patient {}; {} alternative(s) retained.",
        facilities[chosen].name,
        eta,
        patient.acuity,
        patient.id,
        alternatives.len()
    );
    TransferDecision::transfer_single(
        make_destination(facilities, &problem, chosen),
        alternatives,
        primary.status,
        reasoning,
    )
}

fn make_destination(
    facilities: &[Facility],
    problem: &AssignmentProblem,
    index: usize,
) -> Destination {
    Destination {
        facility_id: facilities[index].id.clone(),
        facility_name: facilities[index].name.clone(),
        eta_minutes: problem.etas[0][index],
    }
}
