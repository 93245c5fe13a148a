//! MEDEVAC evacuation chain builder.
//!
//! Greedy construction over the role tiers Role 1 (level 3) → Role 2
//! (level 2) → Role 3 (level 1). Each tier discards candidates whose
//! cumulative arrival time would blow the tier budget (60 min golden
//! hour, 120 min damage control, survival window for Role 3), scores the
//! survivors with the cost model at their ETA from the previous hop, and
//! commits the rank-key minimum. All three hops must fill.
//!
//! Capability and resource fit stay soft at every hop: a non-compliant
//! facility is penalized by the cost model, not discarded.

use std::cmp::Ordering;

use tracing::debug;

use casevac_core::{EchelonRole, Facility, Patient};

use crate::cost::{assignment_cost, RankKey};
use crate::decision::{ChainHop, DecisionContext, NatoCompliance, ReasoningCode, TransferDecision};
use crate::eta::eta_minutes;
use crate::rules::{role_budget_minutes, ROLE1_BUDGET_MINUTES, ROLE2_BUDGET_MINUTES};

pub(crate) fn build_evacuation_chain(
    patient: &Patient,
    facilities: &[Facility],
    survival_window_minutes: Option<f64>,
    ctx: &DecisionContext,
) -> TransferDecision {
    let Some(mut origin) = patient.location else {
        return TransferDecision::forfeit(
            ReasoningCode::NoLocation,
            format!("Patient {} has no recorded location.", patient.id),
        );
    };

    let mut cumulative = 0.0_f64;
    let mut hops: Vec<ChainHop> = Vec::with_capacity(3);
    let mut used = vec![false; facilities.len()];

    for role in EchelonRole::IN_EVACUATION_ORDER {
        let budget = role_budget_minutes(role, survival_window_minutes);

        let mut best: Option<(usize, f64, f64)> = None;
        for (i, facility) in facilities.iter().enumerate() {
            if used[i] || facility.level != role.facility_level() {
                continue;
            }
            let eta = eta_minutes(&origin, &facility.location, ctx.transport_mode);
            if let Some(budget) = budget {
                if cumulative + eta > budget {
                    continue;
                }
            }
            let cost = assignment_cost(patient, facility, eta);
            let candidate = RankKey {
                cost,
                eta_minutes: eta,
                facility_id: &facility.id,
            };
            let replace = match &best {
                None => true,
                Some((best_i, best_eta, best_cost)) => {
                    let incumbent = RankKey {
                        cost: *best_cost,
                        eta_minutes: *best_eta,
                        facility_id: &facilities[*best_i].id,
                    };
                    candidate.cmp(&incumbent) == Ordering::Less
                }
            };
            if replace {
                best = Some((i, eta, cost));
            }
        }

        let Some((index, eta, _cost)) = best else {
            let reasoning = match budget {
                Some(budget) => format!(
                    "No {} facility is reachable within the {:.0}-minute cumulative budget for patient {}.",
                    role, budget, patient.id
                ),
                None => format!("No {} facility is available for patient {}.", role, patient.id),
            };
            return TransferDecision::forfeit(ReasoningCode::NoViableChain, reasoning);
        };

        cumulative += eta;
        hops.push(ChainHop {
            role,
            level: facilities[index].level,
            facility_id: facilities[index].id.clone(),
            facility_name: facilities[index].name.clone(),
            eta_minutes: eta,
            cumulative_time: cumulative,
            timeline_compliance: true,
        });
        origin = facilities[index].location;
        used[index] = true;
    }

    if let Some(window) = survival_window_minutes {
        if cumulative > window {
            return TransferDecision::forfeit(
                ReasoningCode::DeadOnArrival,
                format!(
                    "Completed chain takes {:.1} min, beyond the {:.1} min survival window.",
                    cumulative, window
                ),
            );
        }
    }

    let nato_compliance = NatoCompliance {
        role1_compliant: hops[0].cumulative_time <= ROLE1_BUDGET_MINUTES,
        role2_compliant: hops[1].cumulative_time <= ROLE2_BUDGET_MINUTES,
        survival_compliant: survival_window_minutes.map_or(true, |w| cumulative <= w),
    };

    debug!(
        patient = %patient.id,
        total_minutes = cumulative,
        "evacuation chain built"
    );

    let reasoning = format!(
        "Evacuation chain {} to {} to {} covers {:.1} min within the NATO timeline for patient {}.",
        hops[0].facility_name, hops[1].facility_name, hops[2].facility_name, cumulative, patient.id
    );
    TransferDecision::transfer_chain(
        hops,
        cumulative,
        survival_window_minutes,
        nato_compliance,
        reasoning,
    )
}
