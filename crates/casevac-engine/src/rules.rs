//! Static decision rules: acuity weights, penalty tables, transport
//! speeds, and NATO timeline budgets.
//!
//! Every penalty shares one abstract cost axis; the solver objective is a
//! plain weighted sum. Changing the engine's priorities means changing
//! these constants, never adding a second objective.

use casevac_core::{Acuity, Capability, EchelonRole};

/// Cost added per required capability the facility lacks.
pub const CAPABILITY_MISMATCH_PENALTY: f64 = 10_000.0;

/// Cost added once when any required resource count exceeds capacity.
pub const RESOURCE_DEFICIT_PENALTY: f64 = 5_000.0;

/// Exponent applied to projected resource utilization.
pub const RESOURCE_STRESS_EXPONENT: f64 = 2.0;

/// Scale on the per-resource stress term.
pub const RESOURCE_STRESS_SCALE: f64 = 100.0;

/// Ground transport speed in km/h.
pub const GROUND_SPEED_KMH: f64 = 50.0;

/// Air transport speed in km/h.
pub const AIR_SPEED_KMH: f64 = 200.0;

/// Golden hour: cumulative minutes to reach Role 1 care.
pub const ROLE1_BUDGET_MINUTES: f64 = 60.0;

/// Damage control: cumulative minutes to reach Role 2 surgical care.
pub const ROLE2_BUDGET_MINUTES: f64 = 120.0;

/// Wall-clock budget for one assignment solve.
pub const DEFAULT_SOLVE_DEADLINE_MS: u64 = 5_000;

/// Maximum number of ranked alternatives reported alongside a transfer.
pub const MAX_ALTERNATIVES: usize = 3;

/// Acuity weight multiplying the ETA term of the cost function.
///
/// Time-to-care dominates for high-acuity patients; a Dead tag zeroes the
/// time term entirely (the survival gate forfeits those decisions long
/// before costing).
pub fn acuity_weight(acuity: Acuity) -> f64 {
    match acuity {
        Acuity::Dead => 0.0,
        Acuity::Expectant => 80.0,
        Acuity::Immediate => 100.0,
        Acuity::Delayed => 50.0,
        Acuity::Minimal => 10.0,
    }
}

/// Stewardship penalty for occupying a facility that holds a scarce
/// capability the patient does not need.
pub fn scarcity_penalty(capability: Capability) -> f64 {
    match capability {
        Capability::Burn => 500.0,
        Capability::Pediatric => 500.0,
        Capability::Neurosurgical => 400.0,
        Capability::Cardiac => 300.0,
        Capability::Obstetric => 200.0,
        Capability::Ophthalmology => 150.0,
        _ => 0.0,
    }
}

/// Cumulative time budget for reaching a role tier.
///
/// Role 1 and Role 2 carry fixed NATO budgets; Role 3 is bounded only by
/// the patient's survival window (`None` = unbounded).
pub fn role_budget_minutes(role: EchelonRole, survival_window_minutes: Option<f64>) -> Option<f64> {
    match role {
        EchelonRole::Role1 => Some(ROLE1_BUDGET_MINUTES),
        EchelonRole::Role2 => Some(ROLE2_BUDGET_MINUTES),
        EchelonRole::Role3 => survival_window_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acuity_weights() {
        assert_eq!(acuity_weight(Acuity::Dead), 0.0);
        assert_eq!(acuity_weight(Acuity::Expectant), 80.0);
        assert_eq!(acuity_weight(Acuity::Immediate), 100.0);
        assert_eq!(acuity_weight(Acuity::Delayed), 50.0);
        assert_eq!(acuity_weight(Acuity::Minimal), 10.0);
    }

    #[test]
    fn test_scarcity_table() {
        assert_eq!(scarcity_penalty(Capability::Burn), 500.0);
        assert_eq!(scarcity_penalty(Capability::Pediatric), 500.0);
        assert_eq!(scarcity_penalty(Capability::Neurosurgical), 400.0);
        assert_eq!(scarcity_penalty(Capability::Cardiac), 300.0);
        assert_eq!(scarcity_penalty(Capability::Obstetric), 200.0);
        assert_eq!(scarcity_penalty(Capability::Ophthalmology), 150.0);
        assert_eq!(scarcity_penalty(Capability::TraumaCenter), 0.0);
        assert_eq!(scarcity_penalty(Capability::Thoracic), 0.0);
    }

    #[test]
    fn test_role_budgets() {
        assert_eq!(
            role_budget_minutes(EchelonRole::Role1, Some(500.0)),
            Some(60.0)
        );
        assert_eq!(
            role_budget_minutes(EchelonRole::Role2, Some(500.0)),
            Some(120.0)
        );
        assert_eq!(
            role_budget_minutes(EchelonRole::Role3, Some(500.0)),
            Some(500.0)
        );
        assert_eq!(role_budget_minutes(EchelonRole::Role3, None), None);
    }
}
