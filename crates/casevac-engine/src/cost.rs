//! Scalar cost model for (patient, facility) pairs.
//!
//! Four soft terms share one cost axis:
//!
//! 1. ETA weighted by acuity. Time-to-care dominates for high-acuity
//!    patients.
//! 2. Capability mismatch, near-prohibitive per missing required
//!    capability.
//! 3. Scarcity stewardship: assigning a patient to a facility holding a
//!    scarce capability the patient does not need burns rare tertiary
//!    capacity.
//! 4. Resource stress + deficit: quadratic utilization pressure, plus a
//!    flat penalty when any required count is simply not there.

use std::cmp::Ordering;

use casevac_core::{Capability, Facility, FacilityId, Patient};

use crate::feasibility::{missing_capabilities, short_resources};
use crate::rules;

/// Cost of sending `patient` to `facility` with travel time `eta_minutes`.
///
/// Always finite and non-negative.
pub fn assignment_cost(patient: &Patient, facility: &Facility, eta_minutes: f64) -> f64 {
    let mut cost = eta_minutes * rules::acuity_weight(patient.acuity);

    cost += rules::CAPABILITY_MISMATCH_PENALTY
        * missing_capabilities(patient, facility).len() as f64;

    // Stewardship: scarce capabilities the facility holds but the patient
    // does not need.
    for cap in Capability::ALL {
        if facility.has_capability(cap) && !patient.requires(cap) {
            cost += rules::scarcity_penalty(cap);
        }
    }

    // Projected utilization pressure per required resource.
    for (&resource, &required) in &patient.required_resources {
        if required == 0 {
            continue;
        }
        let capacity = facility.capacity(resource);
        let utilization = (required as f64 / capacity.max(1) as f64).min(1.0);
        cost += rules::RESOURCE_STRESS_SCALE * utilization.powf(rules::RESOURCE_STRESS_EXPONENT);
    }

    if !short_resources(patient, facility).is_empty() {
        cost += rules::RESOURCE_DEFICIT_PENALTY;
    }

    cost
}

/// Total order over scored candidates: lower cost, then lower ETA, then
/// lexicographically smaller facility id.
///
/// Every site that selects a candidate (both solver backends, the chain
/// builder, the alternatives enumeration) must compare through this key,
/// so that a fixed input always yields a byte-identical decision.
#[derive(Debug, Clone)]
pub struct RankKey<'a> {
    pub cost: f64,
    pub eta_minutes: f64,
    pub facility_id: &'a FacilityId,
}

impl RankKey<'_> {
    pub fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.eta_minutes.total_cmp(&other.eta_minutes))
            .then_with(|| self.facility_id.cmp(other.facility_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casevac_core::{Acuity, GeoPoint, Resource};

    fn patient() -> Patient {
        Patient::new("P-1", Acuity::Immediate).require_capability(Capability::TraumaCenter)
    }

    fn bare_facility(id: &str) -> Facility {
        Facility::new(id, id, 1, GeoPoint::new(0.0, 0.0))
            .with_capability(Capability::TraumaCenter)
    }

    #[test]
    fn test_time_term_scales_with_acuity() {
        let facility = bare_facility("F-1");
        let immediate = assignment_cost(&patient(), &facility, 10.0);
        let minimal = assignment_cost(
            &Patient::new("P-2", Acuity::Minimal).require_capability(Capability::TraumaCenter),
            &facility,
            10.0,
        );
        assert_eq!(immediate, 10.0 * 100.0);
        assert_eq!(minimal, 10.0 * 10.0);
    }

    #[test]
    fn test_missing_capability_is_near_prohibitive() {
        let facility = Facility::new("F-2", "F-2", 1, GeoPoint::new(0.0, 0.0));
        let cost = assignment_cost(&patient(), &facility, 0.0);
        assert!(cost >= rules::CAPABILITY_MISMATCH_PENALTY);

        // Removing the requirement strictly decreases the cost
        let relaxed = Patient::new("P-1", Acuity::Immediate);
        assert!(assignment_cost(&relaxed, &facility, 0.0) < cost);
    }

    #[test]
    fn test_stewardship_penalty() {
        let plain = bare_facility("F-A");
        let tertiary = bare_facility("F-B")
            .with_capability(Capability::Burn)
            .with_capability(Capability::Pediatric)
            .with_capability(Capability::Neurosurgical);

        let p = patient();
        let base = assignment_cost(&p, &plain, 5.0);
        let burdened = assignment_cost(&p, &tertiary, 5.0);
        assert_eq!(burdened - base, 500.0 + 500.0 + 400.0);
    }

    #[test]
    fn test_stewardship_not_charged_when_needed() {
        let p = patient().require_capability(Capability::Burn);
        let f = bare_facility("F-C").with_capability(Capability::Burn);
        let cost = assignment_cost(&p, &f, 0.0);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_resource_stress_quadratic() {
        let p = Patient::new("P-3", Acuity::Minimal).require_resource(Resource::Ventilator, 1);
        let roomy = bare_facility("F-D").with_resource(Resource::Ventilator, 10);
        let tight = bare_facility("F-E").with_resource(Resource::Ventilator, 2);

        let stress_roomy = assignment_cost(&p, &roomy, 0.0);
        let stress_tight = assignment_cost(&p, &tight, 0.0);
        assert!((stress_roomy - 100.0 * (0.1f64).powi(2)).abs() < 1e-9);
        assert!((stress_tight - 100.0 * (0.5f64).powi(2)).abs() < 1e-9);
    }

    #[test]
    fn test_resource_deficit_flat_penalty() {
        let p = Patient::new("P-4", Acuity::Minimal)
            .require_resource(Resource::Ventilator, 3)
            .require_resource(Resource::Ward, 5);
        // Ventilator short, ward absent entirely: deficit fires once
        let f = bare_facility("F-F").with_resource(Resource::Ventilator, 1);
        let cost = assignment_cost(&p, &f, 0.0);
        // two saturated stress terms + one flat deficit
        assert!((cost - (200.0 + rules::RESOURCE_DEFICIT_PENALTY)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_capacity_uses_floor_of_one() {
        let p = Patient::new("P-5", Acuity::Minimal).require_resource(Resource::Ward, 2);
        let f = bare_facility("F-G");
        // utilization clips to 1.0 rather than dividing by zero
        let cost = assignment_cost(&p, &f, 0.0);
        assert!(cost.is_finite());
        assert!((cost - (100.0 + rules::RESOURCE_DEFICIT_PENALTY)).abs() < 1e-9);
    }

    #[test]
    fn test_rank_key_ordering() {
        let id_a = FacilityId::new("F-A");
        let id_b = FacilityId::new("F-B");

        let cheap = RankKey { cost: 1.0, eta_minutes: 9.0, facility_id: &id_b };
        let costly = RankKey { cost: 2.0, eta_minutes: 1.0, facility_id: &id_a };
        assert_eq!(cheap.cmp(&costly), Ordering::Less);

        let slow = RankKey { cost: 1.0, eta_minutes: 10.0, facility_id: &id_a };
        assert_eq!(cheap.cmp(&slow), Ordering::Less);

        let same_b = RankKey { cost: 1.0, eta_minutes: 9.0, facility_id: &id_b };
        let same_a = RankKey { cost: 1.0, eta_minutes: 9.0, facility_id: &id_a };
        assert_eq!(same_a.cmp(&same_b), Ordering::Less);
        assert_eq!(same_b.cmp(&same_b.clone()), Ordering::Equal);
    }
}
