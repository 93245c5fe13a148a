//! Capability and resource feasibility predicates.
//!
//! These predicates never remove a facility from the MCI/PHE candidate
//! grid; the cost model turns a mismatch into a near-prohibitive penalty
//! instead. The MEDEVAC chain builder likewise uses them only through the
//! cost model, so capability-compliant facilities are preferred at every
//! hop rather than hard-required.

use casevac_core::{Capability, Facility, Patient, Resource};

/// True iff every capability the patient requires is available at the
/// facility.
pub fn capabilities_match(patient: &Patient, facility: &Facility) -> bool {
    missing_capabilities(patient, facility).is_empty()
}

/// Required capabilities the facility lacks, in alphabet order.
pub fn missing_capabilities(patient: &Patient, facility: &Facility) -> Vec<Capability> {
    patient
        .required_capabilities
        .iter()
        .filter(|&(&cap, &required)| required && !facility.has_capability(cap))
        .map(|(&cap, _)| cap)
        .collect()
}

/// True iff every required resource count is covered by remaining
/// capacity.
pub fn resources_sufficient(patient: &Patient, facility: &Facility) -> bool {
    short_resources(patient, facility).is_empty()
}

/// Required resources the facility cannot cover, in alphabet order.
pub fn short_resources(patient: &Patient, facility: &Facility) -> Vec<Resource> {
    patient
        .required_resources
        .iter()
        .filter(|&(&res, &required)| required > 0 && facility.capacity(res) < required)
        .map(|(&res, _)| res)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use casevac_core::{Acuity, GeoPoint};

    fn base_facility() -> Facility {
        Facility::new("F-1", "Base", 1, GeoPoint::new(0.0, 0.0))
            .with_capability(Capability::TraumaCenter)
            .with_resource(Resource::Ward, 10)
            .with_resource(Resource::Ventilator, 2)
    }

    #[test]
    fn test_capabilities_match() {
        let patient = Patient::new("P-1", Acuity::Immediate)
            .require_capability(Capability::TraumaCenter);
        assert!(capabilities_match(&patient, &base_facility()));

        let patient = patient.require_capability(Capability::Neurosurgical);
        let facility = base_facility();
        assert!(!capabilities_match(&patient, &facility));
        assert_eq!(
            missing_capabilities(&patient, &facility),
            vec![Capability::Neurosurgical]
        );
    }

    #[test]
    fn test_false_requirement_flag_is_not_required() {
        let mut patient = Patient::new("P-2", Acuity::Delayed);
        patient
            .required_capabilities
            .insert(Capability::Burn, false);
        assert!(capabilities_match(&patient, &base_facility()));
    }

    #[test]
    fn test_resources_sufficient() {
        let patient = Patient::new("P-3", Acuity::Immediate)
            .require_resource(Resource::Ward, 1)
            .require_resource(Resource::Ventilator, 2);
        assert!(resources_sufficient(&patient, &base_facility()));

        let patient = patient.require_resource(Resource::Ventilator, 3);
        let facility = base_facility();
        assert!(!resources_sufficient(&patient, &facility));
        assert_eq!(short_resources(&patient, &facility), vec![Resource::Ventilator]);
    }

    #[test]
    fn test_zero_requirement_ignored() {
        let patient = Patient::new("P-4", Acuity::Minimal)
            .require_resource(Resource::Isolation, 0);
        assert!(resources_sufficient(&patient, &base_facility()));
    }
}
