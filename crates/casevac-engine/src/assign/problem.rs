//! Assignment problem data structures.
//!
//! The problem is written for a patient *set* even though the current
//! decision API is single-patient; batch assignment is a pure
//! generalization and reuses this representation unchanged.

use std::collections::{BTreeMap, BTreeSet};

use casevac_core::{Facility, FacilityId, Patient, Resource};

use crate::cost::{assignment_cost, RankKey};
use crate::eta::{eta_minutes, TransportMode};

use super::traits::SolveError;

/// A prepared binary assignment instance.
///
/// Costs and ETAs are precomputed from the cost model; backends never see
/// `Patient`/`Facility` directly, only this matrix form plus the capacity
/// data needed for the shared-resource constraint.
#[derive(Debug, Clone)]
pub struct AssignmentProblem {
    /// cost[p][f], finite and non-negative
    pub costs: Vec<Vec<f64>>,
    /// eta[p][f] in minutes
    pub etas: Vec<Vec<f64>>,
    /// Facility ids, aligned with the facility axis
    pub facility_ids: Vec<FacilityId>,
    /// Per-patient required resource counts
    pub demands: Vec<BTreeMap<Resource, u32>>,
    /// Per-facility remaining capacity
    pub capacities: Vec<BTreeMap<Resource, u32>>,
    /// Forbidden (patient, facility) pairs
    pub excluded: BTreeSet<(usize, usize)>,
}

impl AssignmentProblem {
    /// Build the instance for a set of patients against a facility list.
    ///
    /// Every patient must carry a location; the triage gate guarantees
    /// that for the decision path, and direct callers get a structured
    /// error instead of a panic.
    pub fn build(
        patients: &[&Patient],
        facilities: &[Facility],
        mode: TransportMode,
    ) -> Result<Self, SolveError> {
        let mut costs = Vec::with_capacity(patients.len());
        let mut etas = Vec::with_capacity(patients.len());
        let mut demands = Vec::with_capacity(patients.len());

        for patient in patients {
            let origin = patient.location.ok_or_else(|| {
                SolveError::Malformed(format!("patient {} has no location", patient.id))
            })?;
            let mut cost_row = Vec::with_capacity(facilities.len());
            let mut eta_row = Vec::with_capacity(facilities.len());
            for facility in facilities {
                let eta = eta_minutes(&origin, &facility.location, mode);
                cost_row.push(assignment_cost(patient, facility, eta));
                eta_row.push(eta);
            }
            costs.push(cost_row);
            etas.push(eta_row);
            demands.push(patient.required_resources.clone());
        }

        Ok(Self {
            costs,
            etas,
            facility_ids: facilities.iter().map(|f| f.id.clone()).collect(),
            demands,
            capacities: facilities.iter().map(|f| f.resources.clone()).collect(),
            excluded: BTreeSet::new(),
        })
    }

    /// Single-patient convenience constructor.
    pub fn for_single_patient(
        patient: &Patient,
        facilities: &[Facility],
        mode: TransportMode,
    ) -> Result<Self, SolveError> {
        Self::build(&[patient], facilities, mode)
    }

    pub fn n_patients(&self) -> usize {
        self.costs.len()
    }

    pub fn n_facilities(&self) -> usize {
        self.facility_ids.len()
    }

    /// Forbid assigning patient `p` to facility `f` (constraint C3).
    pub fn exclude(&mut self, p: usize, f: usize) {
        self.excluded.insert((p, f));
    }

    pub fn is_excluded(&self, p: usize, f: usize) -> bool {
        self.excluded.contains(&(p, f))
    }

    /// Whether facility `f` could cover patient `p`'s demand with the
    /// whole facility to itself. Necessary (not sufficient) for any
    /// feasible assignment containing (p, f).
    pub fn column_fits_alone(&self, p: usize, f: usize) -> bool {
        self.demands[p].iter().all(|(&res, &required)| {
            required == 0 || self.capacities[f].get(&res).copied().unwrap_or(0) >= required
        })
    }

    /// Facility indices for patient `p` in rank-key order (cost, then ETA,
    /// then facility id). This is the mandated deterministic candidate
    /// order for every backend.
    pub fn rank_order(&self, p: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.n_facilities()).collect();
        order.sort_by(|&a, &b| self.rank_key(p, a).cmp(&self.rank_key(p, b)));
        order
    }

    pub(crate) fn rank_key(&self, p: usize, f: usize) -> RankKey<'_> {
        RankKey {
            cost: self.costs[p][f],
            eta_minutes: self.etas[p][f],
            facility_id: &self.facility_ids[f],
        }
    }

    /// Structural checks shared by all backends.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.etas.len() != self.n_patients() || self.demands.len() != self.n_patients() {
            return Err(SolveError::Malformed(
                "patient axis lengths disagree".into(),
            ));
        }
        for (p, row) in self.costs.iter().enumerate() {
            if row.len() != self.n_facilities() || self.etas[p].len() != self.n_facilities() {
                return Err(SolveError::Malformed(format!(
                    "row {} does not span the facility axis",
                    p
                )));
            }
            for (f, &cost) in row.iter().enumerate() {
                if !cost.is_finite() || cost < 0.0 {
                    return Err(SolveError::Malformed(format!(
                        "cost[{}][{}] = {} is not a finite non-negative value",
                        p, f, cost
                    )));
                }
            }
        }
        Ok(())
    }
}
