//! LP-relaxation backend using good_lp with the Clarabel solver.
//!
//! Binary variables are relaxed to `[0, 1]`. Before the relaxation is
//! built, every column that is excluded or cannot cover its patient's
//! demand alone is dropped (fixed to zero). For unit-demand single-patient
//! instances this makes the relaxation exact: the feasible region is the
//! assignment simplex over admissible columns, whose vertices are
//! integral. Multi-patient batches with tight shared capacity can still
//! relax fractionally; the branch-and-bound backend is the right tool
//! there, and this backend reports the condition as an error rather than
//! rounding heuristically.
//!
//! Extraction re-selects among ε-optimal columns with the rank key, so the
//! returned assignment is identical to the branch-and-bound backend's.

use good_lp::solvers::clarabel::clarabel;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use tracing::debug;
use web_time::Instant;

use casevac_core::Resource;

use super::problem::AssignmentProblem;
use super::solution::AssignmentSolution;
use super::traits::{AssignmentBackend, SolveConfig, SolveError, SolverStatus};

#[derive(Debug, Default)]
pub struct ClarabelBackend;

impl AssignmentBackend for ClarabelBackend {
    fn id(&self) -> &str {
        "clarabel"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn solve(
        &self,
        problem: &AssignmentProblem,
        _config: &SolveConfig,
    ) -> Result<AssignmentSolution, SolveError> {
        problem.validate()?;
        let start = Instant::now();
        let n = problem.n_patients();
        let nf = problem.n_facilities();

        if n == 0 {
            return Ok(AssignmentSolution {
                status: SolverStatus::Optimal,
                objective: 0.0,
                assignment: Vec::new(),
                nodes_explored: 0,
                solve_time: start.elapsed(),
            });
        }

        // === LP Relaxation ===
        // x[p][f] ∈ [0,1] for admissible columns only; excluded and
        // capacity-violating columns are fixed to zero by omission.
        let mut vars = variables!();
        let mut cols: Vec<Vec<Option<Variable>>> = vec![vec![None; nf]; n];
        let mut objective = Expression::from(0.0);
        for p in 0..n {
            for f in 0..nf {
                if problem.is_excluded(p, f) || !problem.column_fits_alone(p, f) {
                    continue;
                }
                let x = vars.add(variable().min(0.0).max(1.0));
                objective += problem.costs[p][f] * x;
                cols[p][f] = Some(x);
            }
        }

        // C1 cannot hold for a patient with no admissible column
        if cols.iter().any(|row| row.iter().all(Option::is_none)) {
            return Ok(AssignmentSolution::unassigned(
                n,
                SolverStatus::Infeasible,
                start.elapsed(),
            ));
        }

        let mut model = vars.minimise(objective).using(clarabel);

        // C1: each patient is assigned exactly once
        for row in &cols {
            let mut total = Expression::from(0.0);
            for x in row.iter().flatten() {
                total += *x;
            }
            model = model.with(constraint!(total == 1.0));
        }

        // C2: shared facility capacity per resource
        for f in 0..nf {
            for res in Resource::ALL {
                let mut used = Expression::from(0.0);
                let mut any = false;
                for p in 0..n {
                    let required = problem.demands[p].get(&res).copied().unwrap_or(0);
                    if required == 0 {
                        continue;
                    }
                    if let Some(x) = cols[p][f] {
                        used += required as f64 * x;
                        any = true;
                    }
                }
                if any {
                    let capacity = problem.capacities[f].get(&res).copied().unwrap_or(0);
                    model = model.with(constraint!(used <= capacity as f64));
                }
            }
        }

        let lp = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                return Ok(AssignmentSolution::unassigned(
                    n,
                    SolverStatus::Infeasible,
                    start.elapsed(),
                ));
            }
            Err(other) => return Err(SolveError::Backend(format!("{:?}", other))),
        };

        let mut relaxed_objective = 0.0;
        for p in 0..n {
            for f in 0..nf {
                if let Some(x) = cols[p][f] {
                    relaxed_objective += problem.costs[p][f] * lp.value(x);
                }
            }
        }

        // === Extraction ===
        let mut assignment: Vec<Option<usize>> = vec![None; n];
        if n == 1 {
            // Deterministic ε-optimal re-selection: among admissible
            // columns whose cost matches the relaxed optimum, take the
            // rank-key minimum. Backend-independent by construction.
            let eps = 1e-4 * relaxed_objective.abs().max(1.0);
            for f in problem.rank_order(0) {
                if cols[0][f].is_some() && problem.costs[0][f] <= relaxed_objective + eps {
                    assignment[0] = Some(f);
                    break;
                }
            }
        } else {
            for p in 0..n {
                let mut best_value = f64::NEG_INFINITY;
                let mut best_f = None;
                for f in problem.rank_order(p) {
                    if let Some(x) = cols[p][f] {
                        let value = lp.value(x);
                        if value > best_value + 1e-9 {
                            best_value = value;
                            best_f = Some(f);
                        }
                    }
                }
                assignment[p] = best_f;
            }
            verify_integral(problem, &assignment)?;
        }

        let Some(objective) = assignment
            .iter()
            .enumerate()
            .map(|(p, f)| f.map(|f| problem.costs[p][f]))
            .sum::<Option<f64>>()
        else {
            return Err(SolveError::Backend(
                "relaxation produced no extractable assignment".into(),
            ));
        };

        debug!(
            objective,
            relaxed_objective,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "clarabel relaxation finished"
        );

        Ok(AssignmentSolution {
            status: SolverStatus::Optimal,
            objective,
            assignment,
            nodes_explored: 0,
            solve_time: start.elapsed(),
        })
    }
}

/// Confirm a rounded multi-patient assignment respects shared capacity.
fn verify_integral(
    problem: &AssignmentProblem,
    assignment: &[Option<usize>],
) -> Result<(), SolveError> {
    let mut remaining = problem.capacities.clone();
    for (p, chosen) in assignment.iter().enumerate() {
        let Some(f) = chosen else {
            return Err(SolveError::Backend(format!(
                "patient row {} lost its column during extraction",
                p
            )));
        };
        for (&res, &required) in &problem.demands[p] {
            if required == 0 {
                continue;
            }
            let capacity = remaining[*f].entry(res).or_insert(0);
            if *capacity < required {
                return Err(SolveError::Backend(
                    "relaxation is fractional under shared capacity; \
                     use the branch-bound backend for batches"
                        .into(),
                ));
            }
            *capacity -= required;
        }
    }
    Ok(())
}
