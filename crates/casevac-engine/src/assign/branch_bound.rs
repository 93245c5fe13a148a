//! Deterministic depth-first branch-and-bound backend.
//!
//! Patients are branched in input order; facilities are tried in rank-key
//! order. The incumbent is replaced only on strict improvement, so among
//! equal-objective assignments the first one reached, the rank-key
//! minimum, always wins. That makes the backend's output a function of
//! the problem alone.

use std::time::Duration;

use hashbrown::HashMap;
use tracing::{debug, warn};
use web_time::Instant;

use casevac_core::Resource;

use super::problem::AssignmentProblem;
use super::solution::AssignmentSolution;
use super::traits::{AssignmentBackend, SolveConfig, SolveError, SolverStatus};

/// Exhaustive branch-and-bound over the assignment tree.
///
/// Exact for any instance size; the deadline bounds the search on large
/// batches, in which case the best incumbent is returned as FEASIBLE.
#[derive(Debug, Default)]
pub struct BranchBoundBackend;

impl AssignmentBackend for BranchBoundBackend {
    fn id(&self) -> &str {
        "branch-bound"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn solve(
        &self,
        problem: &AssignmentProblem,
        config: &SolveConfig,
    ) -> Result<AssignmentSolution, SolveError> {
        problem.validate()?;
        let start = Instant::now();
        let n = problem.n_patients();

        if n == 0 {
            return Ok(AssignmentSolution {
                status: SolverStatus::Optimal,
                objective: 0.0,
                assignment: Vec::new(),
                nodes_explored: 0,
                solve_time: start.elapsed(),
            });
        }
        if problem.n_facilities() == 0 {
            return Ok(AssignmentSolution::unassigned(
                n,
                SolverStatus::Infeasible,
                start.elapsed(),
            ));
        }

        let orders: Vec<Vec<usize>> = (0..n).map(|p| problem.rank_order(p)).collect();

        // Per-patient minimum over admissible columns; the suffix sums are
        // an admissible completion bound (capacity coupling ignored).
        let mut min_costs = vec![f64::INFINITY; n];
        for p in 0..n {
            for f in 0..problem.n_facilities() {
                if !problem.is_excluded(p, f) {
                    min_costs[p] = min_costs[p].min(problem.costs[p][f]);
                }
            }
            if min_costs[p].is_infinite() {
                // Every column excluded: C1 cannot hold
                return Ok(AssignmentSolution::unassigned(
                    n,
                    SolverStatus::Infeasible,
                    start.elapsed(),
                ));
            }
        }
        let mut tail_lb = vec![0.0; n + 1];
        for p in (0..n).rev() {
            tail_lb[p] = tail_lb[p + 1] + min_costs[p];
        }

        let mut search = Search {
            problem,
            orders: &orders,
            tail_lb: &tail_lb,
            remaining: problem
                .capacities
                .iter()
                .map(|caps| caps.iter().map(|(&r, &c)| (r, c)).collect())
                .collect(),
            chosen: Vec::with_capacity(n),
            best: None,
            nodes: 0,
            timed_out: false,
            start,
            deadline: Duration::from_millis(config.deadline_ms),
        };
        search.dfs(0, 0.0);

        let status = match (&search.best, search.timed_out) {
            (Some(_), false) => SolverStatus::Optimal,
            (Some(_), true) => SolverStatus::Feasible,
            (None, false) => SolverStatus::Infeasible,
            (None, true) => SolverStatus::Unknown,
        };
        if search.timed_out {
            warn!(
                deadline_ms = config.deadline_ms,
                nodes = search.nodes,
                "assignment solve hit the deadline"
            );
        }
        debug!(
            %status,
            nodes = search.nodes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "branch-and-bound finished"
        );

        Ok(match search.best {
            Some((objective, chosen)) => AssignmentSolution {
                status,
                objective,
                assignment: chosen.into_iter().map(Some).collect(),
                nodes_explored: search.nodes,
                solve_time: start.elapsed(),
            },
            None => {
                let mut sol = AssignmentSolution::unassigned(n, status, start.elapsed());
                sol.nodes_explored = search.nodes;
                sol
            }
        })
    }
}

struct Search<'a> {
    problem: &'a AssignmentProblem,
    orders: &'a [Vec<usize>],
    tail_lb: &'a [f64],
    remaining: Vec<HashMap<Resource, u32>>,
    chosen: Vec<usize>,
    best: Option<(f64, Vec<usize>)>,
    nodes: usize,
    timed_out: bool,
    start: Instant,
    deadline: Duration,
}

impl Search<'_> {
    fn fits(&self, p: usize, f: usize) -> bool {
        self.problem.demands[p].iter().all(|(&res, &required)| {
            required == 0 || self.remaining[f].get(&res).copied().unwrap_or(0) >= required
        })
    }

    fn take(&mut self, p: usize, f: usize) {
        for (&res, &required) in &self.problem.demands[p] {
            if required > 0 {
                if let Some(capacity) = self.remaining[f].get_mut(&res) {
                    *capacity -= required;
                }
            }
        }
    }

    fn restore(&mut self, p: usize, f: usize) {
        for (&res, &required) in &self.problem.demands[p] {
            if required > 0 {
                *self.remaining[f].entry(res).or_insert(0) += required;
            }
        }
    }

    fn dfs(&mut self, p: usize, cost_so_far: f64) {
        self.nodes += 1;
        if self.start.elapsed() >= self.deadline {
            self.timed_out = true;
            return;
        }

        if p == self.problem.n_patients() {
            let improves = self
                .best
                .as_ref()
                .map_or(true, |(incumbent, _)| cost_so_far < *incumbent);
            if improves {
                self.best = Some((cost_so_far, self.chosen.clone()));
            }
            return;
        }

        for &f in &self.orders[p] {
            if self.problem.is_excluded(p, f) {
                continue;
            }
            let cost = self.problem.costs[p][f];
            if let Some((incumbent, _)) = &self.best {
                // Columns are rank-ordered, so costs are non-decreasing:
                // once the bound fails it fails for the rest of the row.
                if cost_so_far + cost + self.tail_lb[p + 1] >= *incumbent {
                    break;
                }
            }
            if !self.fits(p, f) {
                continue;
            }
            self.take(p, f);
            self.chosen.push(f);
            self.dfs(p + 1, cost_so_far + cost);
            self.chosen.pop();
            self.restore(p, f);
            if self.timed_out {
                return;
            }
        }
    }
}
