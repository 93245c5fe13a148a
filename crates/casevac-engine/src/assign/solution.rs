//! Assignment solution data structures.

use std::time::Duration;

use super::traits::SolverStatus;

/// Outcome of one assignment solve.
#[derive(Debug, Clone)]
pub struct AssignmentSolution {
    pub status: SolverStatus,
    /// Objective value of the returned assignment; infinite when no
    /// assignment was found.
    pub objective: f64,
    /// Chosen facility index per patient; `None` entries only appear for
    /// statuses without an assignment.
    pub assignment: Vec<Option<usize>>,
    /// Search nodes explored (0 for non-enumerative backends).
    pub nodes_explored: usize,
    pub solve_time: Duration,
}

impl AssignmentSolution {
    /// A solution carrying no assignment (infeasible or unknown).
    pub fn unassigned(n_patients: usize, status: SolverStatus, solve_time: Duration) -> Self {
        Self {
            status,
            objective: f64::INFINITY,
            assignment: vec![None; n_patients],
            nodes_explored: 0,
            solve_time,
        }
    }

    /// True when every patient received a facility.
    pub fn is_complete(&self) -> bool {
        self.assignment.iter().all(|a| a.is_some())
    }

    /// Format a human-readable summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Assignment Solution ({})\n", self.status));
        if self.objective.is_finite() {
            s.push_str(&format!("Objective: {:.2}\n", self.objective));
        }
        s.push_str(&format!(
            "Assigned: {}/{}\n",
            self.assignment.iter().filter(|a| a.is_some()).count(),
            self.assignment.len()
        ));
        s.push_str(&format!("Nodes: {}\n", self.nodes_explored));
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_shape() {
        let sol = AssignmentSolution::unassigned(3, SolverStatus::Infeasible, Duration::ZERO);
        assert_eq!(sol.assignment, vec![None, None, None]);
        assert!(!sol.is_complete());
        assert!(sol.objective.is_infinite());
    }

    #[test]
    fn test_summary_mentions_status() {
        let sol = AssignmentSolution {
            status: SolverStatus::Optimal,
            objective: 123.456,
            assignment: vec![Some(2)],
            nodes_explored: 7,
            solve_time: Duration::from_millis(3),
        };
        let summary = sol.summary();
        assert!(summary.contains("OPTIMAL"));
        assert!(summary.contains("123.46"));
        assert!(summary.contains("Assigned: 1/1"));
    }
}
