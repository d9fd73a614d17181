//! Solver Adapter
//!
//! The pure translation boundary between the assembled model and the
//! `good_lp` backend selected by cargo feature. Submits the model under a
//! wall-clock budget, translates the backend's resolution outcome into the
//! internal status taxonomy, and captures variable values into a plain map so
//! no backend type escapes. Contains no constraint or discount logic.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use good_lp::{Constraint, ResolutionError, Solution, SolverModel, Variable};

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(not(feature = "solver-highs"), feature = "solver-microlp"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::model::{
    AssembledModel,
    state::{ConstraintRelation, RecordedConstraint},
    variables::VariableRegistry,
};

/// Bounds on one solver invocation.
///
/// The time budget is the sole cancellation mechanism: the bundled backend
/// exposes no in-process interruption hook, so an over-budget failure is
/// classified as a timeout at this boundary rather than retried.
#[derive(Debug, Clone, Copy)]
pub struct SolveLimits {
    time_limit: Duration,
}

impl SolveLimits {
    /// Create limits with the given time budget.
    #[must_use]
    pub fn new(time_limit: Duration) -> Self {
        Self { time_limit }
    }

    /// Return the time budget.
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Internal solver status taxonomy.
#[derive(Debug)]
pub(crate) enum SolveStatus {
    /// The backend proved optimality.
    Optimal {
        /// Solved value of every registered variable
        values: HashMap<Variable, f64>,

        /// Objective value at the optimum
        objective: f64,
    },

    /// The constraints are mutually unsatisfiable.
    Infeasible,

    /// The objective can be improved without bound.
    Unbounded,

    /// The backend failed after exhausting the time budget.
    TimedOut {
        /// The exhausted budget
        budget: Duration,
    },

    /// The backend stopped without a verdict, within budget.
    NotSolved {
        /// The backend's own message
        reason: String,
    },
}

/// One solve attempt: the status plus the registry for interpretation.
#[derive(Debug)]
pub(crate) struct SolveOutcome {
    /// Translated status
    pub(crate) status: SolveStatus,

    /// Variable registry carried through for plan extraction
    pub(crate) registry: VariableRegistry,
}

/// Submit an assembled model to the backend.
pub(crate) fn run(model: AssembledModel, limits: &SolveLimits) -> SolveOutcome {
    let AssembledModel {
        pb,
        objective,
        constraints,
        registry,
    } = model;

    let mut problem = pb.minimise(objective.clone()).using(default_solver);

    for recorded in constraints {
        problem = problem.with(into_constraint(recorded));
    }

    let started = Instant::now();

    match problem.solve() {
        Ok(solution) => {
            let values: HashMap<Variable, f64> = registry
                .all_variables()
                .map(|var| (var, solution.value(var)))
                .collect();

            let objective = solution.eval(&objective);

            SolveOutcome {
                status: SolveStatus::Optimal { values, objective },
                registry,
            }
        }
        Err(error) => SolveOutcome {
            status: classify(error, started.elapsed(), limits),
            registry,
        },
    }
}

/// Translate a recorded constraint into a `good_lp` constraint.
fn into_constraint(recorded: RecordedConstraint) -> Constraint {
    match recorded.relation {
        ConstraintRelation::Eq => recorded.lhs.eq(recorded.rhs),
        ConstraintRelation::Leq => recorded.lhs.leq(recorded.rhs),
        ConstraintRelation::Geq => recorded.lhs.geq(recorded.rhs),
    }
}

/// Map a backend resolution error onto the internal taxonomy.
fn classify(error: ResolutionError, elapsed: Duration, limits: &SolveLimits) -> SolveStatus {
    match error {
        ResolutionError::Infeasible => SolveStatus::Infeasible,
        ResolutionError::Unbounded => SolveStatus::Unbounded,
        other => {
            if elapsed >= limits.time_limit() {
                SolveStatus::TimedOut {
                    budget: limits.time_limit(),
                }
            } else {
                SolveStatus::NotSolved {
                    reason: other.to_string(),
                }
            }
        }
    }
}
