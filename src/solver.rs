//! Optimizer
//!
//! End-to-end orchestration of one optimization run: pre-solve diagnostics,
//! model assembly, the solver invocation, and either plan extraction or
//! post-solve diagnosis. Model-level failures never escape as errors; they
//! resolve to a [`Diagnosis`] for the presentation layer to render.

use crate::{
    diagnostics::{self, Diagnosis},
    model::{self, ModelError},
    plan::{self, SolutionReport},
    scenario::Scenario,
    solver::adapter::{SolveOutcome, SolveStatus},
};

pub(crate) mod adapter;

pub use adapter::SolveLimits;

/// Binary threshold for determining truthiness
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Result of one optimization run.
#[derive(Debug)]
pub enum Outcome {
    /// The solver proved optimality; the plan was extracted.
    Optimal(SolutionReport),

    /// The model could not be solved; the diagnosis says why.
    Diagnosed(Diagnosis),
}

impl Outcome {
    /// Return the solution report, if the run was optimal.
    pub fn report(&self) -> Option<&SolutionReport> {
        match self {
            Self::Optimal(report) => Some(report),
            Self::Diagnosed(_) => None,
        }
    }

    /// Return the diagnosis, if the run failed.
    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            Self::Optimal(_) => None,
            Self::Diagnosed(diagnosis) => Some(diagnosis),
        }
    }
}

/// Solve one scenario to optimality or a diagnosis.
///
/// Pre-solve checks run first: a scenario whose capacities cannot possibly
/// meet its targets is diagnosed without invoking the solver at all.
///
/// # Errors
///
/// Returns a [`ModelError`] only for defect-class assembly or extraction
/// failures; every model-level failure (infeasible, unbounded, timeout,
/// not solved) is reported as [`Outcome::Diagnosed`] instead.
pub fn optimize(scenario: &Scenario, limits: &SolveLimits) -> Result<Outcome, ModelError> {
    let findings = diagnostics::preflight(scenario);

    if let Some(diagnosis) = diagnostics::diagnose_findings(&findings) {
        return Ok(Outcome::Diagnosed(diagnosis));
    }

    let assembled = model::assemble(scenario)?;
    let SolveOutcome { status, registry } = adapter::run(assembled, limits);

    let outcome = match status {
        SolveStatus::Optimal { values, objective } => {
            Outcome::Optimal(plan::extract(scenario, &registry, &values, objective)?)
        }
        SolveStatus::Infeasible => Outcome::Diagnosed(diagnostics::diagnose_infeasible(scenario)),
        SolveStatus::Unbounded => Outcome::Diagnosed(diagnostics::diagnose_unbounded(scenario)),
        SolveStatus::TimedOut { budget } => Outcome::Diagnosed(diagnostics::diagnose_timeout(budget)),
        SolveStatus::NotSolved { reason } => {
            Outcome::Diagnosed(diagnostics::diagnose_not_solved(&reason))
        }
    };

    Ok(outcome)
}
