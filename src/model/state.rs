//! Model State

use std::fmt;

use good_lp::{Expression, ProblemVariables, Variable};

/// Relation operator for a recorded linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintRelation {
    /// Equality (`lhs == rhs`)
    Eq,

    /// Less than or equal (`lhs <= rhs`)
    Leq,

    /// Greater than or equal (`lhs >= rhs`)
    Geq,
}

/// Which constraint family emitted a recorded constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintFamily {
    /// Per-route capacity bounds.
    Capacity,

    /// Per-destination-year fulfillment and year totals.
    Fulfillment,

    /// Fixed-cost activation linkage.
    Activation,

    /// Late-shipment service level.
    Delivery,

    /// Tier one-hot selection, gating, and volume bands.
    TierSelection,
}

/// Recorded linear constraint emitted during model construction.
#[derive(Debug, Clone)]
pub(crate) struct RecordedConstraint {
    /// Emitting family
    pub(crate) family: ConstraintFamily,

    /// Left-hand side expression
    pub(crate) lhs: Expression,

    /// Relation operator
    pub(crate) relation: ConstraintRelation,

    /// Right-hand side scalar
    pub(crate) rhs: f64,
}

/// Builder state for the model's variables, objective, and constraints.
pub(crate) struct ModelState {
    pb: ProblemVariables,
    objective: Expression,
    constraints: Vec<RecordedConstraint>,
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelState")
            .field("pb", &"<ProblemVariables>")
            .field("objective", &"<Expression>")
            .field(
                "constraints",
                &format!("[{} constraints]", self.constraints.len()),
            )
            .finish()
    }
}

impl ModelState {
    /// Create an empty state.
    pub(crate) fn new() -> Self {
        Self {
            pb: ProblemVariables::new(),
            objective: Expression::default(),
            constraints: Vec::new(),
        }
    }

    /// Mutable access to the problem variables, for adding decision variables.
    pub(crate) fn variables_mut(&mut self) -> &mut ProblemVariables {
        &mut self.pb
    }

    /// Add a term to the minimisation objective.
    pub(crate) fn add_to_objective(&mut self, var: Variable, coefficient: f64) {
        self.objective += var * coefficient;
    }

    /// Record an equality constraint.
    pub(crate) fn add_eq(&mut self, family: ConstraintFamily, lhs: Expression, rhs: f64) {
        self.constraints.push(RecordedConstraint {
            family,
            lhs,
            relation: ConstraintRelation::Eq,
            rhs,
        });
    }

    /// Record a less-than-or-equal constraint.
    pub(crate) fn add_leq(&mut self, family: ConstraintFamily, lhs: Expression, rhs: f64) {
        self.constraints.push(RecordedConstraint {
            family,
            lhs,
            relation: ConstraintRelation::Leq,
            rhs,
        });
    }

    /// Record a greater-than-or-equal constraint.
    pub(crate) fn add_geq(&mut self, family: ConstraintFamily, lhs: Expression, rhs: f64) {
        self.constraints.push(RecordedConstraint {
            family,
            lhs,
            relation: ConstraintRelation::Geq,
            rhs,
        });
    }

    /// Number of recorded constraints from one family.
    pub(crate) fn family_len(&self, family: ConstraintFamily) -> usize {
        self.constraints
            .iter()
            .filter(|constraint| constraint.family == family)
            .count()
    }

    /// Extract the problem variables, objective, and recorded constraints.
    pub(crate) fn into_parts(self) -> (ProblemVariables, Expression, Vec<RecordedConstraint>) {
        (self.pb, self.objective, self.constraints)
    }
}
