//! Model Builder
//!
//! Turns a validated [`Scenario`](crate::scenario::Scenario) into an opaque
//! MILP: decision variables, recorded linear constraints, and a minimisation
//! objective. Each constraint family lives in its own module. The scenario is
//! already well-formed when it arrives here, so assembly can only fail with a
//! defect-class [`ModelError`].

use std::fmt;

use good_lp::{Expression, ProblemVariables};
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    model::{
        state::{ModelState, RecordedConstraint},
        variables::VariableRegistry,
    },
    scenario::{Scenario, destinations::DestinationKey, nodes::NodeKey},
};

pub(crate) mod activation;
pub(crate) mod capacity;
pub(crate) mod delivery;
pub(crate) mod fulfillment;
pub(crate) mod state;
pub(crate) mod tiers;
pub(crate) mod variables;

/// Defect-class errors raised while assembling or interpreting a model.
///
/// These indicate a bug or a pathological input magnitude, not a property of
/// the allocation problem; they are never turned into a diagnosis.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A money amount in minor units cannot be represented exactly as a
    /// solver coefficient.
    #[error(
        "cost amount in minor units cannot be represented exactly as a solver coefficient: {minor_units}"
    )]
    MinorUnitsNotRepresentable {
        /// The amount in minor units
        minor_units: i64,
    },

    /// A shipment quantity bound cannot be represented exactly as a solver
    /// coefficient.
    #[error("quantity cannot be represented exactly as a solver coefficient: {quantity}")]
    QuantityNotRepresentable {
        /// The quantity
        quantity: u64,
    },

    /// A tier-discounted cost coefficient cannot be represented as a finite
    /// solver value.
    #[error("discounted cost coefficient for {minor_units} minor units cannot be represented")]
    DiscountedCoefficientNotRepresentable {
        /// The undiscounted amount in minor units
        minor_units: i64,
    },

    /// A constraint bound cannot be represented as a finite solver value.
    #[error("constraint bound {bound} cannot be represented as a solver value")]
    BoundNotRepresentable {
        /// The bound
        bound: Decimal,
    },

    /// A node's total outgoing capacity overflows the Big-M derivation.
    #[error("total outgoing capacity of node {node:?} overflows the tier volume bound")]
    BigMOverflow {
        /// The node id
        node: String,
    },

    /// Internal model invariant was violated (this is a bug).
    #[error("model invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// The assembled optimization problem, handed opaquely to the solver adapter.
pub struct AssembledModel {
    pub(crate) pb: ProblemVariables,
    pub(crate) objective: Expression,
    pub(crate) constraints: Vec<RecordedConstraint>,
    pub(crate) registry: VariableRegistry,
}

impl fmt::Debug for AssembledModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssembledModel")
            .field("pb", &"<ProblemVariables>")
            .field("objective", &"<Expression>")
            .field(
                "constraints",
                &format!("[{} constraints]", self.constraints.len()),
            )
            .field(
                "variables",
                &format!("[{} variables]", self.registry.variable_count()),
            )
            .finish()
    }
}

/// Assemble the MILP for one scenario.
pub(crate) fn assemble(scenario: &Scenario) -> Result<AssembledModel, ModelError> {
    let mut state = ModelState::new();

    let registry = variables::create(scenario, &mut state)?;

    capacity::apply(scenario, &registry, &mut state)?;
    fulfillment::apply(scenario, &registry, &mut state)?;
    activation::apply(scenario, &registry, &mut state)?;
    delivery::apply(scenario, &registry, &mut state)?;
    tiers::apply(scenario, &registry, &mut state)?;

    let (pb, objective, constraints) = state.into_parts();

    Ok(AssembledModel {
        pb,
        objective,
        constraints,
        registry,
    })
}

/// Convert an `i64` to an `f64` if it can be represented exactly.
pub(crate) fn i64_to_f64_exact(v: i64) -> Option<f64> {
    let f = v.to_f64()?;

    (f.to_i64() == Some(v)).then_some(f)
}

/// Convert a `u64` to an `f64` if it can be represented exactly.
pub(crate) fn u64_to_f64_exact(v: u64) -> Option<f64> {
    let f = v.to_f64()?;

    (f.to_u64() == Some(v)).then_some(f)
}

/// Objective coefficient for an undiscounted money amount.
///
/// `good_lp` stores coefficients as `f64`. Only integers with absolute value
/// <= 2^53 can be represented exactly in an IEEE-754 `f64` mantissa; enforce
/// that via a round-trip check so we never silently change the objective.
pub(crate) fn minor_units_coefficient(minor_units: i64) -> Result<f64, ModelError> {
    i64_to_f64_exact(minor_units).ok_or(ModelError::MinorUnitsNotRepresentable { minor_units })
}

/// Objective coefficient for a tier-discounted money amount.
pub(crate) fn discounted_coefficient(
    minor_units: i64,
    multiplier: Decimal,
) -> Result<f64, ModelError> {
    if multiplier == Decimal::ONE {
        return minor_units_coefficient(minor_units);
    }

    Decimal::from_i64(minor_units)
        .and_then(|minor| minor.checked_mul(multiplier))
        .and_then(|coefficient| coefficient.to_f64())
        .filter(|coefficient| coefficient.is_finite())
        .ok_or(ModelError::DiscountedCoefficientNotRepresentable { minor_units })
}

/// Constraint bound for a whole shipment quantity.
pub(crate) fn quantity_bound(quantity: u64) -> Result<f64, ModelError> {
    u64_to_f64_exact(quantity).ok_or(ModelError::QuantityNotRepresentable { quantity })
}

/// Constraint bound for a decimal quantity.
pub(crate) fn decimal_bound(bound: Decimal) -> Result<f64, ModelError> {
    bound
        .to_f64()
        .filter(|value| value.is_finite())
        .ok_or(ModelError::BoundNotRepresentable { bound })
}

/// Per-route capacity lookup keyed by (node, destination).
pub(crate) fn capacity_index(scenario: &Scenario) -> FxHashMap<(NodeKey, DestinationKey), u64> {
    scenario
        .routes()
        .iter()
        .map(|route| ((route.node(), route.destination()), route.capacity()))
        .collect()
}
