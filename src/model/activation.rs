//! Activation linkage constraints
//!
//! A fixed-cost node's routes may only carry quantity while its activation
//! binary is set; the route capacity serves as the Big-M.

use good_lp::Expression;

use crate::{
    model::{
        ModelError, capacity_index, quantity_bound,
        state::{ConstraintFamily, ModelState},
        variables::VariableRegistry,
    },
    scenario::Scenario,
};

/// Record the activation linkage constraints.
pub(crate) fn apply(
    scenario: &Scenario,
    registry: &VariableRegistry,
    state: &mut ModelState,
) -> Result<(), ModelError> {
    let capacities = capacity_index(scenario);

    for activation in registry.activations() {
        for shipment in registry
            .shipments()
            .iter()
            .filter(|sv| sv.node == activation.node)
        {
            let capacity = capacities
                .get(&(shipment.node, shipment.destination))
                .copied()
                .ok_or(ModelError::InvariantViolation {
                    message: "shipment variable has no backing route",
                })?;

            let gate = Expression::from(shipment.var) - activation.var * quantity_bound(capacity)?;

            state.add_leq(ConstraintFamily::Activation, gate, 0.0);
        }
    }

    Ok(())
}
