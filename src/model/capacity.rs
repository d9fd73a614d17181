//! Capacity constraints
//!
//! Per route and year, the quantities carried across all tiers must fit the
//! route's capacity.

use good_lp::Expression;

use crate::{
    model::{
        ModelError, quantity_bound,
        state::{ConstraintFamily, ModelState},
        variables::VariableRegistry,
    },
    scenario::Scenario,
};

/// Record the per-route capacity constraints.
pub(crate) fn apply(
    scenario: &Scenario,
    registry: &VariableRegistry,
    state: &mut ModelState,
) -> Result<(), ModelError> {
    for year in 0..scenario.years().len() {
        for route in scenario.routes() {
            let carried: Expression = registry
                .route_vars(year, route.node(), route.destination())
                .map(|sv| sv.var)
                .sum();

            state.add_leq(
                ConstraintFamily::Capacity,
                carried,
                quantity_bound(route.capacity())?,
            );
        }
    }

    Ok(())
}
