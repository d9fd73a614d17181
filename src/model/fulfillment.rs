//! Fulfillment constraints
//!
//! Per destination-year, the quantity arriving must hit the exact target or
//! stay inside the share tolerance band; per year, all quantities must sum to
//! the declared total.

use good_lp::Expression;

use crate::{
    model::{
        ModelError, decimal_bound, quantity_bound,
        state::{ConstraintFamily, ModelState},
        variables::VariableRegistry,
    },
    scenario::{DemandTarget, Scenario},
};

/// Record the fulfillment constraints.
pub(crate) fn apply(
    scenario: &Scenario,
    registry: &VariableRegistry,
    state: &mut ModelState,
) -> Result<(), ModelError> {
    for (year, demand) in scenario.years().iter().enumerate() {
        for (destination, target) in demand.targets() {
            let arriving: Expression = registry
                .destination_vars(year, *destination)
                .map(|sv| sv.var)
                .sum();

            match target {
                DemandTarget::Exact(quantity) => {
                    state.add_eq(
                        ConstraintFamily::Fulfillment,
                        arriving,
                        quantity_bound(*quantity)?,
                    );
                }
                DemandTarget::Share { .. } => {
                    let bounds = target.bounds(demand.total_shipments());

                    state.add_geq(
                        ConstraintFamily::Fulfillment,
                        arriving.clone(),
                        decimal_bound(bounds.lower)?,
                    );
                    state.add_leq(
                        ConstraintFamily::Fulfillment,
                        arriving,
                        decimal_bound(bounds.upper)?,
                    );
                }
            }
        }

        let year_total: Expression = registry.year_vars(year).map(|sv| sv.var).sum();

        state.add_eq(
            ConstraintFamily::Fulfillment,
            year_total,
            quantity_bound(demand.total_shipments())?,
        );
    }

    Ok(())
}
