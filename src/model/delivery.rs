//! Delivery tolerance constraints
//!
//! Per year, the quantity carried on routes slower than the delivery target
//! may not exceed the tolerated fraction of the year's total shipments.

use good_lp::{Expression, Variable};
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use crate::{
    model::{
        ModelError, decimal_bound,
        state::{ConstraintFamily, ModelState},
        variables::VariableRegistry,
    },
    scenario::{Scenario, destinations::DestinationKey, nodes::NodeKey},
};

/// Record the late-shipment constraints.
pub(crate) fn apply(
    scenario: &Scenario,
    registry: &VariableRegistry,
    state: &mut ModelState,
) -> Result<(), ModelError> {
    let Some(policy) = scenario.delivery() else {
        return Ok(());
    };

    let late_routes: FxHashSet<(NodeKey, DestinationKey)> = scenario
        .routes()
        .iter()
        .filter(|route| route.is_late(policy.target_days()))
        .map(|route| (route.node(), route.destination()))
        .collect();

    if late_routes.is_empty() {
        return Ok(());
    }

    for (year, demand) in scenario.years().iter().enumerate() {
        let late_vars: Vec<Variable> = registry
            .year_vars(year)
            .filter(|sv| late_routes.contains(&(sv.node, sv.destination)))
            .map(|sv| sv.var)
            .collect();

        if late_vars.is_empty() {
            continue;
        }

        let late_total: Expression = late_vars.into_iter().sum();
        let allowance =
            policy.tolerance_decimal() * Decimal::from(demand.total_shipments());

        state.add_leq(
            ConstraintFamily::Delivery,
            late_total,
            decimal_bound(allowance)?,
        );
    }

    Ok(())
}
