//! Tier selection constraints
//!
//! Per carrier-year: a one-hot over the tier selection binaries, Big-M gates
//! tying every per-tier shipment variable to its selection binary, and volume
//! bands placing the carrier-year total between the selected tier's threshold
//! and the next tier's threshold. The per-tier quantity split keeps the
//! discounted cost affine; the bands make the earned tier the only selectable
//! one.

use good_lp::Expression;

use crate::{
    model::{
        ModelError, capacity_index, quantity_bound,
        state::{ConstraintFamily, ModelState},
        variables::VariableRegistry,
    },
    scenario::{
        Scenario,
        nodes::{Node, NodeKey},
    },
};

/// Record the tier selection constraints for every tiered node.
pub(crate) fn apply(
    scenario: &Scenario,
    registry: &VariableRegistry,
    state: &mut ModelState,
) -> Result<(), ModelError> {
    let capacities = capacity_index(scenario);

    for (node_key, node) in scenario.nodes() {
        if !node.tiers().is_tiered() {
            continue;
        }

        let total_capacity = outgoing_capacity(scenario, node_key, node)?;

        for year in 0..scenario.years().len() {
            let selections: Vec<_> = registry.selection_vars(year, node_key).collect();

            // Exactly one earned discount tier may be active per year.
            let one_hot: Expression = selections.iter().map(|sv| sv.var).sum();
            state.add_eq(ConstraintFamily::TierSelection, one_hot, 1.0);

            for selection in selections {
                let mut volume = Expression::default();

                for shipment in registry.tier_vars(year, node_key, selection.tier) {
                    let capacity = capacities
                        .get(&(shipment.node, shipment.destination))
                        .copied()
                        .ok_or(ModelError::InvariantViolation {
                            message: "shipment variable has no backing route",
                        })?;

                    // Shipments can only occur at the selected tier.
                    let gate = Expression::from(shipment.var)
                        - selection.var * quantity_bound(capacity)?;
                    state.add_leq(ConstraintFamily::TierSelection, gate, 0.0);

                    volume += shipment.var;
                }

                let tier = node.tiers().get(selection.tier).ok_or(
                    ModelError::InvariantViolation {
                        message: "selection variable has no backing tier",
                    },
                )?;

                // The selected tier's threshold must be met...
                let floor = volume.clone()
                    - selection.var * quantity_bound(tier.min_volume())?;
                state.add_geq(ConstraintFamily::TierSelection, floor, 0.0);

                // ...and the next threshold must not be reached, so the
                // selected tier is always the greatest earned one. The top
                // tier is only bounded by the node's outgoing capacity.
                let upper = match node.tiers().next_threshold(selection.tier) {
                    Some(next) => next - 1,
                    None => total_capacity,
                };

                let ceiling = volume - selection.var * quantity_bound(upper)?;
                state.add_leq(ConstraintFamily::TierSelection, ceiling, 0.0);
            }
        }
    }

    Ok(())
}

/// Total capacity leaving a node, the Big-M for its top tier volume.
fn outgoing_capacity(
    scenario: &Scenario,
    node_key: NodeKey,
    node: &Node,
) -> Result<u64, ModelError> {
    scenario
        .routes_from(node_key)
        .try_fold(0_u64, |sum, route| sum.checked_add(route.capacity()))
        .ok_or_else(|| ModelError::BigMOverflow {
            node: node.id().to_owned(),
        })
}
