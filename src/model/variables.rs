//! Decision variables
//!
//! Creates every decision variable and builds the objective as it goes: one
//! integer shipment variable per (year, node, tier, route), one binary tier
//! selection per (year, tiered node, tier), and one binary activation per
//! fixed-cost node. The registry maps solver variables back to the scenario
//! entities they stand for.

use good_lp::{Variable, variable};

use crate::{
    model::{
        ModelError, discounted_coefficient, minor_units_coefficient, quantity_bound,
        state::ModelState,
    },
    scenario::{Scenario, destinations::DestinationKey, nodes::NodeKey},
};

/// Integer shipment-count variable for one (year, node, tier, route).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ShipmentVar {
    /// Year index
    pub(crate) year: usize,

    /// Origin node
    pub(crate) node: NodeKey,

    /// Tier index within the node's schedule
    pub(crate) tier: usize,

    /// Destination
    pub(crate) destination: DestinationKey,

    /// The solver variable
    pub(crate) var: Variable,
}

/// Binary tier-selection variable for one (year, node, tier).
#[derive(Debug, Clone, Copy)]
pub(crate) struct SelectionVar {
    /// Year index
    pub(crate) year: usize,

    /// Carrier node
    pub(crate) node: NodeKey,

    /// Tier index within the node's schedule
    pub(crate) tier: usize,

    /// The solver variable
    pub(crate) var: Variable,
}

/// Binary activation variable for one fixed-cost node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActivationVar {
    /// The node
    pub(crate) node: NodeKey,

    /// The solver variable
    pub(crate) var: Variable,
}

/// Maps solver variables back to scenario entities, in creation order.
#[derive(Debug, Default)]
pub(crate) struct VariableRegistry {
    shipments: Vec<ShipmentVar>,
    selections: Vec<SelectionVar>,
    activations: Vec<ActivationVar>,
}

impl VariableRegistry {
    /// All shipment variables in creation order.
    pub(crate) fn shipments(&self) -> &[ShipmentVar] {
        &self.shipments
    }

    /// All tier selection variables in creation order.
    pub(crate) fn selections(&self) -> &[SelectionVar] {
        &self.selections
    }

    /// All activation variables in creation order.
    pub(crate) fn activations(&self) -> &[ActivationVar] {
        &self.activations
    }

    /// Shipment variables for one route in one year, across tiers.
    pub(crate) fn route_vars(
        &self,
        year: usize,
        node: NodeKey,
        destination: DestinationKey,
    ) -> impl Iterator<Item = &ShipmentVar> {
        self.shipments.iter().filter(move |sv| {
            sv.year == year && sv.node == node && sv.destination == destination
        })
    }

    /// Shipment variables arriving at one destination in one year.
    pub(crate) fn destination_vars(
        &self,
        year: usize,
        destination: DestinationKey,
    ) -> impl Iterator<Item = &ShipmentVar> {
        self.shipments
            .iter()
            .filter(move |sv| sv.year == year && sv.destination == destination)
    }

    /// Shipment variables for one year.
    pub(crate) fn year_vars(&self, year: usize) -> impl Iterator<Item = &ShipmentVar> {
        self.shipments.iter().filter(move |sv| sv.year == year)
    }

    /// Shipment variables for one (year, node, tier).
    pub(crate) fn tier_vars(
        &self,
        year: usize,
        node: NodeKey,
        tier: usize,
    ) -> impl Iterator<Item = &ShipmentVar> {
        self.shipments
            .iter()
            .filter(move |sv| sv.year == year && sv.node == node && sv.tier == tier)
    }

    /// Tier selection variables for one (year, node), in tier order.
    pub(crate) fn selection_vars(
        &self,
        year: usize,
        node: NodeKey,
    ) -> impl Iterator<Item = &SelectionVar> {
        self.selections
            .iter()
            .filter(move |sv| sv.year == year && sv.node == node)
    }

    /// Every solver variable the registry knows about.
    pub(crate) fn all_variables(&self) -> impl Iterator<Item = Variable> {
        self.shipments
            .iter()
            .map(|sv| sv.var)
            .chain(self.selections.iter().map(|sv| sv.var))
            .chain(self.activations.iter().map(|av| av.var))
    }

    /// Total number of decision variables.
    pub(crate) fn variable_count(&self) -> usize {
        self.shipments.len() + self.selections.len() + self.activations.len()
    }
}

/// Create all decision variables and the objective.
pub(crate) fn create(
    scenario: &Scenario,
    state: &mut ModelState,
) -> Result<VariableRegistry, ModelError> {
    let mut registry = VariableRegistry::default();

    // Activation binaries carry the fixed costs; one per fixed-cost node,
    // shared by every year.
    for (node_key, node) in scenario.nodes() {
        if !node.has_fixed_cost() {
            continue;
        }

        let var = state.variables_mut().add(variable().binary());
        let coefficient = minor_units_coefficient(node.fixed_cost().to_minor_units())?;

        state.add_to_objective(var, coefficient);
        registry.activations.push(ActivationVar {
            node: node_key,
            var,
        });
    }

    for year in 0..scenario.years().len() {
        for (node_key, node) in scenario.nodes() {
            let schedule = node.tiers();

            // Selection binaries only exist where there is a choice to make.
            if schedule.is_tiered() {
                for tier in 0..schedule.len() {
                    let var = state.variables_mut().add(variable().binary());

                    registry.selections.push(SelectionVar {
                        year,
                        node: node_key,
                        tier,
                        var,
                    });
                }
            }

            for (tier, discount) in schedule.tiers().iter().enumerate() {
                for route in scenario.routes_from(node_key) {
                    let upper = quantity_bound(route.capacity())?;
                    let var = state
                        .variables_mut()
                        .add(variable().integer().min(0.0).max(upper));

                    let coefficient = discounted_coefficient(
                        route.unit_cost().to_minor_units(),
                        discount.multiplier_decimal(),
                    )?;

                    state.add_to_objective(var, coefficient);
                    registry.shipments.push(ShipmentVar {
                        year,
                        node: node_key,
                        tier,
                        destination: route.destination(),
                        var,
                    });
                }
            }
        }
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use decimal_percentage::Percentage;
    use good_lp::Solution;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::scenario::{DemandTarget, tiers::DiscountTier};

    use super::*;

    fn warehouse_scenario() -> Result<Scenario, crate::scenario::ValidationError> {
        Scenario::builder(USD)
            .warehouse("a", Money::from_minor(100_000, USD))
            .warehouse("b", Money::from_minor(0, USD))
            .destination("x")
            .route("a", "x", 500, Money::from_minor(500, USD), 2)
            .route("b", "x", 300, Money::from_minor(600, USD), 4)
            .year(400, [("x", DemandTarget::Exact(400))])
            .build()
    }

    #[test]
    fn warehouse_scenario_creates_one_shipment_var_per_route() -> TestResult {
        let scenario = warehouse_scenario()?;
        let mut state = ModelState::new();

        let registry = create(&scenario, &mut state)?;

        assert_eq!(registry.shipments().len(), 2);
        assert_eq!(registry.selections().len(), 0);
        // Only the fixed-cost node gets an activation binary.
        assert_eq!(registry.activations().len(), 1);
        assert_eq!(registry.variable_count(), 3);

        Ok(())
    }

    #[test]
    fn tiered_carrier_creates_per_tier_shipment_and_selection_vars() -> TestResult {
        let scenario = Scenario::builder(USD)
            .carrier(
                "swift",
                vec![
                    DiscountTier::new(1000, Percentage::from(0.9)),
                    DiscountTier::new(5000, Percentage::from(0.8)),
                ],
            )
            .destination("x")
            .destination("y")
            .route("swift", "x", 10_000, Money::from_minor(500, USD), 2)
            .route("swift", "y", 10_000, Money::from_minor(800, USD), 2)
            .year(
                4000,
                [
                    ("x", DemandTarget::Exact(2500)),
                    ("y", DemandTarget::Exact(1500)),
                ],
            )
            .build()?;

        let mut state = ModelState::new();
        let registry = create(&scenario, &mut state)?;

        // 3 tiers (base inserted) x 2 routes.
        assert_eq!(registry.shipments().len(), 6);
        assert_eq!(registry.selections().len(), 3);
        assert_eq!(registry.activations().len(), 0);

        Ok(())
    }

    #[test]
    fn objective_charges_discounted_unit_costs() -> TestResult {
        let scenario = Scenario::builder(USD)
            .carrier(
                "swift",
                vec![DiscountTier::new(1000, Percentage::from(0.9))],
            )
            .destination("x")
            .route("swift", "x", 10_000, Money::from_minor(500, USD), 2)
            .year(4000, [("x", DemandTarget::Exact(4000))])
            .build()?;

        let mut state = ModelState::new();
        let registry = create(&scenario, &mut state)?;
        let (_, objective, _) = state.into_parts();

        // Ship 10 units at the base tier and 20 at the discounted tier:
        // 10 * 500 + 20 * 450 = 14000 minor units.
        let base = registry
            .shipments()
            .iter()
            .find(|sv| sv.tier == 0)
            .ok_or("missing base tier variable")?;
        let discounted = registry
            .shipments()
            .iter()
            .find(|sv| sv.tier == 1)
            .ok_or("missing discounted tier variable")?;

        let solution: HashMap<_, _> = [(base.var, 10.0), (discounted.var, 20.0)].into();
        let total = solution.eval(&objective);

        assert!((total - 14_000.0).abs() <= f64::EPSILON);

        Ok(())
    }
}
