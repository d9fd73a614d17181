//! Plan extraction
//!
//! Translates an optimal variable assignment back into domain terms: which
//! route carries how much in which year, which discount tier each carrier
//! earned, which fixed-cost nodes ended up active, and the objective value as
//! money. Everything produced here is immutable.

use good_lp::Solution;
use rust_decimal::{Decimal, prelude::{FromPrimitive, ToPrimitive}};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Serialize;

use crate::{
    model::{ModelError, variables::VariableRegistry},
    scenario::{
        Scenario,
        destinations::{Destination, DestinationKey},
        nodes::{Node, NodeKey},
    },
    solver::BINARY_THRESHOLD,
};

/// One allocated route-year quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shipment {
    /// Year index
    pub year: usize,

    /// Origin node id
    pub node: String,

    /// Destination id
    pub destination: String,

    /// Allocated quantity
    pub quantity: u64,
}

/// The allocation: positive quantities per (year, node, destination), in
/// year and route declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentPlan {
    shipments: Vec<Shipment>,
}

impl ShipmentPlan {
    /// Return the allocated shipments.
    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    /// Quantity allocated to one route in one year.
    pub fn quantity(&self, year: usize, node: &str, destination: &str) -> u64 {
        self.shipments
            .iter()
            .filter(|shipment| {
                shipment.year == year
                    && shipment.node == node
                    && shipment.destination == destination
            })
            .map(|shipment| shipment.quantity)
            .sum()
    }

    /// Quantity arriving at one destination in one year.
    pub fn arriving(&self, year: usize, destination: &str) -> u64 {
        self.shipments
            .iter()
            .filter(|shipment| shipment.year == year && shipment.destination == destination)
            .map(|shipment| shipment.quantity)
            .sum()
    }

    /// Quantity leaving one node in one year.
    pub fn leaving(&self, year: usize, node: &str) -> u64 {
        self.shipments
            .iter()
            .filter(|shipment| shipment.year == year && shipment.node == node)
            .map(|shipment| shipment.quantity)
            .sum()
    }

    /// Total quantity allocated in one year.
    pub fn year_total(&self, year: usize) -> u64 {
        self.shipments
            .iter()
            .filter(|shipment| shipment.year == year)
            .map(|shipment| shipment.quantity)
            .sum()
    }

    /// Number of positive route-year quantities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shipments.len()
    }

    /// Whether nothing was allocated at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }
}

/// The discount tier one carrier earned in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierSelection {
    /// Year index
    pub year: usize,

    /// Carrier id
    pub carrier: String,

    /// Selected tier index within the carrier's schedule
    pub tier: usize,

    /// The selected tier's volume threshold
    pub min_volume: u64,

    /// The selected tier's cost multiplier
    pub multiplier: Decimal,

    /// The carrier's realized volume that year
    pub volume: u64,
}

/// A node's derived activation state.
///
/// The flag is derived from realized quantities, never read off a solver
/// binary, so it is 1 exactly when the node ships anything.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeActivation {
    /// Node id
    pub node: String,

    /// Whether any route out of the node carries a positive quantity
    pub active: bool,

    /// The fixed cost configured for the node
    pub fixed_cost: Money<'static, Currency>,
}

/// Everything extracted from an optimal solve.
#[derive(Debug, Clone)]
pub struct SolutionReport {
    plan: ShipmentPlan,
    tier_selections: Vec<TierSelection>,
    activations: Vec<NodeActivation>,
    objective_value: Money<'static, Currency>,
}

impl SolutionReport {
    /// Return the shipment plan.
    pub fn plan(&self) -> &ShipmentPlan {
        &self.plan
    }

    /// Return the per-carrier-year tier selections.
    pub fn tier_selections(&self) -> &[TierSelection] {
        &self.tier_selections
    }

    /// Return the tier selection for one carrier-year.
    pub fn tier_for(&self, year: usize, carrier: &str) -> Option<&TierSelection> {
        self.tier_selections
            .iter()
            .find(|selection| selection.year == year && selection.carrier == carrier)
    }

    /// Return the derived node activations.
    pub fn activations(&self) -> &[NodeActivation] {
        &self.activations
    }

    /// Return the optimal objective value.
    pub fn objective_value(&self) -> &Money<'static, Currency> {
        &self.objective_value
    }
}

/// Translate an optimal assignment into a [`SolutionReport`].
pub(crate) fn extract(
    scenario: &Scenario,
    registry: &VariableRegistry,
    solution: &impl Solution,
    objective: f64,
) -> Result<SolutionReport, ModelError> {
    let mut per_route: FxHashMap<(usize, NodeKey, DestinationKey), u64> = FxHashMap::default();
    let mut per_node_year: FxHashMap<(usize, NodeKey), u64> = FxHashMap::default();

    for shipment in registry.shipments() {
        let quantity = whole_quantity(solution.value(shipment.var))?;

        if quantity == 0 {
            continue;
        }

        *per_route
            .entry((shipment.year, shipment.node, shipment.destination))
            .or_insert(0) += quantity;
        *per_node_year
            .entry((shipment.year, shipment.node))
            .or_insert(0) += quantity;
    }

    let plan = collect_plan(scenario, &per_route);
    let tier_selections = collect_tier_selections(scenario, registry, solution, &per_node_year)?;
    let activations = collect_activations(scenario, &per_node_year);

    Ok(SolutionReport {
        plan,
        tier_selections,
        activations,
        objective_value: objective_money(scenario, objective)?,
    })
}

/// Order the positive quantities by year and route declaration order.
fn collect_plan(
    scenario: &Scenario,
    per_route: &FxHashMap<(usize, NodeKey, DestinationKey), u64>,
) -> ShipmentPlan {
    let mut shipments = Vec::new();

    for year in 0..scenario.years().len() {
        for route in scenario.routes() {
            let Some(&quantity) = per_route.get(&(year, route.node(), route.destination())) else {
                continue;
            };

            shipments.push(Shipment {
                year,
                node: entity_id(scenario.node(route.node()).map(Node::id)),
                destination: entity_id(scenario.destination(route.destination()).map(Destination::id)),
                quantity,
            });
        }
    }

    ShipmentPlan { shipments }
}

/// Read the selected tier for every tiered carrier-year.
fn collect_tier_selections(
    scenario: &Scenario,
    registry: &VariableRegistry,
    solution: &impl Solution,
    per_node_year: &FxHashMap<(usize, NodeKey), u64>,
) -> Result<Vec<TierSelection>, ModelError> {
    let mut selections = Vec::new();

    for year in 0..scenario.years().len() {
        for (node_key, node) in scenario.nodes() {
            if !node.tiers().is_tiered() {
                continue;
            }

            // The one-hot guarantees a selected tier; the solver returns
            // floats, so treat values above 0.5 as selected.
            let selected = registry
                .selection_vars(year, node_key)
                .find(|sv| solution.value(sv.var) > BINARY_THRESHOLD)
                .ok_or(ModelError::InvariantViolation {
                    message: "no tier selected for a tiered carrier-year",
                })?;

            let tier = node
                .tiers()
                .get(selected.tier)
                .ok_or(ModelError::InvariantViolation {
                    message: "selected tier index has no backing tier",
                })?;

            selections.push(TierSelection {
                year,
                carrier: node.id().to_owned(),
                tier: selected.tier,
                min_volume: tier.min_volume(),
                multiplier: tier.multiplier_decimal(),
                volume: per_node_year.get(&(year, node_key)).copied().unwrap_or(0),
            });
        }
    }

    Ok(selections)
}

/// Derive every node's activation state from its realized quantities.
fn collect_activations(
    scenario: &Scenario,
    per_node_year: &FxHashMap<(usize, NodeKey), u64>,
) -> Vec<NodeActivation> {
    scenario
        .nodes()
        .map(|(node_key, node)| {
            let active = (0..scenario.years().len())
                .any(|year| per_node_year.get(&(year, node_key)).copied().unwrap_or(0) > 0);

            NodeActivation {
                node: node.id().to_owned(),
                active,
                fixed_cost: *node.fixed_cost(),
            }
        })
        .collect()
}

/// Round a solved shipment value to a whole quantity.
fn whole_quantity(value: f64) -> Result<u64, ModelError> {
    Decimal::from_f64(value)
        .map(|decimal| decimal.round())
        .and_then(|decimal| decimal.to_u64())
        .ok_or(ModelError::InvariantViolation {
            message: "solver returned a non-representable shipment quantity",
        })
}

/// Round the objective value to minor units of the scenario currency.
fn objective_money(
    scenario: &Scenario,
    objective: f64,
) -> Result<Money<'static, Currency>, ModelError> {
    let minor = Decimal::from_f64(objective)
        .map(|decimal| decimal.round())
        .and_then(|decimal| decimal.to_i64())
        .ok_or(ModelError::InvariantViolation {
            message: "objective value is not representable in minor units",
        })?;

    Ok(Money::from_minor(minor, scenario.currency()))
}

fn entity_id(id: Option<&str>) -> String {
    id.map_or_else(|| "?".to_owned(), ToOwned::to_owned)
}
