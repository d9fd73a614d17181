//! Scenario
//!
//! The validated, immutable input to one optimization run: origin nodes,
//! destinations, the routes between them, per-year demand, the delivery
//! policy, and each carrier's discount tier schedule. A [`Scenario`] is
//! constructed once through [`ScenarioBuilder`], which runs every
//! well-formedness check in [`ScenarioBuilder::build`], and is never mutated
//! afterwards.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::scenario::{
    destinations::{Destination, DestinationKey},
    nodes::{Node, NodeKey},
    routes::Route,
    tiers::{DiscountTier, TierSchedule},
};

pub mod destinations;
pub mod file;
pub mod nodes;
pub mod routes;
pub mod tiers;

pub use destinations::DemandTarget;

/// Errors raised while validating scenario input, before any model is built.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The scenario declares no origin nodes.
    #[error("scenario has no origin nodes")]
    NoNodes,

    /// The scenario declares no destinations.
    #[error("scenario has no destinations")]
    NoDestinations,

    /// The scenario declares no demand years.
    #[error("scenario has no demand years")]
    NoYears,

    /// Two nodes share an id.
    #[error("node id {id:?} is declared more than once")]
    DuplicateNode {
        /// The repeated node id
        id: String,
    },

    /// Two destinations share an id.
    #[error("destination id {id:?} is declared more than once")]
    DuplicateDestination {
        /// The repeated destination id
        id: String,
    },

    /// A route references a node id that was never declared.
    #[error("route references unknown node {id:?}")]
    UnknownRouteNode {
        /// The unknown node id
        id: String,
    },

    /// A route references a destination id that was never declared.
    #[error("route references unknown destination {id:?}")]
    UnknownRouteDestination {
        /// The unknown destination id
        id: String,
    },

    /// Two routes connect the same node and destination.
    #[error("route from {node:?} to {destination:?} is declared more than once")]
    DuplicateRoute {
        /// Origin node id
        node: String,

        /// Destination id
        destination: String,
    },

    /// A money amount uses a currency other than the scenario currency.
    #[error("{entity} has currency {found}, but the scenario has currency {expected}")]
    CurrencyMismatch {
        /// What carried the mismatched amount
        entity: String,

        /// ISO code of the mismatched currency
        found: &'static str,

        /// ISO code of the scenario currency
        expected: &'static str,
    },

    /// A demand year is missing a target for a declared destination.
    #[error("year {year} has no demand target for destination {destination:?}")]
    MissingTarget {
        /// Year index
        year: usize,

        /// Destination with no target
        destination: String,
    },

    /// A demand year targets a destination id that was never declared.
    #[error("year {year} targets unknown destination {id:?}")]
    UnknownTargetDestination {
        /// Year index
        year: usize,

        /// The unknown destination id
        id: String,
    },

    /// A demand year targets the same destination twice.
    #[error("year {year} declares more than one target for destination {destination:?}")]
    DuplicateTarget {
        /// Year index
        year: usize,

        /// The repeated destination id
        destination: String,
    },

    /// A demand year mixes exact and share targets.
    #[error("year {year} mixes exact and share demand targets")]
    MixedTargetKinds {
        /// Year index
        year: usize,
    },

    /// Exact targets do not sum to the year's declared total.
    #[error("year {year} declares {total} total shipments but its exact targets sum to {sum}")]
    ExactTargetSum {
        /// Year index
        year: usize,

        /// Sum of the exact targets
        sum: u64,

        /// Declared total shipments
        total: u64,
    },

    /// Share fractions do not sum to 1.
    #[error("year {year} share fractions sum to {sum}, expected 1")]
    FractionSum {
        /// Year index
        year: usize,

        /// Sum of the declared fractions
        sum: Decimal,
    },

    /// A share fraction lies outside [0, 1].
    #[error("year {year} destination {destination:?} has share fraction {fraction} outside [0, 1]")]
    FractionOutOfRange {
        /// Year index
        year: usize,

        /// Destination id
        destination: String,

        /// The offending fraction
        fraction: Decimal,
    },

    /// A share tolerance lies outside [0, 1].
    #[error(
        "year {year} destination {destination:?} has tolerance {tolerance} outside [0, 1]"
    )]
    ToleranceOutOfRange {
        /// Year index
        year: usize,

        /// Destination id
        destination: String,

        /// The offending tolerance
        tolerance: Decimal,
    },

    /// The delivery tolerance lies outside [0, 1].
    #[error("delivery tolerance {tolerance} lies outside [0, 1]")]
    DeliveryToleranceOutOfRange {
        /// The offending tolerance
        tolerance: Decimal,
    },

    /// A tier schedule's thresholds are not strictly increasing.
    #[error("carrier {carrier:?} tier {index} does not increase its volume threshold")]
    TierThresholdsNotIncreasing {
        /// Carrier id
        carrier: String,

        /// Index of the offending tier within the normalized schedule
        index: usize,
    },

    /// A scenario document names a currency code the ISO table does not know.
    #[error("unknown currency code {code:?}")]
    UnknownCurrency {
        /// The unknown code
        code: String,
    },
}

/// Demand for one year: a declared total and one target per destination.
#[derive(Debug, Clone)]
pub struct YearDemand {
    total_shipments: u64,
    targets: Vec<(DestinationKey, DemandTarget)>,
}

impl YearDemand {
    /// Return the declared total shipments for the year.
    pub fn total_shipments(&self) -> u64 {
        self.total_shipments
    }

    /// Return the per-destination targets in destination declaration order.
    pub fn targets(&self) -> &[(DestinationKey, DemandTarget)] {
        &self.targets
    }

    /// Return the target for one destination.
    pub fn target_for(&self, destination: DestinationKey) -> Option<&DemandTarget> {
        self.targets
            .iter()
            .find(|(key, _)| *key == destination)
            .map(|(_, target)| target)
    }
}

/// Service-level policy: at most `tolerance` of a year's shipments may travel
/// on routes slower than `target_days`.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    target_days: u32,
    tolerance: Percentage,
}

impl DeliveryPolicy {
    /// Create a new delivery policy.
    #[must_use]
    pub fn new(target_days: u32, tolerance: Percentage) -> Self {
        Self {
            target_days,
            tolerance,
        }
    }

    /// Return the target maximum delivery days.
    pub fn target_days(&self) -> u32 {
        self.target_days
    }

    /// Return the permitted late fraction.
    pub fn tolerance(&self) -> Percentage {
        self.tolerance
    }

    /// Return the permitted late fraction as a plain decimal.
    pub fn tolerance_decimal(&self) -> Decimal {
        self.tolerance * Decimal::ONE
    }
}

/// Validated, immutable input to one optimization run.
#[derive(Debug)]
pub struct Scenario {
    currency: &'static Currency,
    nodes: SlotMap<NodeKey, Node>,
    destinations: SlotMap<DestinationKey, Destination>,
    routes: Vec<Route>,
    years: Vec<YearDemand>,
    delivery: Option<DeliveryPolicy>,
}

impl Scenario {
    /// Start building a scenario in the given currency.
    #[must_use]
    pub fn builder(currency: &'static Currency) -> ScenarioBuilder {
        ScenarioBuilder::new(currency)
    }

    /// Return the currency every money amount in the scenario shares.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Iterate over the nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    /// Return one node.
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Iterate over the destinations in declaration order.
    pub fn destinations(&self) -> impl Iterator<Item = (DestinationKey, &Destination)> {
        self.destinations.iter()
    }

    /// Return one destination.
    pub fn destination(&self, key: DestinationKey) -> Option<&Destination> {
        self.destinations.get(key)
    }

    /// Return every route in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Iterate over the routes leaving one node.
    pub fn routes_from(&self, node: NodeKey) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(move |route| route.node() == node)
    }

    /// Iterate over the routes arriving at one destination.
    pub fn routes_into(&self, destination: DestinationKey) -> impl Iterator<Item = &Route> {
        self.routes
            .iter()
            .filter(move |route| route.destination() == destination)
    }

    /// Return the demand years in order.
    pub fn years(&self) -> &[YearDemand] {
        &self.years
    }

    /// Return the delivery policy, if one is set.
    pub fn delivery(&self) -> Option<&DeliveryPolicy> {
        self.delivery.as_ref()
    }
}

/// Raw node declaration held by the builder until validation.
#[derive(Debug)]
struct RawNode {
    id: String,
    fixed_cost: Money<'static, Currency>,
    tiers: Vec<DiscountTier>,
}

/// Raw route declaration held by the builder until validation.
#[derive(Debug)]
struct RawRoute {
    node: String,
    destination: String,
    capacity: u64,
    unit_cost: Money<'static, Currency>,
    delivery_days: u32,
}

/// Raw demand year held by the builder until validation.
#[derive(Debug)]
struct RawYear {
    total_shipments: u64,
    targets: Vec<(String, DemandTarget)>,
}

/// Builder for a validated [`Scenario`].
///
/// Declarations are collected in call order; every well-formedness check runs
/// in [`ScenarioBuilder::build`].
#[derive(Debug)]
pub struct ScenarioBuilder {
    currency: &'static Currency,
    nodes: Vec<RawNode>,
    destinations: Vec<String>,
    routes: Vec<RawRoute>,
    years: Vec<RawYear>,
    delivery: Option<DeliveryPolicy>,
}

impl ScenarioBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            nodes: Vec::new(),
            destinations: Vec::new(),
            routes: Vec::new(),
            years: Vec::new(),
            delivery: None,
        }
    }

    /// Declare a node with a fixed cost and a discount tier schedule.
    #[must_use]
    pub fn node(
        mut self,
        id: impl Into<String>,
        fixed_cost: Money<'static, Currency>,
        tiers: Vec<DiscountTier>,
    ) -> Self {
        self.nodes.push(RawNode {
            id: id.into(),
            fixed_cost,
            tiers,
        });
        self
    }

    /// Declare a warehouse: a node with a fixed activation cost and no
    /// earned discount tiers.
    #[must_use]
    pub fn warehouse(self, id: impl Into<String>, fixed_cost: Money<'static, Currency>) -> Self {
        self.node(id, fixed_cost, Vec::new())
    }

    /// Declare a carrier: a node with earned discount tiers and no fixed
    /// activation cost.
    #[must_use]
    pub fn carrier(self, id: impl Into<String>, tiers: Vec<DiscountTier>) -> Self {
        let zero = Money::from_minor(0, self.currency);
        self.node(id, zero, tiers)
    }

    /// Declare a destination.
    #[must_use]
    pub fn destination(mut self, id: impl Into<String>) -> Self {
        self.destinations.push(id.into());
        self
    }

    /// Declare a route between a node and a destination.
    #[must_use]
    pub fn route(
        mut self,
        node: impl Into<String>,
        destination: impl Into<String>,
        capacity: u64,
        unit_cost: Money<'static, Currency>,
        delivery_days: u32,
    ) -> Self {
        self.routes.push(RawRoute {
            node: node.into(),
            destination: destination.into(),
            capacity,
            unit_cost,
            delivery_days,
        });
        self
    }

    /// Declare one demand year.
    #[must_use]
    pub fn year<S, I>(mut self, total_shipments: u64, targets: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, DemandTarget)>,
    {
        self.years.push(RawYear {
            total_shipments,
            targets: targets
                .into_iter()
                .map(|(id, target)| (id.into(), target))
                .collect(),
        });
        self
    }

    /// Set the delivery policy.
    #[must_use]
    pub fn delivery(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery = Some(policy);
        self
    }

    /// Validate the declarations and produce an immutable [`Scenario`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first malformed
    /// declaration: empty sections, duplicate or unknown ids, currency
    /// mismatches, targets that do not reconcile with the declared totals,
    /// tolerances or fractions outside [0, 1], or tier thresholds that do
    /// not strictly increase.
    pub fn build(self) -> Result<Scenario, ValidationError> {
        if self.nodes.is_empty() {
            return Err(ValidationError::NoNodes);
        }
        if self.destinations.is_empty() {
            return Err(ValidationError::NoDestinations);
        }
        if self.years.is_empty() {
            return Err(ValidationError::NoYears);
        }

        if let Some(policy) = &self.delivery {
            let tolerance = policy.tolerance_decimal();

            if tolerance < Decimal::ZERO || tolerance > Decimal::ONE {
                return Err(ValidationError::DeliveryToleranceOutOfRange { tolerance });
            }
        }

        let (nodes, node_keys) = self.resolve_nodes()?;
        let (destinations, destination_keys) = self.resolve_destinations()?;
        let routes = self.resolve_routes(&node_keys, &destination_keys)?;
        let years = self.resolve_years(&destination_keys)?;

        Ok(Scenario {
            currency: self.currency,
            nodes,
            destinations,
            routes,
            years,
            delivery: self.delivery,
        })
    }

    fn resolve_nodes(
        &self,
    ) -> Result<(SlotMap<NodeKey, Node>, FxHashMap<String, NodeKey>), ValidationError> {
        let mut nodes = SlotMap::with_key();
        let mut keys = FxHashMap::default();

        for raw in &self.nodes {
            self.check_currency(&raw.fixed_cost, format!("fixed cost of node {:?}", raw.id))?;

            let schedule = TierSchedule::normalize(&raw.id, raw.tiers.clone())?;
            let key = nodes.insert(Node::new(raw.id.clone(), raw.fixed_cost, schedule));

            if keys.insert(raw.id.clone(), key).is_some() {
                return Err(ValidationError::DuplicateNode {
                    id: raw.id.clone(),
                });
            }
        }

        Ok((nodes, keys))
    }

    fn resolve_destinations(
        &self,
    ) -> Result<
        (
            SlotMap<DestinationKey, Destination>,
            FxHashMap<String, DestinationKey>,
        ),
        ValidationError,
    > {
        let mut destinations = SlotMap::with_key();
        let mut keys = FxHashMap::default();

        for id in &self.destinations {
            let key = destinations.insert(Destination::new(id.clone()));

            if keys.insert(id.clone(), key).is_some() {
                return Err(ValidationError::DuplicateDestination { id: id.clone() });
            }
        }

        Ok((destinations, keys))
    }

    fn resolve_routes(
        &self,
        node_keys: &FxHashMap<String, NodeKey>,
        destination_keys: &FxHashMap<String, DestinationKey>,
    ) -> Result<Vec<Route>, ValidationError> {
        let mut routes = Vec::with_capacity(self.routes.len());
        let mut seen = FxHashSet::default();

        for raw in &self.routes {
            let node = *node_keys
                .get(&raw.node)
                .ok_or_else(|| ValidationError::UnknownRouteNode {
                    id: raw.node.clone(),
                })?;

            let destination = *destination_keys.get(&raw.destination).ok_or_else(|| {
                ValidationError::UnknownRouteDestination {
                    id: raw.destination.clone(),
                }
            })?;

            if !seen.insert((node, destination)) {
                return Err(ValidationError::DuplicateRoute {
                    node: raw.node.clone(),
                    destination: raw.destination.clone(),
                });
            }

            self.check_currency(
                &raw.unit_cost,
                format!("unit cost of route {:?} -> {:?}", raw.node, raw.destination),
            )?;

            routes.push(Route::new(
                node,
                destination,
                raw.capacity,
                raw.unit_cost,
                raw.delivery_days,
            ));
        }

        Ok(routes)
    }

    fn resolve_years(
        &self,
        destination_keys: &FxHashMap<String, DestinationKey>,
    ) -> Result<Vec<YearDemand>, ValidationError> {
        self.years
            .iter()
            .enumerate()
            .map(|(year, raw)| resolve_year(year, raw, destination_keys))
            .collect()
    }

    fn check_currency(
        &self,
        amount: &Money<'static, Currency>,
        entity: String,
    ) -> Result<(), ValidationError> {
        if amount.currency() == self.currency {
            Ok(())
        } else {
            Err(ValidationError::CurrencyMismatch {
                entity,
                found: amount.currency().iso_alpha_code,
                expected: self.currency.iso_alpha_code,
            })
        }
    }
}

/// Resolve and validate one raw demand year.
fn resolve_year(
    year: usize,
    raw: &RawYear,
    destination_keys: &FxHashMap<String, DestinationKey>,
) -> Result<YearDemand, ValidationError> {
    let mut targets = Vec::with_capacity(raw.targets.len());
    let mut seen = FxHashSet::default();

    for (id, target) in &raw.targets {
        let key = *destination_keys
            .get(id)
            .ok_or_else(|| ValidationError::UnknownTargetDestination {
                year,
                id: id.clone(),
            })?;

        if !seen.insert(key) {
            return Err(ValidationError::DuplicateTarget {
                year,
                destination: id.clone(),
            });
        }

        check_target_ranges(year, id, target)?;
        targets.push((key, *target));
    }

    // Sorted so the reported id does not depend on hash order.
    let mut missing: Vec<&String> = destination_keys
        .iter()
        .filter(|(_, key)| !seen.contains(*key))
        .map(|(id, _)| id)
        .collect();
    missing.sort();

    if let Some(destination) = missing.first() {
        return Err(ValidationError::MissingTarget {
            year,
            destination: (*destination).clone(),
        });
    }

    check_target_totals(year, raw.total_shipments, &targets)?;

    Ok(YearDemand {
        total_shipments: raw.total_shipments,
        targets,
    })
}

/// Reject fractions or tolerances outside [0, 1].
fn check_target_ranges(
    year: usize,
    destination: &str,
    target: &DemandTarget,
) -> Result<(), ValidationError> {
    if let DemandTarget::Share {
        fraction,
        tolerance,
    } = target
    {
        let fraction = *fraction * Decimal::ONE;
        let tolerance = *tolerance * Decimal::ONE;

        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(ValidationError::FractionOutOfRange {
                year,
                destination: destination.to_owned(),
                fraction,
            });
        }

        if tolerance < Decimal::ZERO || tolerance > Decimal::ONE {
            return Err(ValidationError::ToleranceOutOfRange {
                year,
                destination: destination.to_owned(),
                tolerance,
            });
        }
    }

    Ok(())
}

/// Reconcile a year's targets against its declared total.
fn check_target_totals(
    year: usize,
    total_shipments: u64,
    targets: &[(DestinationKey, DemandTarget)],
) -> Result<(), ValidationError> {
    let any_exact = targets
        .iter()
        .any(|(_, target)| matches!(target, DemandTarget::Exact(_)));
    let any_share = targets
        .iter()
        .any(|(_, target)| matches!(target, DemandTarget::Share { .. }));

    if any_exact && any_share {
        return Err(ValidationError::MixedTargetKinds { year });
    }

    if any_exact {
        let sum = targets
            .iter()
            .map(|(_, target)| match target {
                DemandTarget::Exact(quantity) => *quantity,
                DemandTarget::Share { .. } => 0,
            })
            .fold(0_u64, u64::saturating_add);

        if sum != total_shipments {
            return Err(ValidationError::ExactTargetSum {
                year,
                sum,
                total: total_shipments,
            });
        }
    } else {
        let sum: Decimal = targets
            .iter()
            .map(|(_, target)| match target {
                DemandTarget::Share { fraction, .. } => *fraction * Decimal::ONE,
                DemandTarget::Exact(_) => Decimal::ZERO,
            })
            .sum();

        if sum != Decimal::ONE {
            return Err(ValidationError::FractionSum { year, sum });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn two_node_builder() -> ScenarioBuilder {
        Scenario::builder(USD)
            .warehouse("a", Money::from_minor(100_000, USD))
            .warehouse("b", Money::from_minor(50_000, USD))
            .destination("x")
            .destination("y")
            .route("a", "x", 500, Money::from_minor(500, USD), 2)
            .route("a", "y", 500, Money::from_minor(700, USD), 3)
            .route("b", "x", 300, Money::from_minor(600, USD), 4)
            .route("b", "y", 300, Money::from_minor(400, USD), 2)
    }

    #[test]
    fn builder_produces_a_scenario_with_exact_targets() -> TestResult {
        let scenario = two_node_builder()
            .year(
                600,
                [
                    ("x", DemandTarget::Exact(400)),
                    ("y", DemandTarget::Exact(200)),
                ],
            )
            .build()?;

        assert_eq!(scenario.nodes().count(), 2);
        assert_eq!(scenario.destinations().count(), 2);
        assert_eq!(scenario.routes().len(), 4);
        assert_eq!(scenario.years().len(), 1);
        assert!(scenario.delivery().is_none());

        Ok(())
    }

    #[test]
    fn empty_sections_are_rejected() {
        let no_nodes = Scenario::builder(USD).destination("x").build();
        assert!(matches!(no_nodes, Err(ValidationError::NoNodes)));

        let no_destinations = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .build();
        assert!(matches!(
            no_destinations,
            Err(ValidationError::NoDestinations)
        ));

        let no_years = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .build();
        assert!(matches!(no_years, Err(ValidationError::NoYears)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .year(0, [("x", DemandTarget::Exact(0))])
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::DuplicateNode { ref id }) if id == "a"
        ));
    }

    #[test]
    fn route_to_unknown_destination_is_rejected() {
        let result = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .route("a", "nowhere", 10, Money::from_minor(100, USD), 1)
            .year(0, [("x", DemandTarget::Exact(0))])
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::UnknownRouteDestination { ref id }) if id == "nowhere"
        ));
    }

    #[test]
    fn duplicate_route_is_rejected() {
        let result = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .route("a", "x", 10, Money::from_minor(100, USD), 1)
            .route("a", "x", 20, Money::from_minor(200, USD), 2)
            .year(0, [("x", DemandTarget::Exact(0))])
            .build();

        assert!(matches!(result, Err(ValidationError::DuplicateRoute { .. })));
    }

    #[test]
    fn foreign_currency_amounts_are_rejected() {
        let result = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(100, GBP))
            .destination("x")
            .year(0, [("x", DemandTarget::Exact(0))])
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::CurrencyMismatch {
                found: "GBP",
                expected: "USD",
                ..
            })
        ));
    }

    #[test]
    fn exact_targets_must_sum_to_the_declared_total() {
        let result = two_node_builder()
            .year(
                700,
                [
                    ("x", DemandTarget::Exact(400)),
                    ("y", DemandTarget::Exact(200)),
                ],
            )
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::ExactTargetSum {
                year: 0,
                sum: 600,
                total: 700,
            })
        ));
    }

    #[test]
    fn share_fractions_must_sum_to_one() {
        let result = two_node_builder()
            .year(
                1000,
                [
                    (
                        "x",
                        DemandTarget::Share {
                            fraction: Percentage::from(0.5),
                            tolerance: Percentage::from(0.05),
                        },
                    ),
                    (
                        "y",
                        DemandTarget::Share {
                            fraction: Percentage::from(0.4),
                            tolerance: Percentage::from(0.05),
                        },
                    ),
                ],
            )
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::FractionSum { year: 0, .. })
        ));
    }

    #[test]
    fn mixed_target_kinds_are_rejected() {
        let result = two_node_builder()
            .year(
                1000,
                [
                    ("x", DemandTarget::Exact(400)),
                    (
                        "y",
                        DemandTarget::Share {
                            fraction: Percentage::from(0.6),
                            tolerance: Percentage::from(0.0),
                        },
                    ),
                ],
            )
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::MixedTargetKinds { year: 0 })
        ));
    }

    #[test]
    fn missing_target_names_the_destination() {
        let result = two_node_builder()
            .year(400, [("x", DemandTarget::Exact(400))])
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::MissingTarget { year: 0, ref destination }) if destination == "y"
        ));
    }

    #[test]
    fn out_of_range_share_tolerance_is_rejected() {
        let result = two_node_builder()
            .year(
                1000,
                [
                    (
                        "x",
                        DemandTarget::Share {
                            fraction: Percentage::from(0.5),
                            tolerance: Percentage::from(1.5),
                        },
                    ),
                    (
                        "y",
                        DemandTarget::Share {
                            fraction: Percentage::from(0.5),
                            tolerance: Percentage::from(0.0),
                        },
                    ),
                ],
            )
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::ToleranceOutOfRange { year: 0, .. })
        ));
    }

    #[test]
    fn out_of_range_delivery_tolerance_is_rejected() {
        let result = two_node_builder()
            .delivery(DeliveryPolicy::new(3, Percentage::from(1.2)))
            .year(
                600,
                [
                    ("x", DemandTarget::Exact(400)),
                    ("y", DemandTarget::Exact(200)),
                ],
            )
            .build();

        assert!(matches!(
            result,
            Err(ValidationError::DeliveryToleranceOutOfRange { .. })
        ));
    }

    #[test]
    fn routes_into_filters_by_destination() -> TestResult {
        let scenario = two_node_builder()
            .year(
                600,
                [
                    ("x", DemandTarget::Exact(400)),
                    ("y", DemandTarget::Exact(200)),
                ],
            )
            .build()?;

        let (x_key, _) = scenario
            .destinations()
            .find(|(_, destination)| destination.id() == "x")
            .ok_or("missing destination x")?;

        assert_eq!(scenario.routes_into(x_key).count(), 2);

        Ok(())
    }
}
