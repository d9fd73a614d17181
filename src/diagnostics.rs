//! Diagnostics Engine
//!
//! Explains why a scenario cannot be solved. Pre-solve checks compare route
//! capacities against demand before the solver ever runs; post-solve
//! interpretation maps the solver status taxonomy onto a structured
//! [`Diagnosis`] with the offending entities and a corrective suggestion.
//! Every function here is pure and iterates in declaration order, so an
//! unchanged scenario always produces a bit-identical diagnosis.

use std::time::Duration;

use humanize_duration::{Truncate, prelude::DurationExt};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;

use crate::scenario::{Scenario, destinations::DestinationKey, routes::Route};

/// Which way a solve attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosisStatus {
    /// The constraints are mutually unsatisfiable.
    Infeasible,

    /// The objective can be improved without bound.
    Unbounded,

    /// The solver exhausted its time budget.
    TimedOut,

    /// The solver stopped without a verdict.
    NotSolved,
}

/// Structured, human-actionable explanation of a failed solve.
///
/// This record is what the presentation layer renders; nothing downstream of
/// the Diagnostics Engine ever sees a raw solver error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    /// Failure classification
    pub status: DiagnosisStatus,

    /// What went wrong, with binding values
    pub message: String,

    /// Entities involved, as `kind:id` strings
    pub offending_entities: Vec<String>,

    /// The corrective action most likely to help
    pub suggested_fix: String,
}

/// One violated capacity check found before solving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// A destination's incoming routes cannot carry its required quantity.
    DestinationShortfall {
        /// Year index
        year: usize,

        /// Destination id
        destination: String,

        /// Least quantity the destination must receive
        required: u64,

        /// Most the incoming routes can carry
        achievable: u64,

        /// `required - achievable`
        shortfall: u64,
    },

    /// The whole network cannot carry the year's declared total.
    TotalShortfall {
        /// Year index
        year: usize,

        /// Declared total shipments
        required: u64,

        /// Most all routes together can carry
        achievable: u64,

        /// `required - achievable`
        shortfall: u64,
    },

    /// On-time routes cannot carry the quantity that must arrive on time.
    OnTimeShortfall {
        /// Year index
        year: usize,

        /// Least quantity that must travel on on-time routes
        required: u64,

        /// Most the on-time routes can carry
        achievable: u64,

        /// `required - achievable`
        shortfall: u64,
    },
}

/// Run the pre-solve capacity checks.
///
/// Checks run per year in declaration order: each destination's incoming
/// capacity against its minimum required quantity, the whole network against
/// the declared total, and (when a delivery policy is set) the on-time routes
/// against the quantity that must arrive on time.
pub fn preflight(scenario: &Scenario) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (year, demand) in scenario.years().iter().enumerate() {
        for (destination, target) in demand.targets() {
            let achievable = incoming_capacity(scenario, *destination);
            let required = target.minimum_required(demand.total_shipments());

            if achievable < required {
                findings.push(Finding::DestinationShortfall {
                    year,
                    destination: destination_id(scenario, *destination),
                    required,
                    achievable,
                    shortfall: required - achievable,
                });
            }
        }

        let achievable = scenario
            .routes()
            .iter()
            .map(Route::capacity)
            .fold(0_u64, u64::saturating_add);
        let required = demand.total_shipments();

        if achievable < required {
            findings.push(Finding::TotalShortfall {
                year,
                required,
                achievable,
                shortfall: required - achievable,
            });
        }

        if let Some(policy) = scenario.delivery() {
            let achievable = scenario
                .routes()
                .iter()
                .filter(|route| !route.is_late(policy.target_days()))
                .map(Route::capacity)
                .fold(0_u64, u64::saturating_add);

            let allowance = (policy.tolerance_decimal()
                * Decimal::from(demand.total_shipments()))
            .floor()
            .to_u64()
            .unwrap_or(0);
            let required = demand.total_shipments().saturating_sub(allowance);

            if achievable < required {
                findings.push(Finding::OnTimeShortfall {
                    year,
                    required,
                    achievable,
                    shortfall: required - achievable,
                });
            }
        }
    }

    findings
}

/// Turn the first pre-solve finding into a diagnosis, if any exist.
pub(crate) fn diagnose_findings(findings: &[Finding]) -> Option<Diagnosis> {
    findings.first().map(finding_diagnosis)
}

/// Diagnose an infeasible verdict by localizing the violated family.
pub(crate) fn diagnose_infeasible(scenario: &Scenario) -> Diagnosis {
    if let Some(diagnosis) = diagnose_findings(&preflight(scenario)) {
        return diagnosis;
    }

    // Capacities alone cannot explain it; the bands are jointly too tight.
    Diagnosis {
        status: DiagnosisStatus::Infeasible,
        message: "every capacity check passes, but the fulfillment bands, delivery \
                  tolerance, and tier volume bands are jointly unsatisfiable"
            .to_owned(),
        offending_entities: Vec::new(),
        suggested_fix: "widen the share tolerance bands or the delivery tolerance".to_owned(),
    }
}

/// Diagnose an unbounded verdict by scanning for a negative cost coefficient.
pub(crate) fn diagnose_unbounded(scenario: &Scenario) -> Diagnosis {
    for route in scenario.routes() {
        if route.unit_cost().to_minor_units() < 0 {
            let node = node_id(scenario, route);
            let destination = destination_id(scenario, route.destination());

            return Diagnosis {
                status: DiagnosisStatus::Unbounded,
                message: format!(
                    "route {node:?} -> {destination:?} has a negative unit cost of {}; \
                     the objective decreases without bound along it",
                    route.unit_cost()
                ),
                offending_entities: vec![format!("route:{node}->{destination}")],
                suggested_fix: format!(
                    "correct the sign of the unit cost on route {node:?} -> {destination:?}"
                ),
            };
        }
    }

    for (_, node) in scenario.nodes() {
        if node.fixed_cost().to_minor_units() < 0 {
            return Diagnosis {
                status: DiagnosisStatus::Unbounded,
                message: format!(
                    "node {:?} has a negative fixed cost of {}; activating it decreases \
                     the objective without bound",
                    node.id(),
                    node.fixed_cost()
                ),
                offending_entities: vec![format!("node:{}", node.id())],
                suggested_fix: format!("correct the sign of the fixed cost on node {:?}", node.id()),
            };
        }
    }

    Diagnosis {
        status: DiagnosisStatus::Unbounded,
        message: "the objective can be improved indefinitely; a decision variable is \
                  missing an upper bound"
            .to_owned(),
        offending_entities: Vec::new(),
        suggested_fix: "bound every shipment variable by its route capacity".to_owned(),
    }
}

/// Diagnose an exhausted time budget.
pub(crate) fn diagnose_timeout(budget: Duration) -> Diagnosis {
    Diagnosis {
        status: DiagnosisStatus::TimedOut,
        message: format!(
            "solver exceeded its time budget of {}",
            budget.human(Truncate::Millis)
        ),
        offending_entities: Vec::new(),
        suggested_fix: "raise the solve time limit or relax tolerance bands to shrink the search"
            .to_owned(),
    }
}

/// Diagnose a backend that stopped without a verdict.
pub(crate) fn diagnose_not_solved(reason: &str) -> Diagnosis {
    Diagnosis {
        status: DiagnosisStatus::NotSolved,
        message: format!("solver stopped without a verdict: {reason}"),
        offending_entities: Vec::new(),
        suggested_fix: "raise the solve time limit or simplify the scenario".to_owned(),
    }
}

/// Render one finding as a diagnosis.
fn finding_diagnosis(finding: &Finding) -> Diagnosis {
    match finding {
        Finding::DestinationShortfall {
            year,
            destination,
            required,
            achievable,
            shortfall,
        } => Diagnosis {
            status: DiagnosisStatus::Infeasible,
            message: format!(
                "destination {destination:?} in year {year} can receive at most {achievable} \
                 shipments across its routes, {shortfall} short of the required {required}"
            ),
            offending_entities: vec![
                format!("destination:{destination}"),
                format!("year:{year}"),
            ],
            suggested_fix: format!(
                "raise route capacities into destination {destination:?} or lower its \
                 target by {shortfall}"
            ),
        },
        Finding::TotalShortfall {
            year,
            required,
            achievable,
            shortfall,
        } => Diagnosis {
            status: DiagnosisStatus::Infeasible,
            message: format!(
                "the network can carry at most {achievable} shipments in year {year}, \
                 {shortfall} short of the declared total of {required}"
            ),
            offending_entities: vec![format!("year:{year}")],
            suggested_fix: format!(
                "raise route capacities or lower the year {year} total by {shortfall}"
            ),
        },
        Finding::OnTimeShortfall {
            year,
            required,
            achievable,
            shortfall,
        } => Diagnosis {
            status: DiagnosisStatus::Infeasible,
            message: format!(
                "routes meeting the delivery target can carry at most {achievable} shipments \
                 in year {year}, but at least {required} must arrive on time \
                 ({shortfall} short)"
            ),
            offending_entities: vec![format!("year:{year}"), "delivery-policy".to_owned()],
            suggested_fix: "relax the delivery tolerance, extend the target days, or raise \
                            on-time route capacities"
                .to_owned(),
        },
    }
}

/// Total capacity of the routes into one destination.
fn incoming_capacity(scenario: &Scenario, destination: DestinationKey) -> u64 {
    scenario
        .routes_into(destination)
        .map(Route::capacity)
        .fold(0_u64, u64::saturating_add)
}

fn destination_id(scenario: &Scenario, destination: DestinationKey) -> String {
    scenario
        .destination(destination)
        .map_or_else(|| "?".to_owned(), |found| found.id().to_owned())
}

fn node_id(scenario: &Scenario, route: &Route) -> String {
    scenario
        .node(route.node())
        .map_or_else(|| "?".to_owned(), |found| found.id().to_owned())
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::scenario::{DeliveryPolicy, DemandTarget};

    use super::*;

    /// The two-warehouse, three-destination layout with too little capacity
    /// into `x`: combined capacity 350 against a target of 400.
    fn short_on_x() -> Result<Scenario, crate::scenario::ValidationError> {
        Scenario::builder(USD)
            .warehouse("a", Money::from_minor(100_000, USD))
            .warehouse("b", Money::from_minor(50_000, USD))
            .destination("x")
            .destination("y")
            .destination("z")
            .route("a", "x", 200, Money::from_minor(500, USD), 2)
            .route("b", "x", 150, Money::from_minor(600, USD), 3)
            .route("a", "y", 400, Money::from_minor(400, USD), 2)
            .route("b", "y", 400, Money::from_minor(450, USD), 2)
            .route("a", "z", 400, Money::from_minor(700, USD), 2)
            .route("b", "z", 400, Money::from_minor(650, USD), 2)
            .year(
                1000,
                [
                    ("x", DemandTarget::Exact(400)),
                    ("y", DemandTarget::Exact(300)),
                    ("z", DemandTarget::Exact(300)),
                ],
            )
            .build()
    }

    #[test]
    fn destination_shortfall_reports_achievable_and_shortfall() -> TestResult {
        let scenario = short_on_x()?;

        let findings = preflight(&scenario);

        assert_eq!(
            findings.first(),
            Some(&Finding::DestinationShortfall {
                year: 0,
                destination: "x".to_owned(),
                required: 400,
                achievable: 350,
                shortfall: 50,
            })
        );

        Ok(())
    }

    #[test]
    fn feasible_capacities_produce_no_findings() -> TestResult {
        let scenario = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .route("a", "x", 500, Money::from_minor(500, USD), 2)
            .year(400, [("x", DemandTarget::Exact(400))])
            .build()?;

        assert!(preflight(&scenario).is_empty());

        Ok(())
    }

    #[test]
    fn total_shortfall_is_reported_when_the_network_is_too_small() -> TestResult {
        let scenario = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .destination("y")
            .route("a", "x", 300, Money::from_minor(500, USD), 2)
            .route("a", "y", 300, Money::from_minor(500, USD), 2)
            .year(
                700,
                [
                    ("x", DemandTarget::Exact(300)),
                    ("y", DemandTarget::Exact(400)),
                ],
            )
            .build()?;

        let findings = preflight(&scenario);

        assert!(findings.contains(&Finding::TotalShortfall {
            year: 0,
            required: 700,
            achievable: 600,
            shortfall: 100,
        }));

        Ok(())
    }

    #[test]
    fn on_time_shortfall_is_reported_when_fast_routes_are_too_small() -> TestResult {
        let scenario = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .route("a", "x", 1000, Money::from_minor(500, USD), 5)
            .delivery(DeliveryPolicy::new(3, Percentage::from(0.2)))
            .year(100, [("x", DemandTarget::Exact(100))])
            .build()?;

        let findings = preflight(&scenario);

        // All capacity is late; at least 80 shipments must be on time.
        assert!(findings.contains(&Finding::OnTimeShortfall {
            year: 0,
            required: 80,
            achievable: 0,
            shortfall: 80,
        }));

        Ok(())
    }

    #[test]
    fn share_targets_use_the_band_lower_bound() -> TestResult {
        let scenario = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .destination("y")
            .route("a", "x", 440, Money::from_minor(500, USD), 2)
            .route("a", "y", 600, Money::from_minor(500, USD), 2)
            .year(
                1000,
                [
                    (
                        "x",
                        DemandTarget::Share {
                            fraction: Percentage::from(0.5),
                            tolerance: Percentage::from(0.1),
                        },
                    ),
                    (
                        "y",
                        DemandTarget::Share {
                            fraction: Percentage::from(0.5),
                            tolerance: Percentage::from(0.1),
                        },
                    ),
                ],
            )
            .build()?;

        let findings = preflight(&scenario);

        // x needs at least 500 · 0.9 = 450, but only 440 can arrive.
        assert_eq!(
            findings.first(),
            Some(&Finding::DestinationShortfall {
                year: 0,
                destination: "x".to_owned(),
                required: 450,
                achievable: 440,
                shortfall: 10,
            })
        );

        Ok(())
    }

    #[test]
    fn diagnosis_is_deterministic_for_an_unchanged_scenario() -> TestResult {
        let scenario = short_on_x()?;

        let first = diagnose_infeasible(&scenario);
        let second = diagnose_infeasible(&scenario);

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn infeasible_without_findings_blames_the_bands() -> TestResult {
        let scenario = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .route("a", "x", 500, Money::from_minor(500, USD), 2)
            .year(400, [("x", DemandTarget::Exact(400))])
            .build()?;

        let diagnosis = diagnose_infeasible(&scenario);

        assert_eq!(diagnosis.status, DiagnosisStatus::Infeasible);
        assert!(diagnosis.offending_entities.is_empty());
        assert!(diagnosis.message.contains("jointly unsatisfiable"));

        Ok(())
    }

    #[test]
    fn unbounded_names_the_negative_unit_cost_route() -> TestResult {
        let scenario = Scenario::builder(USD)
            .warehouse("a", Money::from_minor(0, USD))
            .destination("x")
            .route("a", "x", 500, Money::from_minor(-500, USD), 2)
            .year(400, [("x", DemandTarget::Exact(400))])
            .build()?;

        let diagnosis = diagnose_unbounded(&scenario);

        assert_eq!(diagnosis.status, DiagnosisStatus::Unbounded);
        assert_eq!(
            diagnosis.offending_entities,
            vec!["route:a->x".to_owned()]
        );
        assert!(diagnosis.suggested_fix.contains("unit cost"));

        Ok(())
    }

    #[test]
    fn timeout_diagnosis_renders_the_budget() {
        let diagnosis = diagnose_timeout(Duration::from_secs(30));

        assert_eq!(diagnosis.status, DiagnosisStatus::TimedOut);
        assert!(diagnosis.message.contains("30"));
        assert!(diagnosis.suggested_fix.contains("time limit"));
    }

    #[test]
    fn not_solved_diagnosis_carries_the_backend_reason() {
        let diagnosis = diagnose_not_solved("numerical difficulties");

        assert_eq!(diagnosis.status, DiagnosisStatus::NotSolved);
        assert!(diagnosis.message.contains("numerical difficulties"));
    }
}
