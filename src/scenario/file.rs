//! Scenario documents
//!
//! Scenarios are accepted as structured data regardless of origin; this
//! module loads them from YAML documents. Raw document structs are
//! deserialized first and then funnelled through [`ScenarioBuilder`], so a
//! document passes exactly the same validation as a programmatically built
//! scenario.

use std::{collections::BTreeMap, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use serde::Deserialize;
use thiserror::Error;

use crate::scenario::{
    DeliveryPolicy, DemandTarget, Scenario, ScenarioBuilder, ValidationError,
    tiers::DiscountTier,
};

/// Errors raised while loading a scenario document.
#[derive(Debug, Error)]
pub enum FileError {
    /// The document is not valid YAML for the scenario schema.
    #[error(transparent)]
    Parse(#[from] serde_norway::Error),

    /// The document parsed but failed scenario validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Raw scenario document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    currency: String,
    nodes: Vec<NodeFile>,
    destinations: Vec<String>,
    routes: Vec<RouteFile>,
    #[serde(default)]
    delivery: Option<DeliveryFile>,
    years: Vec<YearFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeFile {
    id: String,
    #[serde(default)]
    fixed_cost_minor: i64,
    #[serde(default)]
    tiers: Vec<TierFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TierFile {
    min_volume: u64,
    multiplier: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteFile {
    node: String,
    destination: String,
    capacity: u64,
    unit_cost_minor: i64,
    delivery_days: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeliveryFile {
    target_days: u32,
    tolerance: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct YearFile {
    total_shipments: u64,
    targets: BTreeMap<String, TargetFile>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TargetFile {
    Exact {
        exact: u64,
    },
    Share {
        share: Decimal,
        #[serde(default)]
        tolerance: Decimal,
    },
}

/// Load a scenario from a YAML document.
///
/// # Errors
///
/// Returns a [`FileError`] if the document is not valid YAML for the scenario
/// schema, names an unknown currency code, or fails scenario validation.
pub fn from_str(document: &str) -> Result<Scenario, FileError> {
    let file: ScenarioFile = serde_norway::from_str(document)?;

    Ok(build(file)?)
}

/// Load a scenario from a YAML file on disk.
///
/// # Errors
///
/// Returns a [`FileError`] if the file cannot be read or its content fails
/// [`from_str`].
pub fn from_path(path: impl AsRef<Path>) -> Result<Scenario, FileError> {
    let document = std::fs::read_to_string(path)?;

    from_str(&document)
}

fn build(file: ScenarioFile) -> Result<Scenario, ValidationError> {
    let currency = iso::find(&file.currency).ok_or(ValidationError::UnknownCurrency {
        code: file.currency.clone(),
    })?;

    let mut builder = Scenario::builder(currency);

    for node in file.nodes {
        let tiers = node
            .tiers
            .into_iter()
            .map(|tier| DiscountTier::new(tier.min_volume, Percentage::from(tier.multiplier)))
            .collect();

        builder = builder.node(
            node.id,
            Money::from_minor(node.fixed_cost_minor, currency),
            tiers,
        );
    }

    for destination in file.destinations {
        builder = builder.destination(destination);
    }

    for route in file.routes {
        builder = builder.route(
            route.node,
            route.destination,
            route.capacity,
            Money::from_minor(route.unit_cost_minor, currency),
            route.delivery_days,
        );
    }

    if let Some(delivery) = file.delivery {
        builder = builder.delivery(DeliveryPolicy::new(
            delivery.target_days,
            Percentage::from(delivery.tolerance),
        ));
    }

    for year in file.years {
        let targets: Vec<(String, DemandTarget)> = year
            .targets
            .into_iter()
            .map(|(id, target)| (id, demand_target(target)))
            .collect();

        builder = builder.year(year.total_shipments, targets);
    }

    builder.build()
}

fn demand_target(target: TargetFile) -> DemandTarget {
    match target {
        TargetFile::Exact { exact } => DemandTarget::Exact(exact),
        TargetFile::Share { share, tolerance } => DemandTarget::Share {
            fraction: Percentage::from(share),
            tolerance: Percentage::from(tolerance),
        },
    }
}
