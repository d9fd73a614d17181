//! Destinations and demand targets

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use slotmap::new_key_type;

new_key_type! {
    /// Destination Key
    pub struct DestinationKey;
}

/// A destination in the route network.
#[derive(Debug, Clone)]
pub struct Destination {
    id: String,
}

impl Destination {
    /// Create a new destination.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Return the destination id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// How much a destination must receive in one year.
#[derive(Debug, Clone, Copy)]
pub enum DemandTarget {
    /// The destination must receive exactly this many shipments.
    Exact(u64),

    /// The destination must receive its share of the year total, within a
    /// tolerance band around `total · fraction`.
    Share {
        /// Fraction of the year's total shipments aimed at this destination.
        fraction: Percentage,

        /// Permitted relative deviation from the aimed quantity.
        tolerance: Percentage,
    },
}

/// Inclusive fulfillment bounds for one destination-year, in shipment units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBounds {
    /// Least acceptable realized quantity.
    pub lower: Decimal,

    /// Greatest acceptable realized quantity.
    pub upper: Decimal,
}

impl DemandTarget {
    /// Compute the fulfillment bounds against the year's declared total.
    pub fn bounds(&self, total_shipments: u64) -> TargetBounds {
        match self {
            Self::Exact(quantity) => {
                let exact = Decimal::from(*quantity);

                TargetBounds {
                    lower: exact,
                    upper: exact,
                }
            }
            Self::Share {
                fraction,
                tolerance,
            } => {
                let aimed = *fraction * Decimal::from(total_shipments);
                let tolerance = *tolerance * Decimal::ONE;

                TargetBounds {
                    lower: aimed * (Decimal::ONE - tolerance),
                    upper: aimed * (Decimal::ONE + tolerance),
                }
            }
        }
    }

    /// The least whole quantity the destination must be able to receive for
    /// the year to be feasible. Used by the pre-solve capacity checks.
    pub fn minimum_required(&self, total_shipments: u64) -> u64 {
        self.bounds(total_shipments)
            .lower
            .ceil()
            .to_u64()
            .unwrap_or(0)
    }
}
