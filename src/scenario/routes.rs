//! Routes

use rusty_money::{Money, iso::Currency};

use crate::scenario::{destinations::DestinationKey, nodes::NodeKey};

/// A directed route from an origin node to a destination.
#[derive(Debug, Clone)]
pub struct Route {
    node: NodeKey,
    destination: DestinationKey,
    capacity: u64,
    unit_cost: Money<'static, Currency>,
    delivery_days: u32,
}

impl Route {
    /// Create a new route.
    pub fn new(
        node: NodeKey,
        destination: DestinationKey,
        capacity: u64,
        unit_cost: Money<'static, Currency>,
        delivery_days: u32,
    ) -> Self {
        Self {
            node,
            destination,
            capacity,
            unit_cost,
            delivery_days,
        }
    }

    /// Return the origin node key.
    pub fn node(&self) -> NodeKey {
        self.node
    }

    /// Return the destination key.
    pub fn destination(&self) -> DestinationKey {
        self.destination
    }

    /// Return the upper bound on the quantity this route can carry per year.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Return the undiscounted cost per shipment on this route.
    pub fn unit_cost(&self) -> &Money<'static, Currency> {
        &self.unit_cost
    }

    /// Return the estimated delivery time in days.
    pub fn delivery_days(&self) -> u32 {
        self.delivery_days
    }

    /// Whether shipments on this route miss the delivery target.
    #[must_use]
    pub fn is_late(&self, target_days: u32) -> bool {
        self.delivery_days > target_days
    }
}
