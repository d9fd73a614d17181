//! Origin nodes

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::scenario::tiers::TierSchedule;

new_key_type! {
    /// Node Key
    pub struct NodeKey;
}

/// An origin node in the route network: a warehouse or a carrier.
///
/// A node carries a fixed cost charged once if any of its routes ships a
/// positive quantity, and a [`TierSchedule`] describing its earned discount
/// tiers. Warehouses use the trivial single-tier schedule.
#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    fixed_cost: Money<'static, Currency>,
    tiers: TierSchedule,
}

impl Node {
    /// Create a new node.
    pub fn new(
        id: impl Into<String>,
        fixed_cost: Money<'static, Currency>,
        tiers: TierSchedule,
    ) -> Self {
        Self {
            id: id.into(),
            fixed_cost,
            tiers,
        }
    }

    /// Return the node id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the fixed cost charged when the node is activated.
    pub fn fixed_cost(&self) -> &Money<'static, Currency> {
        &self.fixed_cost
    }

    /// Return the node's discount tier schedule.
    pub fn tiers(&self) -> &TierSchedule {
        &self.tiers
    }

    /// Whether activating this node incurs a fixed cost.
    #[must_use]
    pub fn has_fixed_cost(&self) -> bool {
        self.fixed_cost.to_minor_units() != 0
    }
}
