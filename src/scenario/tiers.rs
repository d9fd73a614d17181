//! Earned discount tiers

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::scenario::ValidationError;

/// A single earned discount tier: shipping at least `min_volume` units in a
/// year prices every shipment at `unit_cost · multiplier`.
#[derive(Debug, Clone, Copy)]
pub struct DiscountTier {
    min_volume: u64,
    multiplier: Percentage,
}

impl DiscountTier {
    /// Create a new discount tier.
    #[must_use]
    pub fn new(min_volume: u64, multiplier: Percentage) -> Self {
        Self {
            min_volume,
            multiplier,
        }
    }

    /// Return the minimum yearly volume that earns this tier.
    pub fn min_volume(&self) -> u64 {
        self.min_volume
    }

    /// Return the cost multiplier applied while this tier is active.
    pub fn multiplier(&self) -> Percentage {
        self.multiplier
    }

    /// Return the multiplier as a plain decimal.
    pub fn multiplier_decimal(&self) -> Decimal {
        // decimal_percentage doesn't expose the underlying Decimal directly.
        self.multiplier * Decimal::ONE
    }
}

/// A node's discount tier schedule, ordered by strictly increasing
/// `min_volume` with the implicit base tier (min 0, multiplier 1.0) always
/// present at index 0.
#[derive(Debug, Clone)]
pub struct TierSchedule {
    tiers: Vec<DiscountTier>,
}

impl TierSchedule {
    /// The trivial schedule: only the undiscounted base tier.
    #[must_use]
    pub fn base() -> Self {
        Self {
            tiers: vec![DiscountTier::new(0, Percentage::from(1.0))],
        }
    }

    /// Build a schedule from declared tiers, inserting the base tier when the
    /// declaration does not start at a zero threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TierThresholdsNotIncreasing`] if the
    /// declared `min_volume` values are not strictly increasing.
    pub fn normalize(carrier: &str, declared: Vec<DiscountTier>) -> Result<Self, ValidationError> {
        let mut tiers = Vec::with_capacity(declared.len() + 1);

        if declared.first().is_none_or(|tier| tier.min_volume() > 0) {
            tiers.push(DiscountTier::new(0, Percentage::from(1.0)));
        }

        tiers.extend(declared);

        for (index, pair) in tiers.windows(2).enumerate() {
            if let [previous, next] = pair
                && next.min_volume() <= previous.min_volume()
            {
                return Err(ValidationError::TierThresholdsNotIncreasing {
                    carrier: carrier.to_owned(),
                    index: index + 1,
                });
            }
        }

        Ok(Self { tiers })
    }

    /// Return the tiers, base tier first.
    pub fn tiers(&self) -> &[DiscountTier] {
        &self.tiers
    }

    /// Return the tier at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&DiscountTier> {
        self.tiers.get(index)
    }

    /// Number of tiers, the implicit base tier included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether the schedule holds no tiers. Normalization always inserts the
    /// base tier, so this is false for any constructed schedule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Whether the schedule carries any earned tier beyond the base tier.
    #[must_use]
    pub fn is_tiered(&self) -> bool {
        self.tiers.len() > 1
    }

    /// The `min_volume` of the tier after `index`, if any. The top tier has
    /// no upper neighbour.
    pub fn next_threshold(&self, index: usize) -> Option<u64> {
        self.tiers.get(index + 1).map(DiscountTier::min_volume)
    }
}
