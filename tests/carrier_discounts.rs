//! Integration tests for the carrier earned-discount variant

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use waybill::prelude::*;

fn swift_tiers() -> Vec<DiscountTier> {
    vec![
        DiscountTier::new(1000, Percentage::from(0.9)),
        DiscountTier::new(5000, Percentage::from(0.8)),
    ]
}

#[test]
fn realized_volume_selects_the_greatest_earned_tier() -> TestResult {
    let scenario = Scenario::builder(USD)
        .carrier("swift", swift_tiers())
        .destination("x")
        .route("swift", "x", 10_000, Money::from_minor(500, USD), 2)
        .year(4000, [("x", DemandTarget::Exact(4000))])
        .build()?;

    let outcome = optimize(&scenario, &SolveLimits::default())?;
    let report = outcome.report().ok_or("expected an optimal outcome")?;

    // Volume 4000 earns the 1000-threshold tier, never the 5000-threshold one.
    let selection = report
        .tier_for(0, "swift")
        .ok_or("missing tier selection for swift")?;

    assert_eq!(selection.tier, 1);
    assert_eq!(selection.min_volume, 1000);
    assert_eq!(selection.multiplier, Decimal::new(9, 1));
    assert_eq!(selection.volume, 4000);

    // 4000 shipments at 500 · 0.9 minor units each.
    assert_eq!(report.objective_value().to_minor_units(), 1_800_000);

    Ok(())
}

#[test]
fn exactly_one_tier_is_selected_per_carrier_year() -> TestResult {
    let scenario = Scenario::builder(USD)
        .carrier("swift", swift_tiers())
        .carrier(
            "turtle",
            vec![DiscountTier::new(2000, Percentage::from(0.7))],
        )
        .destination("x")
        .route("swift", "x", 10_000, Money::from_minor(500, USD), 2)
        .route("turtle", "x", 10_000, Money::from_minor(600, USD), 4)
        .year(4000, [("x", DemandTarget::Exact(4000))])
        .build()?;

    let outcome = optimize(&scenario, &SolveLimits::default())?;
    let report = outcome.report().ok_or("expected an optimal outcome")?;

    // One selection per carrier-year, even for carriers shipping nothing.
    assert_eq!(report.tier_selections().len(), 2);

    // turtle's discounted rate (600 · 0.7 = 420) beats swift's best (450),
    // so everything rides turtle and swift idles at its base tier.
    let turtle = report
        .tier_for(0, "turtle")
        .ok_or("missing tier selection for turtle")?;
    assert_eq!(turtle.min_volume, 2000);
    assert_eq!(turtle.volume, 4000);

    let swift = report
        .tier_for(0, "swift")
        .ok_or("missing tier selection for swift")?;
    assert_eq!(swift.tier, 0);
    assert_eq!(swift.min_volume, 0);
    assert_eq!(swift.volume, 0);

    assert_eq!(report.objective_value().to_minor_units(), 1_680_000);

    Ok(())
}

#[test]
fn each_year_earns_its_tier_independently() -> TestResult {
    let scenario = Scenario::builder(USD)
        .carrier("swift", swift_tiers())
        .destination("x")
        .route("swift", "x", 10_000, Money::from_minor(500, USD), 2)
        .year(4000, [("x", DemandTarget::Exact(4000))])
        .year(6000, [("x", DemandTarget::Exact(6000))])
        .build()?;

    let outcome = optimize(&scenario, &SolveLimits::default())?;
    let report = outcome.report().ok_or("expected an optimal outcome")?;

    let first = report
        .tier_for(0, "swift")
        .ok_or("missing year 0 selection")?;
    let second = report
        .tier_for(1, "swift")
        .ok_or("missing year 1 selection")?;

    // Year volumes do not accumulate: 4000 earns the 1000 tier, 6000 the
    // 5000 tier.
    assert_eq!(first.min_volume, 1000);
    assert_eq!(second.min_volume, 5000);

    // 4000·450 + 6000·400.
    assert_eq!(report.objective_value().to_minor_units(), 4_200_000);

    Ok(())
}

#[test]
fn share_targets_settle_inside_their_tolerance_bands() -> TestResult {
    let scenario = Scenario::builder(USD)
        .carrier(
            "swift",
            vec![DiscountTier::new(1000, Percentage::from(0.9))],
        )
        .destination("a")
        .destination("b")
        .route("swift", "a", 10_000, Money::from_minor(500, USD), 2)
        .route("swift", "b", 10_000, Money::from_minor(800, USD), 2)
        .year(
            4000,
            [
                (
                    "a",
                    DemandTarget::Share {
                        fraction: Percentage::from(0.5),
                        tolerance: Percentage::from(0.05),
                    },
                ),
                (
                    "b",
                    DemandTarget::Share {
                        fraction: Percentage::from(0.5),
                        tolerance: Percentage::from(0.05),
                    },
                ),
            ],
        )
        .build()?;

    let outcome = optimize(&scenario, &SolveLimits::default())?;
    let report = outcome.report().ok_or("expected an optimal outcome")?;

    let to_a = report.plan().arriving(0, "a");
    let to_b = report.plan().arriving(0, "b");

    // Bands are 2000 ± 100 each; the cheaper destination is pushed to its
    // upper edge and the total still lands exactly on 4000.
    assert_eq!(to_a + to_b, 4000);
    assert_eq!(to_a, 2100);
    assert_eq!(to_b, 1900);

    // 0.9 · (2100·500 + 1900·800).
    assert_eq!(report.objective_value().to_minor_units(), 2_313_000);

    Ok(())
}
