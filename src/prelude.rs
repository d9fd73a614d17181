//! Waybill prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    diagnostics::{Diagnosis, DiagnosisStatus, Finding, preflight},
    model::ModelError,
    plan::{NodeActivation, Shipment, ShipmentPlan, SolutionReport, TierSelection},
    scenario::{
        DeliveryPolicy, DemandTarget, Scenario, ScenarioBuilder, ValidationError, YearDemand,
        destinations::{Destination, DestinationKey},
        file::FileError,
        nodes::{Node, NodeKey},
        routes::Route,
        tiers::{DiscountTier, TierSchedule},
    },
    solver::{Outcome, SolveLimits, optimize},
};
