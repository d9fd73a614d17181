//! Waybill
//!
//! Waybill is a minimum-cost shipment allocation engine. It formulates
//! allocation across a bipartite route network (capacity, fulfillment,
//! fixed-cost activation, delivery service levels, and earned discount tiers)
//! as a single mixed-integer linear program, solves it through an external
//! MILP backend, and, when no feasible allocation exists, diagnoses which
//! constraint family is binding and how to fix it.

pub mod diagnostics;
pub mod model;
pub mod plan;
pub mod prelude;
pub mod scenario;
pub mod solver;
