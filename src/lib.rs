//! Fare pricing engine for ride booking platforms.
//!
//! The crate keeps the pricing rule catalog, trip-context resolution, and fare
//! math in one place: administrative tooling manages [`pricing::FarePricing`]
//! and [`pricing::FareSpecialRule`] records through
//! [`pricing::FarePricingService`], and booking flows ask the same service for
//! itemized estimates. Storage sits behind [`pricing::FareRuleStore`] so an
//! embedding deployment can slot in its own persistence; the bundled
//! [`pricing::InMemoryFareRuleStore`] backs tests and single-node use.

pub mod config;
pub mod pricing;
pub mod telemetry;
