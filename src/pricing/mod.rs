//! Fare rule catalog, trip resolution, and fare calculation.
//!
//! The module is layered the way a booking flows through it: the store holds
//! the catalog, the resolver picks the single governing rule for a trip, the
//! overlay filter selects applicable special rules, and the calculator turns
//! rule plus trip into an itemized fare. [`FarePricingService`] composes the
//! layers behind one facade for both administrative and booking callers.

pub mod calculator;
pub(crate) mod csv;
pub mod domain;
pub(crate) mod overlay;
pub mod resolver;
pub mod service;
pub mod statistics;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use calculator::{CalculationError, FareCalculator};
pub use csv::CsvImportReport;
pub use domain::{
    CalculateFareParams, CalculationType, FareCalculationResult, FarePricing, FareRuleDraft,
    FareRuleId, FareRuleUpdate, FareSpecialRule, RuleStatus, SpecialRuleDraft, SpecialRuleId,
    SpecialRuleType,
};
pub use resolver::TripContext;
pub use service::{
    BulkRuleUpdate, BulkUpdateReport, FarePricingService, FareServiceError, RuleFilters,
};
pub use statistics::{
    CalculationTypeBreakdownEntry, FareStatistics, SpecialRuleTypeBreakdownEntry,
    StatusBreakdownEntry, VehicleTypeBreakdownEntry,
};
pub use store::{FareRuleStore, InMemoryFareRuleStore, StoreError};
