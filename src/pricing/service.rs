use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::EngineConfig;

use super::calculator::{CalculationError, FareCalculator};
use super::csv::{self, CsvImportReport};
use super::domain::{
    CalculateFareParams, FareCalculationResult, FarePricing, FareRuleDraft, FareRuleId,
    FareRuleUpdate, FareSpecialRule, RuleStatus, SpecialRuleDraft, SpecialRuleId,
};
use super::overlay::applicable_overlays;
use super::resolver::{self, TripContext};
use super::statistics::{self, FareStatistics};
use super::store::{FareRuleStore, StoreError};
use super::validation::{validate_rule, validate_special_rule};

/// Facade composing the rule store, resolver, and calculator. Administrative
/// surfaces drive the CRUD operations; booking flows call
/// [`FarePricingService::calculate_fare_estimate`].
pub struct FarePricingService<S> {
    store: Arc<S>,
    calculator: FareCalculator,
}

impl<S> FarePricingService<S>
where
    S: FareRuleStore + 'static,
{
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let calculator = FareCalculator::new(&config);
        Self { store, calculator }
    }

    /// Validate and persist a new catalog rule, assigning identity and stamps.
    pub fn create_rule(&self, draft: FareRuleDraft) -> Result<FarePricing, FareServiceError> {
        let rule = draft.into_rule(FareRuleId::generate(), Utc::now());

        let violations = validate_rule(&rule);
        if !violations.is_empty() {
            return Err(FareServiceError::ValidationFailed { violations });
        }

        let stored = self.store.insert_rule(rule)?;
        info!(rule_id = %stored.id, name = %stored.name, "fare rule created");
        Ok(stored)
    }

    pub fn get_rule(&self, id: &FareRuleId) -> Result<FarePricing, FareServiceError> {
        self.store
            .rule(id)?
            .ok_or_else(|| FareServiceError::RuleNotFound(id.clone()))
    }

    /// Catalog rules in insertion order, narrowed by the given filters.
    pub fn list_rules(&self, filters: &RuleFilters) -> Result<Vec<FarePricing>, FareServiceError> {
        let mut rules = self.store.rules()?;
        rules.retain(|rule| filters.matches(rule));
        Ok(rules)
    }

    /// Merge a patch onto the stored rule, re-validating the merged record as
    /// a whole before committing.
    pub fn update_rule(
        &self,
        id: &FareRuleId,
        patch: FareRuleUpdate,
    ) -> Result<FarePricing, FareServiceError> {
        let mut rule = self.get_rule(id)?;
        patch.apply_to(&mut rule);
        rule.updated_at = Utc::now();

        let violations = validate_rule(&rule);
        if !violations.is_empty() {
            return Err(FareServiceError::ValidationFailed { violations });
        }

        self.store.replace_rule(rule.clone())?;
        info!(rule_id = %rule.id, "fare rule updated");
        Ok(rule)
    }

    pub fn delete_rule(&self, id: &FareRuleId) -> Result<(), FareServiceError> {
        if !self.store.delete_rule(id)? {
            return Err(FareServiceError::RuleNotFound(id.clone()));
        }
        info!(rule_id = %id, "fare rule deleted");
        Ok(())
    }

    /// Clone a rule under a new identity. The copy is forced inactive with
    /// priority zero so a duplicate can never silently take over production
    /// pricing before an operator reviews it.
    pub fn duplicate_rule(
        &self,
        id: &FareRuleId,
        new_name: Option<String>,
    ) -> Result<FarePricing, FareServiceError> {
        let source = self.get_rule(id)?;
        let now = Utc::now();

        let mut copy = source.clone();
        copy.id = FareRuleId::generate();
        copy.name = new_name.unwrap_or_else(|| format!("{} (Copy)", source.name));
        copy.status = RuleStatus::Inactive;
        copy.priority = 0;
        copy.created_by = None;
        copy.updated_by = None;
        copy.created_at = now;
        copy.updated_at = now;

        let stored = self.store.insert_rule(copy)?;
        info!(source_id = %id, rule_id = %stored.id, "fare rule duplicated");
        Ok(stored)
    }

    /// Flip a rule between active and inactive. Scheduled rules are refused;
    /// activating one by hand would bypass its window intent.
    pub fn toggle_rule_status(&self, id: &FareRuleId) -> Result<FarePricing, FareServiceError> {
        let mut rule = self.get_rule(id)?;

        rule.status = match rule.status {
            RuleStatus::Active => RuleStatus::Inactive,
            RuleStatus::Inactive => RuleStatus::Active,
            RuleStatus::Scheduled => {
                return Err(FareServiceError::ValidationFailed {
                    violations: vec!["scheduled rules cannot be toggled".to_string()],
                })
            }
        };
        rule.updated_at = Utc::now();

        self.store.replace_rule(rule.clone())?;
        info!(rule_id = %rule.id, status = rule.status.label(), "fare rule status toggled");
        Ok(rule)
    }

    pub fn create_special_rule(
        &self,
        draft: SpecialRuleDraft,
    ) -> Result<FareSpecialRule, FareServiceError> {
        let rule = draft.into_rule(SpecialRuleId::generate());

        let violations = validate_special_rule(&rule);
        if !violations.is_empty() {
            return Err(FareServiceError::ValidationFailed { violations });
        }

        let stored = self.store.insert_special_rule(rule)?;
        info!(special_rule_id = %stored.id, name = %stored.name, "special rule created");
        Ok(stored)
    }

    pub fn get_special_rule(
        &self,
        id: &SpecialRuleId,
    ) -> Result<FareSpecialRule, FareServiceError> {
        self.store
            .special_rule(id)?
            .ok_or_else(|| FareServiceError::SpecialRuleNotFound(id.clone()))
    }

    pub fn list_special_rules(&self) -> Result<Vec<FareSpecialRule>, FareServiceError> {
        Ok(self.store.special_rules()?)
    }

    pub fn delete_special_rule(&self, id: &SpecialRuleId) -> Result<(), FareServiceError> {
        if !self.store.delete_special_rule(id)? {
            return Err(FareServiceError::SpecialRuleNotFound(id.clone()));
        }
        info!(special_rule_id = %id, "special rule deleted");
        Ok(())
    }

    /// Consume one use of a capped special rule at booking confirmation.
    /// Estimates never consume uses; only confirmed bookings redeem.
    pub fn redeem_special_rule(&self, id: &SpecialRuleId) -> Result<u32, FareServiceError> {
        match self.store.record_special_rule_use(id) {
            Ok(uses) => {
                info!(special_rule_id = %id, uses, "special rule redeemed");
                Ok(uses)
            }
            Err(StoreError::NotFound) => Err(FareServiceError::SpecialRuleNotFound(id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// The single base rule governing this trip, or `NoApplicableRule`.
    pub fn resolve_rule(
        &self,
        params: &CalculateFareParams,
    ) -> Result<FarePricing, FareServiceError> {
        let context = trip_context(params);
        let rules = self.store.rules()?;
        resolver::resolve(&rules, &context)
            .cloned()
            .ok_or(FareServiceError::NoApplicableRule)
    }

    /// Base calculation against an already-resolved rule, no overlays.
    pub fn calculate(
        &self,
        params: &CalculateFareParams,
        rule: Option<&FarePricing>,
    ) -> Result<FareCalculationResult, FareServiceError> {
        Ok(self.calculator.calculate(params, rule)?)
    }

    /// Resolve the base rule, collect applicable special rules, and produce
    /// the itemized estimate. Resolution failure propagates; it is "no price
    /// available", never a silent default fare.
    pub fn calculate_fare_estimate(
        &self,
        params: &CalculateFareParams,
    ) -> Result<FareCalculationResult, FareServiceError> {
        let context = trip_context(params);
        let rules = self.store.rules()?;
        let rule =
            resolver::resolve(&rules, &context).ok_or(FareServiceError::NoApplicableRule)?;

        let special_rules = self.store.special_rules()?;
        let overlays: Vec<FareSpecialRule> = applicable_overlays(
            &special_rules,
            &context,
            params.distance_km,
            params.promo_code.as_deref(),
        )
        .into_iter()
        .cloned()
        .collect();

        Ok(self
            .calculator
            .calculate_with_overlays(params, Some(rule), &overlays)?)
    }

    /// Aggregate catalog metrics for the administrative dashboard.
    pub fn statistics(&self) -> Result<FareStatistics, FareServiceError> {
        let rules = self.store.rules()?;
        let special_rules = self.store.special_rules()?;
        Ok(statistics::compile(&rules, &special_rules))
    }

    /// Apply each patch independently; one failure never rolls back the rest.
    pub fn bulk_update(&self, updates: Vec<BulkRuleUpdate>) -> BulkUpdateReport {
        let mut report = BulkUpdateReport::default();

        for update in updates {
            match self.update_rule(&update.id, update.patch) {
                Ok(_) => report.updated += 1,
                Err(err) => {
                    report.failed += 1;
                    report.errors.push(format!("{}: {}", update.id, err));
                }
            }
        }

        info!(updated = report.updated, failed = report.failed, "bulk rule update applied");
        report
    }

    /// Render the whole catalog as CSV.
    pub fn export_csv(&self) -> Result<String, FareServiceError> {
        let rules = self.store.rules()?;
        csv::export_rules(&rules).map_err(|err| FareServiceError::CsvExport(err.to_string()))
    }

    /// Import catalog rows, validating each through the same path as
    /// [`FarePricingService::create_rule`]. Bad rows are reported with their
    /// row number and skipped; the batch never aborts. Imported rules receive
    /// fresh identities and stamps.
    pub fn import_csv(&self, content: &str) -> CsvImportReport {
        let mut report = CsvImportReport::default();

        for row in csv::parse_rules(content) {
            let outcome = row.outcome.and_then(|draft| {
                self.create_rule(draft)
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            });
            match outcome {
                Ok(()) => report.imported += 1,
                Err(message) => {
                    report.failed += 1;
                    report.errors.push(format!("row {}: {}", row.line, message));
                }
            }
        }

        info!(
            imported = report.imported,
            failed = report.failed,
            "fare catalog imported"
        );
        report
    }
}

fn trip_context(params: &CalculateFareParams) -> TripContext {
    TripContext {
        vehicle_type: params.vehicle_type.clone(),
        city: params.city.clone(),
        state: params.state.clone(),
        requested_at: params
            .requested_at
            .unwrap_or_else(|| Utc::now().naive_utc()),
    }
}

/// Optional narrowing criteria for catalog listings. These are literal field
/// matches for operator search; resolution applicability is a separate,
/// stricter check.
#[derive(Debug, Clone, Default)]
pub struct RuleFilters {
    pub status: Option<RuleStatus>,
    pub vehicle_type: Option<String>,
    pub city: Option<String>,
}

impl RuleFilters {
    fn matches(&self, rule: &FarePricing) -> bool {
        if let Some(status) = self.status {
            if rule.status != status {
                return false;
            }
        }

        if let Some(vehicle_type) = &self.vehicle_type {
            match &rule.vehicle_type {
                Some(rule_vehicle) if rule_vehicle.eq_ignore_ascii_case(vehicle_type) => {}
                _ => return false,
            }
        }

        if let Some(city) = &self.city {
            let listed = rule
                .applicable_cities
                .as_deref()
                .map(|cities| cities.iter().any(|entry| entry.eq_ignore_ascii_case(city)))
                .unwrap_or(false);
            if !listed {
                return false;
            }
        }

        true
    }
}

/// Single entry in a bulk update request.
#[derive(Debug, Clone)]
pub struct BulkRuleUpdate {
    pub id: FareRuleId,
    pub patch: FareRuleUpdate,
}

/// Outcome of a best-effort bulk update.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateReport {
    pub updated: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Error raised by the pricing service.
#[derive(Debug, thiserror::Error)]
pub enum FareServiceError {
    #[error("validation failed: {}", .violations.join("; "))]
    ValidationFailed { violations: Vec<String> },
    #[error("fare rule {0} not found")]
    RuleNotFound(FareRuleId),
    #[error("special rule {0} not found")]
    SpecialRuleNotFound(SpecialRuleId),
    #[error("no applicable fare rule for the trip context")]
    NoApplicableRule,
    #[error(transparent)]
    Calculation(#[from] CalculationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("catalog export failed: {0}")]
    CsvExport(String),
}
