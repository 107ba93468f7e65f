use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::pricing::domain::{
    CalculateFareParams, CalculationType, FarePricing, FareRuleDraft, FareRuleId, FareSpecialRule,
    RuleStatus, SpecialRuleId, SpecialRuleType,
};
use crate::pricing::resolver::TripContext;
use crate::pricing::store::{FareRuleStore, InMemoryFareRuleStore, StoreError};
use crate::pricing::FarePricingService;

pub(super) fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

pub(super) fn stamp(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// City sedan tariff: 50 base, 10/km after 2 free km, floored at 80, with a
/// 5 booking fee and 5 platform fee. Surge configured but disabled.
pub(super) fn city_sedan_rule() -> FarePricing {
    FarePricing {
        id: FareRuleId("rule-sedan".to_string()),
        name: "City Sedan".to_string(),
        description: None,
        calculation_type: CalculationType::PerKm,
        vehicle_type: Some("sedan".to_string()),
        applicable_cities: None,
        applicable_states: None,
        base_fare: Decimal::from(50),
        minimum_fare: Decimal::from(80),
        price_per_km: Some(Decimal::from(10)),
        price_per_minute: None,
        free_km: Decimal::from(2),
        free_minutes: Decimal::ZERO,
        booking_fee: Decimal::from(5),
        booking_fee_percentage: Decimal::ZERO,
        platform_fee: Decimal::from(5),
        platform_fee_percentage: Decimal::ZERO,
        surge_multiplier: Decimal::ONE,
        surge_enabled: false,
        valid_from_date: None,
        valid_to_date: None,
        valid_from_time: None,
        valid_to_time: None,
        valid_days_of_week: None,
        status: RuleStatus::Active,
        priority: 10,
        created_by: None,
        updated_by: None,
        created_at: stamp(2025, 1, 1),
        updated_at: stamp(2025, 1, 1),
    }
}

/// Same tariff as [`city_sedan_rule`] expressed as a creation draft.
pub(super) fn sedan_draft(name: &str) -> FareRuleDraft {
    let mut draft = FareRuleDraft::new(name, CalculationType::PerKm);
    draft.vehicle_type = Some("sedan".to_string());
    draft.base_fare = Decimal::from(50);
    draft.minimum_fare = Decimal::from(80);
    draft.price_per_km = Some(Decimal::from(10));
    draft.free_km = Decimal::from(2);
    draft.booking_fee = Decimal::from(5);
    draft.platform_fee = Decimal::from(5);
    draft.priority = 10;
    draft
}

/// Overlay with no adjustments set; tests layer on what they exercise. The
/// validity window spans a decade so only tests that pin `requested_at`
/// interact with it.
pub(super) fn special_rule(id: &str, name: &str) -> FareSpecialRule {
    FareSpecialRule {
        id: SpecialRuleId(id.to_string()),
        name: name.to_string(),
        description: None,
        rule_type: SpecialRuleType::Promotional,
        discount_percentage: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        surge_multiplier: None,
        applicable_cities: None,
        applicable_vehicle_types: None,
        min_distance_km: None,
        max_distance_km: None,
        valid_from: dt(2020, 1, 1, 0, 0),
        valid_to: dt(2030, 12, 31, 23, 59),
        status: RuleStatus::Active,
        priority: 0,
        max_uses_per_user: None,
        total_max_uses: None,
        current_uses: 0,
        promo_code: None,
    }
}

/// Monday midday sedan trip in Indore.
pub(super) fn midday_context() -> TripContext {
    TripContext {
        vehicle_type: "sedan".to_string(),
        city: Some("Indore".to_string()),
        state: Some("Madhya Pradesh".to_string()),
        requested_at: dt(2025, 6, 16, 12, 0),
    }
}

pub(super) fn trip(distance_km: i64, duration_minutes: i64) -> CalculateFareParams {
    CalculateFareParams::new(
        "sedan",
        Decimal::from(distance_km),
        Decimal::from(duration_minutes),
    )
}

pub(super) fn build_service() -> (
    FarePricingService<InMemoryFareRuleStore>,
    Arc<InMemoryFareRuleStore>,
) {
    let store = Arc::new(InMemoryFareRuleStore::new());
    let service = FarePricingService::new(store.clone(), EngineConfig::default());
    (service, store)
}

pub(super) struct UnavailableStore;

impl FareRuleStore for UnavailableStore {
    fn insert_rule(&self, _rule: FarePricing) -> Result<FarePricing, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn rule(&self, _id: &FareRuleId) -> Result<Option<FarePricing>, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn rules(&self) -> Result<Vec<FarePricing>, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn replace_rule(&self, _rule: FarePricing) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn delete_rule(&self, _id: &FareRuleId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn insert_special_rule(&self, _rule: FareSpecialRule) -> Result<FareSpecialRule, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn special_rule(&self, _id: &SpecialRuleId) -> Result<Option<FareSpecialRule>, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn special_rules(&self) -> Result<Vec<FareSpecialRule>, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn delete_special_rule(&self, _id: &SpecialRuleId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn record_special_rule_use(&self, _id: &SpecialRuleId) -> Result<u32, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }
}
