use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for catalog fare rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FareRuleId(pub String);

impl FareRuleId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for FareRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for special (overlay) rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialRuleId(pub String);

impl SpecialRuleId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SpecialRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared formula shape for a rule. The calculator keys off which per-unit
/// prices are populated; drafts and imports keep the two consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    Fixed,
    PerKm,
    PerMinute,
    PerKmPlusTime,
}

impl CalculationType {
    pub const fn label(self) -> &'static str {
        match self {
            CalculationType::Fixed => "fixed",
            CalculationType::PerKm => "per_km",
            CalculationType::PerMinute => "per_minute",
            CalculationType::PerKmPlusTime => "per_km_plus_time",
        }
    }

    pub const fn ordered() -> [CalculationType; 4] {
        [
            CalculationType::Fixed,
            CalculationType::PerKm,
            CalculationType::PerMinute,
            CalculationType::PerKmPlusTime,
        ]
    }

    /// Formula shape implied by which per-unit prices are present.
    pub const fn infer(bills_distance: bool, bills_time: bool) -> Self {
        match (bills_distance, bills_time) {
            (true, true) => CalculationType::PerKmPlusTime,
            (true, false) => CalculationType::PerKm,
            (false, true) => CalculationType::PerMinute,
            (false, false) => CalculationType::Fixed,
        }
    }
}

/// Lifecycle state shared by catalog and special rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Active,
    Inactive,
    Scheduled,
}

impl RuleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RuleStatus::Active => "active",
            RuleStatus::Inactive => "inactive",
            RuleStatus::Scheduled => "scheduled",
        }
    }

    pub const fn ordered() -> [RuleStatus; 3] {
        [
            RuleStatus::Active,
            RuleStatus::Inactive,
            RuleStatus::Scheduled,
        ]
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(RuleStatus::Active),
            "inactive" => Some(RuleStatus::Inactive),
            "scheduled" => Some(RuleStatus::Scheduled),
            _ => None,
        }
    }
}

/// Category of a special rule, for reporting and operator filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialRuleType {
    Holiday,
    Event,
    Weather,
    Demand,
    Promotional,
}

impl SpecialRuleType {
    pub const fn label(self) -> &'static str {
        match self {
            SpecialRuleType::Holiday => "holiday",
            SpecialRuleType::Event => "event",
            SpecialRuleType::Weather => "weather",
            SpecialRuleType::Demand => "demand",
            SpecialRuleType::Promotional => "promotional",
        }
    }

    pub const fn ordered() -> [SpecialRuleType; 5] {
        [
            SpecialRuleType::Holiday,
            SpecialRuleType::Event,
            SpecialRuleType::Weather,
            SpecialRuleType::Demand,
            SpecialRuleType::Promotional,
        ]
    }
}

/// One pricing policy, scoped by vehicle type, geography, and validity window.
///
/// A rule is applicable to a trip only when it is active, its vehicle type is
/// unset or matches, its city/state allow-lists are unset or contain the trip's
/// values, and the trip instant falls inside every configured validity
/// constraint. Resolution picks the highest-priority applicable rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarePricing {
    pub id: FareRuleId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub calculation_type: CalculationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_cities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_states: Option<Vec<String>>,
    pub base_fare: Decimal,
    pub minimum_fare: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_km: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_minute: Option<Decimal>,
    pub free_km: Decimal,
    pub free_minutes: Decimal,
    pub booking_fee: Decimal,
    pub booking_fee_percentage: Decimal,
    pub platform_fee: Decimal,
    pub platform_fee_percentage: Decimal,
    pub surge_multiplier: Decimal,
    pub surge_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_days_of_week: Option<Vec<Weekday>>,
    pub status: RuleStatus,
    pub priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Promotional/event/demand adjustment layered on top of a resolved base rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareSpecialRule {
    pub id: SpecialRuleId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rule_type: SpecialRuleType,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surge_multiplier: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_cities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_vehicle_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_distance_km: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance_km: Option<Decimal>,
    pub valid_from: NaiveDateTime,
    pub valid_to: NaiveDateTime,
    pub status: RuleStatus,
    pub priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses_per_user: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_max_uses: Option<u32>,
    pub current_uses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

/// Input payload for creating a catalog rule; identity and audit stamps are
/// assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareRuleDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub calculation_type: CalculationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_cities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_states: Option<Vec<String>>,
    pub base_fare: Decimal,
    pub minimum_fare: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_km: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_minute: Option<Decimal>,
    pub free_km: Decimal,
    pub free_minutes: Decimal,
    pub booking_fee: Decimal,
    pub booking_fee_percentage: Decimal,
    pub platform_fee: Decimal,
    pub platform_fee_percentage: Decimal,
    pub surge_multiplier: Decimal,
    pub surge_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_days_of_week: Option<Vec<Weekday>>,
    pub status: RuleStatus,
    pub priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl FareRuleDraft {
    /// Draft with neutral pricing so call sites only set the fields they need.
    pub fn new(name: impl Into<String>, calculation_type: CalculationType) -> Self {
        Self {
            name: name.into(),
            description: None,
            calculation_type,
            vehicle_type: None,
            applicable_cities: None,
            applicable_states: None,
            base_fare: Decimal::ZERO,
            minimum_fare: Decimal::ZERO,
            price_per_km: None,
            price_per_minute: None,
            free_km: Decimal::ZERO,
            free_minutes: Decimal::ZERO,
            booking_fee: Decimal::ZERO,
            booking_fee_percentage: Decimal::ZERO,
            platform_fee: Decimal::ZERO,
            platform_fee_percentage: Decimal::ZERO,
            surge_multiplier: Decimal::ONE,
            surge_enabled: false,
            valid_from_date: None,
            valid_to_date: None,
            valid_from_time: None,
            valid_to_time: None,
            valid_days_of_week: None,
            status: RuleStatus::Active,
            priority: 0,
            created_by: None,
        }
    }

    pub(crate) fn into_rule(self, id: FareRuleId, stamped_at: DateTime<Utc>) -> FarePricing {
        FarePricing {
            id,
            name: self.name,
            description: self.description,
            calculation_type: self.calculation_type,
            vehicle_type: self.vehicle_type,
            applicable_cities: self.applicable_cities,
            applicable_states: self.applicable_states,
            base_fare: self.base_fare,
            minimum_fare: self.minimum_fare,
            price_per_km: self.price_per_km,
            price_per_minute: self.price_per_minute,
            free_km: self.free_km,
            free_minutes: self.free_minutes,
            booking_fee: self.booking_fee,
            booking_fee_percentage: self.booking_fee_percentage,
            platform_fee: self.platform_fee,
            platform_fee_percentage: self.platform_fee_percentage,
            surge_multiplier: self.surge_multiplier,
            surge_enabled: self.surge_enabled,
            valid_from_date: self.valid_from_date,
            valid_to_date: self.valid_to_date,
            valid_from_time: self.valid_from_time,
            valid_to_time: self.valid_to_time,
            valid_days_of_week: self.valid_days_of_week,
            status: self.status,
            priority: self.priority,
            created_by: self.created_by,
            updated_by: None,
            created_at: stamped_at,
            updated_at: stamped_at,
        }
    }
}

/// Input payload for creating a special rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRuleDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rule_type: SpecialRuleType,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surge_multiplier: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_cities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_vehicle_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_distance_km: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance_km: Option<Decimal>,
    pub valid_from: NaiveDateTime,
    pub valid_to: NaiveDateTime,
    pub status: RuleStatus,
    pub priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses_per_user: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_max_uses: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

impl SpecialRuleDraft {
    /// Draft with no adjustments so call sites only set the fields they need.
    pub fn new(
        name: impl Into<String>,
        rule_type: SpecialRuleType,
        valid_from: NaiveDateTime,
        valid_to: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            rule_type,
            discount_percentage: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            surge_multiplier: None,
            applicable_cities: None,
            applicable_vehicle_types: None,
            min_distance_km: None,
            max_distance_km: None,
            valid_from,
            valid_to,
            status: RuleStatus::Active,
            priority: 0,
            max_uses_per_user: None,
            total_max_uses: None,
            promo_code: None,
        }
    }

    pub(crate) fn into_rule(self, id: SpecialRuleId) -> FareSpecialRule {
        FareSpecialRule {
            id,
            name: self.name,
            description: self.description,
            rule_type: self.rule_type,
            discount_percentage: self.discount_percentage,
            discount_amount: self.discount_amount,
            surge_multiplier: self.surge_multiplier,
            applicable_cities: self.applicable_cities,
            applicable_vehicle_types: self.applicable_vehicle_types,
            min_distance_km: self.min_distance_km,
            max_distance_km: self.max_distance_km,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            status: self.status,
            priority: self.priority,
            max_uses_per_user: self.max_uses_per_user,
            total_max_uses: self.total_max_uses,
            current_uses: 0,
            promo_code: self.promo_code,
        }
    }
}

/// Partial update for a catalog rule. An outer `None` leaves the field
/// unchanged; the nested options distinguish "no change" from "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_type: Option<CalculationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_cities: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_states: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fare: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_fare: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_km: Option<Option<Decimal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_minute: Option<Option<Decimal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_km: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_minutes: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_fee: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_fee_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fee: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fee_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surge_multiplier: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surge_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from_time: Option<Option<NaiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to_time: Option<Option<NaiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_days_of_week: Option<Option<Vec<Weekday>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RuleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl FareRuleUpdate {
    /// Merge this patch onto a rule. Identity, creation stamps, and `created_by`
    /// are never touched; `updated_at` is the caller's responsibility.
    pub(crate) fn apply_to(self, rule: &mut FarePricing) {
        if let Some(name) = self.name {
            rule.name = name;
        }
        if let Some(description) = self.description {
            rule.description = description;
        }
        if let Some(calculation_type) = self.calculation_type {
            rule.calculation_type = calculation_type;
        }
        if let Some(vehicle_type) = self.vehicle_type {
            rule.vehicle_type = vehicle_type;
        }
        if let Some(applicable_cities) = self.applicable_cities {
            rule.applicable_cities = applicable_cities;
        }
        if let Some(applicable_states) = self.applicable_states {
            rule.applicable_states = applicable_states;
        }
        if let Some(base_fare) = self.base_fare {
            rule.base_fare = base_fare;
        }
        if let Some(minimum_fare) = self.minimum_fare {
            rule.minimum_fare = minimum_fare;
        }
        if let Some(price_per_km) = self.price_per_km {
            rule.price_per_km = price_per_km;
        }
        if let Some(price_per_minute) = self.price_per_minute {
            rule.price_per_minute = price_per_minute;
        }
        if let Some(free_km) = self.free_km {
            rule.free_km = free_km;
        }
        if let Some(free_minutes) = self.free_minutes {
            rule.free_minutes = free_minutes;
        }
        if let Some(booking_fee) = self.booking_fee {
            rule.booking_fee = booking_fee;
        }
        if let Some(booking_fee_percentage) = self.booking_fee_percentage {
            rule.booking_fee_percentage = booking_fee_percentage;
        }
        if let Some(platform_fee) = self.platform_fee {
            rule.platform_fee = platform_fee;
        }
        if let Some(platform_fee_percentage) = self.platform_fee_percentage {
            rule.platform_fee_percentage = platform_fee_percentage;
        }
        if let Some(surge_multiplier) = self.surge_multiplier {
            rule.surge_multiplier = surge_multiplier;
        }
        if let Some(surge_enabled) = self.surge_enabled {
            rule.surge_enabled = surge_enabled;
        }
        if let Some(valid_from_date) = self.valid_from_date {
            rule.valid_from_date = valid_from_date;
        }
        if let Some(valid_to_date) = self.valid_to_date {
            rule.valid_to_date = valid_to_date;
        }
        if let Some(valid_from_time) = self.valid_from_time {
            rule.valid_from_time = valid_from_time;
        }
        if let Some(valid_to_time) = self.valid_to_time {
            rule.valid_to_time = valid_to_time;
        }
        if let Some(valid_days_of_week) = self.valid_days_of_week {
            rule.valid_days_of_week = valid_days_of_week;
        }
        if let Some(status) = self.status {
            rule.status = status;
        }
        if let Some(priority) = self.priority {
            rule.priority = priority;
        }
        if let Some(updated_by) = self.updated_by {
            rule.updated_by = Some(updated_by);
        }
    }
}

/// Trip inputs for an estimate or calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateFareParams {
    pub vehicle_type: String,
    pub distance_km: Decimal,
    pub duration_minutes: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Trip instant the validity windows are checked against; the service
    /// substitutes the current time when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

impl CalculateFareParams {
    pub fn new(
        vehicle_type: impl Into<String>,
        distance_km: Decimal,
        duration_minutes: Decimal,
    ) -> Self {
        Self {
            vehicle_type: vehicle_type.into(),
            distance_km,
            duration_minutes,
            city: None,
            state: None,
            requested_at: None,
            promo_code: None,
        }
    }
}

/// Itemized fare produced by the calculator; constructed fresh per request and
/// never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareCalculationResult {
    pub base_fare: Decimal,
    pub distance_fare: Decimal,
    pub time_fare: Decimal,
    pub surge_amount: Decimal,
    pub booking_fee: Decimal,
    pub platform_fee: Decimal,
    pub discount_amount: Decimal,
    pub total_fare: Decimal,
    pub currency: String,
    pub applied_rule: FarePricing,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied_special_rules: Vec<FareSpecialRule>,
    /// Ordered line items, one per non-zero component, ending with the total.
    pub breakdown: Vec<String>,
}
