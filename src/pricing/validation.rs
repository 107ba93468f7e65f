use rust_decimal::Decimal;

use super::domain::{FarePricing, FareSpecialRule};

/// Structural checks for a catalog rule. Every check runs and contributes its
/// own message; callers reject when the returned list is non-empty.
pub fn validate_rule(rule: &FarePricing) -> Vec<String> {
    let mut violations = Vec::new();

    if rule.name.trim().is_empty() {
        violations.push("name must not be empty".to_string());
    }
    if rule.base_fare < Decimal::ZERO {
        violations.push("base fare must not be negative".to_string());
    }
    if rule.minimum_fare < Decimal::ZERO {
        violations.push("minimum fare must not be negative".to_string());
    }
    if let Some(price) = rule.price_per_km {
        if price < Decimal::ZERO {
            violations.push("price per km must not be negative".to_string());
        }
    }
    if let Some(price) = rule.price_per_minute {
        if price < Decimal::ZERO {
            violations.push("price per minute must not be negative".to_string());
        }
    }
    if rule.free_km < Decimal::ZERO {
        violations.push("free km allowance must not be negative".to_string());
    }
    if rule.free_minutes < Decimal::ZERO {
        violations.push("free minutes allowance must not be negative".to_string());
    }
    if rule.booking_fee < Decimal::ZERO {
        violations.push("booking fee must not be negative".to_string());
    }
    if rule.booking_fee_percentage < Decimal::ZERO {
        violations.push("booking fee percentage must not be negative".to_string());
    }
    if rule.platform_fee < Decimal::ZERO {
        violations.push("platform fee must not be negative".to_string());
    }
    if rule.platform_fee_percentage < Decimal::ZERO {
        violations.push("platform fee percentage must not be negative".to_string());
    }
    if rule.surge_multiplier <= Decimal::ZERO {
        violations.push("surge multiplier must be greater than zero".to_string());
    }
    if let (Some(from), Some(to)) = (rule.valid_from_date, rule.valid_to_date) {
        // An inverted time-of-day window is a legal overnight span; an
        // inverted date range is not.
        if from > to {
            violations.push("valid from date must not be after valid to date".to_string());
        }
    }

    violations
}

/// Structural checks for a special rule, same accumulation contract as
/// [`validate_rule`].
pub fn validate_special_rule(rule: &FareSpecialRule) -> Vec<String> {
    let mut violations = Vec::new();

    if rule.name.trim().is_empty() {
        violations.push("name must not be empty".to_string());
    }
    if rule.discount_percentage < Decimal::ZERO || rule.discount_percentage > Decimal::ONE_HUNDRED {
        violations.push("discount percentage must be between 0 and 100".to_string());
    }
    if rule.discount_amount < Decimal::ZERO {
        violations.push("discount amount must not be negative".to_string());
    }
    if let Some(multiplier) = rule.surge_multiplier {
        if multiplier <= Decimal::ZERO {
            violations.push("surge multiplier must be greater than zero".to_string());
        }
    }
    if rule.valid_from > rule.valid_to {
        violations.push("valid from must not be after valid to".to_string());
    }
    if let Some(min) = rule.min_distance_km {
        if min < Decimal::ZERO {
            violations.push("minimum distance must not be negative".to_string());
        }
    }
    if let (Some(min), Some(max)) = (rule.min_distance_km, rule.max_distance_km) {
        if min > max {
            violations.push("minimum distance must not exceed maximum distance".to_string());
        }
    }
    if rule.max_uses_per_user == Some(0) {
        violations.push("per-user usage cap must be greater than zero".to_string());
    }
    if rule.total_max_uses == Some(0) {
        violations.push("total usage cap must be greater than zero".to_string());
    }

    violations
}
