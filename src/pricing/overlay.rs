use rust_decimal::Decimal;

use super::domain::{FareSpecialRule, RuleStatus};
use super::resolver::{allow_list_matches, TripContext};

/// Whether a special rule's window, scope, gating, and caps admit the trip.
pub(crate) fn is_overlay_applicable(
    rule: &FareSpecialRule,
    context: &TripContext,
    distance_km: Decimal,
    promo_code: Option<&str>,
) -> bool {
    if rule.status != RuleStatus::Active {
        return false;
    }

    if context.requested_at < rule.valid_from || context.requested_at > rule.valid_to {
        return false;
    }

    if !allow_list_matches(rule.applicable_cities.as_deref(), context.city.as_deref()) {
        return false;
    }
    if !allow_list_matches(
        rule.applicable_vehicle_types.as_deref(),
        Some(context.vehicle_type.as_str()),
    ) {
        return false;
    }

    if let Some(min) = rule.min_distance_km {
        if distance_km < min {
            return false;
        }
    }
    if let Some(max) = rule.max_distance_km {
        if distance_km > max {
            return false;
        }
    }

    if let Some(required) = &rule.promo_code {
        match promo_code {
            Some(code) if code.eq_ignore_ascii_case(required) => {}
            _ => return false,
        }
    }

    // An exhausted overlay never applies; redemption itself is guarded by the
    // store's bounded increment.
    if let Some(cap) = rule.total_max_uses {
        if rule.current_uses >= cap {
            return false;
        }
    }

    true
}

/// Applicable overlays ordered by descending priority, ascending id on ties.
/// The calculator applies at most one surge overlay and one discount overlay,
/// so this ordering is the stacking policy: highest priority wins, never
/// compounding.
pub(crate) fn applicable_overlays<'a>(
    rules: &'a [FareSpecialRule],
    context: &TripContext,
    distance_km: Decimal,
    promo_code: Option<&str>,
) -> Vec<&'a FareSpecialRule> {
    let mut overlays: Vec<&FareSpecialRule> = rules
        .iter()
        .filter(|rule| is_overlay_applicable(rule, context, distance_km, promo_code))
        .collect();

    overlays.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.0.cmp(&b.id.0)));
    overlays
}
