use chrono::{Datelike, NaiveDateTime, NaiveTime};

use super::domain::{FarePricing, RuleStatus};

/// Snapshot of the trip attributes a rule filters on.
#[derive(Debug, Clone)]
pub struct TripContext {
    pub vehicle_type: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub requested_at: NaiveDateTime,
}

/// Whether a catalog rule's scope and validity window admit the trip.
pub fn is_applicable(rule: &FarePricing, context: &TripContext) -> bool {
    if rule.status != RuleStatus::Active {
        return false;
    }

    if let Some(vehicle_type) = &rule.vehicle_type {
        if !vehicle_type.eq_ignore_ascii_case(&context.vehicle_type) {
            return false;
        }
    }

    if !allow_list_matches(rule.applicable_cities.as_deref(), context.city.as_deref()) {
        return false;
    }
    if !allow_list_matches(rule.applicable_states.as_deref(), context.state.as_deref()) {
        return false;
    }

    let date = context.requested_at.date();
    if let Some(from) = rule.valid_from_date {
        if date < from {
            return false;
        }
    }
    if let Some(to) = rule.valid_to_date {
        if date > to {
            return false;
        }
    }

    if let Some(days) = &rule.valid_days_of_week {
        if !days.is_empty() && !days.contains(&context.requested_at.weekday()) {
            return false;
        }
    }

    time_window_contains(rule, context.requested_at.time())
}

/// Pick the winning rule among applicable candidates: highest priority, then
/// the most recently created, then ascending id, so the result never depends
/// on catalog insertion order.
pub fn resolve<'a>(rules: &'a [FarePricing], context: &TripContext) -> Option<&'a FarePricing> {
    rules
        .iter()
        .filter(|rule| is_applicable(rule, context))
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| b.id.0.cmp(&a.id.0))
        })
}

/// An unset or empty allow-list is unrestricted. A populated list never
/// matches a trip that did not supply the value; geography-scoped rules must
/// fail visibly rather than match blind contexts.
pub(crate) fn allow_list_matches(list: Option<&[String]>, value: Option<&str>) -> bool {
    let entries = match list {
        Some(entries) if !entries.is_empty() => entries,
        _ => return true,
    };

    match value {
        Some(value) => entries.iter().any(|entry| entry.eq_ignore_ascii_case(value)),
        None => false,
    }
}

fn time_window_contains(rule: &FarePricing, time: NaiveTime) -> bool {
    match (rule.valid_from_time, rule.valid_to_time) {
        (None, None) => true,
        (Some(from), None) => time >= from,
        (None, Some(to)) => time <= to,
        (Some(from), Some(to)) if from <= to => time >= from && time <= to,
        // Inverted bounds are an overnight window, e.g. 22:00 through 06:00.
        (Some(from), Some(to)) => time >= from || time <= to,
    }
}
