//! Catalog-level aggregates for the administrative dashboard.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{CalculationType, FarePricing, FareSpecialRule, RuleStatus, SpecialRuleType};

/// Snapshot of catalog composition and fare averages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareStatistics {
    pub total_rules: usize,
    pub total_special_rules: usize,
    pub by_status: Vec<StatusBreakdownEntry>,
    pub by_calculation_type: Vec<CalculationTypeBreakdownEntry>,
    pub by_vehicle_type: Vec<VehicleTypeBreakdownEntry>,
    pub by_special_rule_type: Vec<SpecialRuleTypeBreakdownEntry>,
    pub average_base_fare: Decimal,
    pub average_minimum_fare: Decimal,
}

/// Rule count for one lifecycle state. Every state is reported, including
/// zero counts, so dashboards render a stable set of buckets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdownEntry {
    pub status: RuleStatus,
    pub status_label: &'static str,
    pub count: usize,
}

/// Rule count per declared formula shape. Like the status breakdown, every
/// shape is reported.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationTypeBreakdownEntry {
    pub calculation_type: CalculationType,
    pub calculation_type_label: &'static str,
    pub count: usize,
}

/// Rule count per vehicle type. Rules without a vehicle type are grouped
/// under "all".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTypeBreakdownEntry {
    pub vehicle_type: String,
    pub count: usize,
}

/// Special-rule count per category, every category reported.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRuleTypeBreakdownEntry {
    pub rule_type: SpecialRuleType,
    pub rule_type_label: &'static str,
    pub count: usize,
}

pub(crate) fn compile(
    rules: &[FarePricing],
    special_rules: &[FareSpecialRule],
) -> FareStatistics {
    let by_status = RuleStatus::ordered()
        .into_iter()
        .map(|status| StatusBreakdownEntry {
            status,
            status_label: status.label(),
            count: rules.iter().filter(|rule| rule.status == status).count(),
        })
        .collect();

    let by_calculation_type = CalculationType::ordered()
        .into_iter()
        .map(|calculation_type| CalculationTypeBreakdownEntry {
            calculation_type,
            calculation_type_label: calculation_type.label(),
            count: rules
                .iter()
                .filter(|rule| rule.calculation_type == calculation_type)
                .count(),
        })
        .collect();

    let by_special_rule_type = SpecialRuleType::ordered()
        .into_iter()
        .map(|rule_type| SpecialRuleTypeBreakdownEntry {
            rule_type,
            rule_type_label: rule_type.label(),
            count: special_rules
                .iter()
                .filter(|rule| rule.rule_type == rule_type)
                .count(),
        })
        .collect();

    let mut vehicle_counts: BTreeMap<String, usize> = BTreeMap::new();
    for rule in rules {
        let key = rule
            .vehicle_type
            .as_deref()
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_else(|| "all".to_string());
        *vehicle_counts.entry(key).or_default() += 1;
    }
    let by_vehicle_type = vehicle_counts
        .into_iter()
        .map(|(vehicle_type, count)| VehicleTypeBreakdownEntry {
            vehicle_type,
            count,
        })
        .collect();

    FareStatistics {
        total_rules: rules.len(),
        total_special_rules: special_rules.len(),
        by_status,
        by_calculation_type,
        by_vehicle_type,
        by_special_rule_type,
        average_base_fare: average(rules, |rule| rule.base_fare),
        average_minimum_fare: average(rules, |rule| rule.minimum_fare),
    }
}

fn average(rules: &[FarePricing], amount: impl Fn(&FarePricing) -> Decimal) -> Decimal {
    if rules.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = rules.iter().map(amount).sum();
    sum / Decimal::from(rules.len() as u64)
}
