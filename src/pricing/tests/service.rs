use std::sync::Arc;

use rust_decimal::Decimal;

use super::common::*;
use crate::config::EngineConfig;
use crate::pricing::calculator::CalculationError;
use crate::pricing::domain::{
    FareRuleId, FareRuleUpdate, RuleStatus, SpecialRuleDraft, SpecialRuleId, SpecialRuleType,
};
use crate::pricing::service::{BulkRuleUpdate, FareServiceError, RuleFilters};
use crate::pricing::store::{FareRuleStore, StoreError};
use crate::pricing::FarePricingService;

fn festival_draft(promo_code: Option<&str>) -> SpecialRuleDraft {
    let mut draft = SpecialRuleDraft::new(
        "Festival Special",
        SpecialRuleType::Promotional,
        dt(2020, 1, 1, 0, 0),
        dt(2030, 12, 31, 23, 59),
    );
    draft.discount_amount = Decimal::from(20);
    draft.promo_code = promo_code.map(str::to_string);
    draft
}

#[test]
fn create_rule_assigns_identity_and_stamps() {
    let (service, _) = build_service();

    let created = service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");

    assert!(!created.id.0.is_empty());
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(created.status, RuleStatus::Active);

    let fetched = service.get_rule(&created.id).expect("rule fetches");
    assert_eq!(fetched, created);
}

#[test]
fn create_rule_rejects_an_invalid_draft() {
    let (service, store) = build_service();

    let mut draft = sedan_draft("Broken");
    draft.base_fare = Decimal::from(-10);

    match service.create_rule(draft) {
        Err(FareServiceError::ValidationFailed { violations }) => {
            assert!(violations.contains(&"base fare must not be negative".to_string()));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(store.rules().expect("store lists").is_empty());
}

#[test]
fn update_rule_merges_only_the_provided_fields() {
    let (service, _) = build_service();

    let mut draft = sedan_draft("City Sedan");
    draft.description = Some("Standard city tariff".to_string());
    let created = service.create_rule(draft).expect("rule creates");

    let patch = FareRuleUpdate {
        base_fare: Some(Decimal::from(60)),
        description: Some(None),
        updated_by: Some("ops".to_string()),
        ..FareRuleUpdate::default()
    };
    let updated = service.update_rule(&created.id, patch).expect("rule updates");

    assert_eq!(updated.base_fare, Decimal::from(60));
    assert_eq!(updated.description, None);
    assert_eq!(updated.updated_by, Some("ops".to_string()));
    assert_eq!(updated.name, "City Sedan");
    assert_eq!(updated.minimum_fare, Decimal::from(80));
    assert!(updated.updated_at >= updated.created_at);
}

#[test]
fn failed_update_leaves_the_stored_rule_untouched() {
    let (service, _) = build_service();
    let created = service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");

    let patch = FareRuleUpdate {
        base_fare: Some(Decimal::from(-5)),
        ..FareRuleUpdate::default()
    };
    match service.update_rule(&created.id, patch) {
        Err(FareServiceError::ValidationFailed { .. }) => {}
        other => panic!("expected validation failure, got {other:?}"),
    }

    let stored = service.get_rule(&created.id).expect("rule fetches");
    assert_eq!(stored.base_fare, Decimal::from(50));
}

#[test]
fn delete_rule_removes_the_record() {
    let (service, _) = build_service();
    let created = service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");

    service.delete_rule(&created.id).expect("rule deletes");

    match service.get_rule(&created.id) {
        Err(FareServiceError::RuleNotFound(id)) => assert_eq!(id, created.id),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn delete_unknown_rule_reports_not_found() {
    let (service, _) = build_service();

    match service.delete_rule(&FareRuleId("missing".to_string())) {
        Err(FareServiceError::RuleNotFound(_)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn duplicate_rule_is_parked_inactive() {
    let (service, _) = build_service();

    let mut draft = sedan_draft("City Sedan");
    draft.created_by = Some("ops".to_string());
    let source = service.create_rule(draft).expect("rule creates");

    let copy = service
        .duplicate_rule(&source.id, None)
        .expect("rule duplicates");

    assert_ne!(copy.id, source.id);
    assert_eq!(copy.name, "City Sedan (Copy)");
    assert_eq!(copy.status, RuleStatus::Inactive);
    assert_eq!(copy.priority, 0);
    assert_eq!(copy.created_by, None);
    assert_eq!(copy.base_fare, source.base_fare);

    let named = service
        .duplicate_rule(&source.id, Some("Night Sedan".to_string()))
        .expect("rule duplicates");
    assert_eq!(named.name, "Night Sedan");
}

#[test]
fn toggle_flips_between_active_and_inactive() {
    let (service, _) = build_service();
    let created = service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");

    let toggled = service
        .toggle_rule_status(&created.id)
        .expect("status toggles");
    assert_eq!(toggled.status, RuleStatus::Inactive);

    let toggled = service
        .toggle_rule_status(&created.id)
        .expect("status toggles");
    assert_eq!(toggled.status, RuleStatus::Active);
}

#[test]
fn toggle_refuses_scheduled_rules() {
    let (service, _) = build_service();

    let mut draft = sedan_draft("Diwali Sedan");
    draft.status = RuleStatus::Scheduled;
    let created = service.create_rule(draft).expect("rule creates");

    match service.toggle_rule_status(&created.id) {
        Err(FareServiceError::ValidationFailed { violations }) => {
            assert_eq!(violations, vec!["scheduled rules cannot be toggled".to_string()]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    let stored = service.get_rule(&created.id).expect("rule fetches");
    assert_eq!(stored.status, RuleStatus::Scheduled);
}

#[test]
fn list_rules_applies_literal_filters() {
    let (service, _) = build_service();

    service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");

    let mut suv = sedan_draft("City SUV");
    suv.vehicle_type = Some("suv".to_string());
    service.create_rule(suv).expect("rule creates");

    let mut indore = sedan_draft("Indore Sedan");
    indore.applicable_cities = Some(vec!["Indore".to_string()]);
    indore.status = RuleStatus::Inactive;
    service.create_rule(indore).expect("rule creates");

    let active = service
        .list_rules(&RuleFilters {
            status: Some(RuleStatus::Active),
            ..RuleFilters::default()
        })
        .expect("rules list");
    assert_eq!(active.len(), 2);

    let suvs = service
        .list_rules(&RuleFilters {
            vehicle_type: Some("SUV".to_string()),
            ..RuleFilters::default()
        })
        .expect("rules list");
    assert_eq!(suvs.len(), 1);
    assert_eq!(suvs[0].name, "City SUV");

    // The city filter is a literal match on the allow-list; rules open to
    // every city are not listed under a specific one.
    let indore_rules = service
        .list_rules(&RuleFilters {
            city: Some("indore".to_string()),
            ..RuleFilters::default()
        })
        .expect("rules list");
    assert_eq!(indore_rules.len(), 1);
    assert_eq!(indore_rules[0].name, "Indore Sedan");
}

#[test]
fn resolve_rule_picks_the_highest_priority_match() {
    let (service, _) = build_service();

    service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");

    let mut premium = sedan_draft("Premium Sedan");
    premium.priority = 50;
    let premium = service.create_rule(premium).expect("rule creates");

    let mut params = trip(10, 0);
    params.requested_at = Some(dt(2025, 6, 16, 12, 0));

    let resolved = service.resolve_rule(&params).expect("a rule resolves");
    assert_eq!(resolved.id, premium.id);
}

#[test]
fn calculate_without_a_rule_is_an_error() {
    let (service, _) = build_service();

    match service.calculate(&trip(10, 0), None) {
        Err(FareServiceError::Calculation(CalculationError::NoRuleProvided)) => {}
        other => panic!("expected NoRuleProvided, got {other:?}"),
    }
}

#[test]
fn estimate_applies_a_promo_gated_discount() {
    let (service, _) = build_service();

    service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");
    service
        .create_special_rule(festival_draft(Some("FEST20")))
        .expect("special rule creates");

    let mut params = trip(10, 0);
    params.requested_at = Some(dt(2025, 6, 16, 12, 0));

    let without_code = service
        .calculate_fare_estimate(&params)
        .expect("estimate calculates");
    assert_eq!(without_code.total_fare, Decimal::from(140));
    assert!(without_code.applied_special_rules.is_empty());

    params.promo_code = Some("fest20".to_string());
    let with_code = service
        .calculate_fare_estimate(&params)
        .expect("estimate calculates");
    assert_eq!(with_code.total_fare, Decimal::from(120));
    assert_eq!(with_code.applied_special_rules.len(), 1);
    assert_eq!(with_code.applied_special_rules[0].name, "Festival Special");
}

#[test]
fn estimate_without_a_matching_rule_is_an_error() {
    let (service, _) = build_service();
    service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");

    let mut params = trip(10, 0);
    params.vehicle_type = "rickshaw".to_string();

    match service.calculate_fare_estimate(&params) {
        Err(FareServiceError::NoApplicableRule) => {}
        other => panic!("expected NoApplicableRule, got {other:?}"),
    }
}

#[test]
fn special_rule_crud_round_trip() {
    let (service, _) = build_service();

    let created = service
        .create_special_rule(festival_draft(None))
        .expect("special rule creates");
    assert_eq!(created.current_uses, 0);

    let fetched = service
        .get_special_rule(&created.id)
        .expect("special rule fetches");
    assert_eq!(fetched, created);
    assert_eq!(service.list_special_rules().expect("list").len(), 1);

    service
        .delete_special_rule(&created.id)
        .expect("special rule deletes");
    match service.get_special_rule(&created.id) {
        Err(FareServiceError::SpecialRuleNotFound(_)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn create_special_rule_rejects_an_invalid_draft() {
    let (service, _) = build_service();

    let mut draft = festival_draft(None);
    draft.discount_percentage = Decimal::from(150);

    match service.create_special_rule(draft) {
        Err(FareServiceError::ValidationFailed { violations }) => {
            assert!(violations
                .contains(&"discount percentage must be between 0 and 100".to_string()));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn redeem_enforces_the_total_usage_cap() {
    let (service, _) = build_service();

    let mut draft = festival_draft(None);
    draft.total_max_uses = Some(2);
    let created = service
        .create_special_rule(draft)
        .expect("special rule creates");

    assert_eq!(service.redeem_special_rule(&created.id).expect("redeems"), 1);
    assert_eq!(service.redeem_special_rule(&created.id).expect("redeems"), 2);

    match service.redeem_special_rule(&created.id) {
        Err(FareServiceError::Store(StoreError::UsageCapReached)) => {}
        other => panic!("expected usage cap error, got {other:?}"),
    }

    let stored = service
        .get_special_rule(&created.id)
        .expect("special rule fetches");
    assert_eq!(stored.current_uses, 2);
}

#[test]
fn redeem_unknown_special_rule_reports_not_found() {
    let (service, _) = build_service();

    match service.redeem_special_rule(&SpecialRuleId("missing".to_string())) {
        Err(FareServiceError::SpecialRuleNotFound(_)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn bulk_update_continues_after_failures() {
    let (service, _) = build_service();

    let first = service
        .create_rule(sedan_draft("City Sedan"))
        .expect("rule creates");
    let second = service
        .create_rule(sedan_draft("Airport Sedan"))
        .expect("rule creates");

    let updates = vec![
        BulkRuleUpdate {
            id: first.id.clone(),
            patch: FareRuleUpdate {
                priority: Some(20),
                ..FareRuleUpdate::default()
            },
        },
        BulkRuleUpdate {
            id: FareRuleId("missing".to_string()),
            patch: FareRuleUpdate::default(),
        },
        BulkRuleUpdate {
            id: second.id.clone(),
            patch: FareRuleUpdate {
                base_fare: Some(Decimal::from(-1)),
                ..FareRuleUpdate::default()
            },
        },
    ];

    let report = service.bulk_update(updates);
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().any(|error| error.contains("missing")));
    assert!(report
        .errors
        .iter()
        .any(|error| error.contains(&second.id.0)));

    let first = service.get_rule(&first.id).expect("rule fetches");
    assert_eq!(first.priority, 20);
    let second = service.get_rule(&second.id).expect("rule fetches");
    assert_eq!(second.base_fare, Decimal::from(50));
}

#[test]
fn store_outage_surfaces_as_unavailable() {
    let service = FarePricingService::new(Arc::new(UnavailableStore), EngineConfig::default());

    match service.list_rules(&RuleFilters::default()) {
        Err(FareServiceError::Store(StoreError::Unavailable(reason))) => {
            assert_eq!(reason, "catalog offline");
        }
        other => panic!("expected unavailable store, got {other:?}"),
    }
}
