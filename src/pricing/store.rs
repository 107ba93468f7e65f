use std::sync::{Mutex, MutexGuard};

use super::domain::{FarePricing, FareRuleId, FareSpecialRule, SpecialRuleId};

/// Storage abstraction so the pricing service can be exercised in isolation
/// and deployments can substitute their own persistence.
pub trait FareRuleStore: Send + Sync {
    fn insert_rule(&self, rule: FarePricing) -> Result<FarePricing, StoreError>;
    fn rule(&self, id: &FareRuleId) -> Result<Option<FarePricing>, StoreError>;
    /// All catalog rules in insertion order.
    fn rules(&self) -> Result<Vec<FarePricing>, StoreError>;
    fn replace_rule(&self, rule: FarePricing) -> Result<(), StoreError>;
    /// Returns whether a record was removed.
    fn delete_rule(&self, id: &FareRuleId) -> Result<bool, StoreError>;

    fn insert_special_rule(&self, rule: FareSpecialRule) -> Result<FareSpecialRule, StoreError>;
    fn special_rule(&self, id: &SpecialRuleId) -> Result<Option<FareSpecialRule>, StoreError>;
    fn special_rules(&self) -> Result<Vec<FareSpecialRule>, StoreError>;
    fn delete_special_rule(&self, id: &SpecialRuleId) -> Result<bool, StoreError>;

    /// Bounded usage increment: fails with [`StoreError::UsageCapReached`]
    /// once `current_uses` hits `total_max_uses`, otherwise bumps the counter
    /// and returns the new count. The check and increment must be atomic so
    /// concurrent redemptions cannot overshoot the cap.
    fn record_special_rule_use(&self, id: &SpecialRuleId) -> Result<u32, StoreError>;
}

/// Error enumeration for rule storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("rule already exists")]
    Conflict,
    #[error("rule not found")]
    NotFound,
    #[error("usage cap reached")]
    UsageCapReached,
    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct CatalogState {
    rules: Vec<FarePricing>,
    special_rules: Vec<FareSpecialRule>,
}

/// Insertion-ordered in-memory store, the default backing for tests and
/// single-node deployments.
#[derive(Debug, Default)]
pub struct InMemoryFareRuleStore {
    state: Mutex<CatalogState>,
}

impl InMemoryFareRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("rule store mutex poisoned".to_string()))
    }
}

impl FareRuleStore for InMemoryFareRuleStore {
    fn insert_rule(&self, rule: FarePricing) -> Result<FarePricing, StoreError> {
        let mut state = self.lock()?;
        if state.rules.iter().any(|existing| existing.id == rule.id) {
            return Err(StoreError::Conflict);
        }
        state.rules.push(rule.clone());
        Ok(rule)
    }

    fn rule(&self, id: &FareRuleId) -> Result<Option<FarePricing>, StoreError> {
        let state = self.lock()?;
        Ok(state.rules.iter().find(|rule| &rule.id == id).cloned())
    }

    fn rules(&self) -> Result<Vec<FarePricing>, StoreError> {
        let state = self.lock()?;
        Ok(state.rules.clone())
    }

    fn replace_rule(&self, rule: FarePricing) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        match state.rules.iter_mut().find(|existing| existing.id == rule.id) {
            Some(slot) => {
                *slot = rule;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_rule(&self, id: &FareRuleId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let before = state.rules.len();
        state.rules.retain(|rule| &rule.id != id);
        Ok(state.rules.len() < before)
    }

    fn insert_special_rule(&self, rule: FareSpecialRule) -> Result<FareSpecialRule, StoreError> {
        let mut state = self.lock()?;
        if state
            .special_rules
            .iter()
            .any(|existing| existing.id == rule.id)
        {
            return Err(StoreError::Conflict);
        }
        state.special_rules.push(rule.clone());
        Ok(rule)
    }

    fn special_rule(&self, id: &SpecialRuleId) -> Result<Option<FareSpecialRule>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .special_rules
            .iter()
            .find(|rule| &rule.id == id)
            .cloned())
    }

    fn special_rules(&self) -> Result<Vec<FareSpecialRule>, StoreError> {
        let state = self.lock()?;
        Ok(state.special_rules.clone())
    }

    fn delete_special_rule(&self, id: &SpecialRuleId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let before = state.special_rules.len();
        state.special_rules.retain(|rule| &rule.id != id);
        Ok(state.special_rules.len() < before)
    }

    fn record_special_rule_use(&self, id: &SpecialRuleId) -> Result<u32, StoreError> {
        let mut state = self.lock()?;
        let rule = state
            .special_rules
            .iter_mut()
            .find(|rule| &rule.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(cap) = rule.total_max_uses {
            if rule.current_uses >= cap {
                return Err(StoreError::UsageCapReached);
            }
        }

        rule.current_uses += 1;
        Ok(rule.current_uses)
    }
}
