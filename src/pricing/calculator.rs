use rust_decimal::Decimal;

use crate::config::EngineConfig;

use super::domain::{CalculateFareParams, FareCalculationResult, FarePricing, FareSpecialRule};

/// Error raised when fare computation cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum CalculationError {
    #[error("no fare rule provided for calculation")]
    NoRuleProvided,
}

/// Stateless calculator applying one resolved rule, plus any overlays, to trip
/// metrics. Arithmetic keeps full decimal precision; the configured display
/// scale only affects breakdown rendering.
pub struct FareCalculator {
    currency: String,
    display_scale: u32,
}

impl FareCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            currency: config.pricing.currency.clone(),
            display_scale: config.pricing.display_scale,
        }
    }

    /// Base calculation without special-rule adjustments.
    pub fn calculate(
        &self,
        params: &CalculateFareParams,
        rule: Option<&FarePricing>,
    ) -> Result<FareCalculationResult, CalculationError> {
        self.calculate_with_overlays(params, rule, &[])
    }

    /// Overlays must arrive ordered by descending priority. The first overlay
    /// carrying a surge multiplier above one and the first carrying a discount
    /// are the ones applied; the rest are ignored rather than compounded.
    pub fn calculate_with_overlays(
        &self,
        params: &CalculateFareParams,
        rule: Option<&FarePricing>,
        overlays: &[FareSpecialRule],
    ) -> Result<FareCalculationResult, CalculationError> {
        let rule = rule.ok_or(CalculationError::NoRuleProvided)?;

        let mut breakdown = Vec::new();
        let mut applied = Vec::new();

        let base_fare = rule.base_fare;
        if base_fare > Decimal::ZERO {
            breakdown.push(format!("Base fare: {}", self.scaled(base_fare)));
        }

        let distance_fare = self.distance_fare(rule, params, &mut breakdown);
        let time_fare = self.time_fare(rule, params, &mut breakdown);

        let mut subtotal = base_fare + distance_fare + time_fare;
        let mut surge_amount = Decimal::ZERO;

        if rule.surge_enabled && rule.surge_multiplier > Decimal::ONE {
            let amount = subtotal * (rule.surge_multiplier - Decimal::ONE);
            breakdown.push(format!(
                "Surge x{}: +{}",
                rule.surge_multiplier,
                self.scaled(amount)
            ));
            surge_amount += amount;
            subtotal += amount;
        }

        let surge_overlay = overlays.iter().find_map(|overlay| {
            overlay
                .surge_multiplier
                .filter(|multiplier| *multiplier > Decimal::ONE)
                .map(|multiplier| (overlay, multiplier))
        });
        if let Some((overlay, multiplier)) = surge_overlay {
            let amount = subtotal * (multiplier - Decimal::ONE);
            breakdown.push(format!(
                "{} x{}: +{}",
                overlay.name,
                multiplier,
                self.scaled(amount)
            ));
            surge_amount += amount;
            subtotal += amount;
            applied.push(overlay.clone());
        }

        let booking_fee =
            rule.booking_fee + subtotal * rule.booking_fee_percentage / Decimal::ONE_HUNDRED;
        if booking_fee > Decimal::ZERO {
            breakdown.push(format!("Booking fee: {}", self.scaled(booking_fee)));
        }

        let platform_fee =
            rule.platform_fee + subtotal * rule.platform_fee_percentage / Decimal::ONE_HUNDRED;
        if platform_fee > Decimal::ZERO {
            breakdown.push(format!("Platform fee: {}", self.scaled(platform_fee)));
        }

        let mut total_fare = subtotal + booking_fee + platform_fee;

        let mut discount_amount = Decimal::ZERO;
        let discount_overlay = overlays.iter().find(|overlay| {
            overlay.discount_amount > Decimal::ZERO || overlay.discount_percentage > Decimal::ZERO
        });
        if let Some(overlay) = discount_overlay {
            // Percentage discounts apply to the pre-fee subtotal; fees are
            // never discounted. Clamped so the total cannot go negative.
            let mut discount = overlay.discount_amount
                + subtotal * overlay.discount_percentage / Decimal::ONE_HUNDRED;
            if discount > total_fare {
                discount = total_fare;
            }
            if discount > Decimal::ZERO {
                breakdown.push(format!("{}: -{}", overlay.name, self.scaled(discount)));
                discount_amount = discount;
                total_fare -= discount;
                if !applied.iter().any(|existing| existing.id == overlay.id) {
                    applied.push(overlay.clone());
                }
            }
        }

        if total_fare < rule.minimum_fare {
            let adjustment = rule.minimum_fare - total_fare;
            breakdown.push(format!(
                "Minimum fare adjustment: +{}",
                self.scaled(adjustment)
            ));
            total_fare = rule.minimum_fare;
        }

        breakdown.push(format!("Total: {}", self.scaled(total_fare)));

        Ok(FareCalculationResult {
            base_fare,
            distance_fare,
            time_fare,
            surge_amount,
            booking_fee,
            platform_fee,
            discount_amount,
            total_fare,
            currency: self.currency.clone(),
            applied_rule: rule.clone(),
            applied_special_rules: applied,
            breakdown,
        })
    }

    fn distance_fare(
        &self,
        rule: &FarePricing,
        params: &CalculateFareParams,
        breakdown: &mut Vec<String>,
    ) -> Decimal {
        let price = match rule.price_per_km {
            Some(price) if params.distance_km > Decimal::ZERO => price,
            _ => return Decimal::ZERO,
        };

        let billable = (params.distance_km - rule.free_km).max(Decimal::ZERO);
        let fare = billable * price;
        if fare > Decimal::ZERO {
            breakdown.push(format!(
                "Distance fare ({} km x {}): {}",
                self.scaled(billable),
                self.scaled(price),
                self.scaled(fare)
            ));
        }
        fare
    }

    fn time_fare(
        &self,
        rule: &FarePricing,
        params: &CalculateFareParams,
        breakdown: &mut Vec<String>,
    ) -> Decimal {
        let price = match rule.price_per_minute {
            Some(price) if params.duration_minutes > Decimal::ZERO => price,
            _ => return Decimal::ZERO,
        };

        let billable = (params.duration_minutes - rule.free_minutes).max(Decimal::ZERO);
        let fare = billable * price;
        if fare > Decimal::ZERO {
            breakdown.push(format!(
                "Time fare ({} min x {}): {}",
                self.scaled(billable),
                self.scaled(price),
                self.scaled(fare)
            ));
        }
        fare
    }

    fn scaled(&self, value: Decimal) -> String {
        format!("{:.*}", self.display_scale as usize, value)
    }
}
