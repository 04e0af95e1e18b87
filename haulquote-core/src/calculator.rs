//! The shared monthly cost pipeline.
//!
//! Every pricing mode ends here. The steps run in a fixed order because each
//! one feeds the next:
//!
//! 1. `volume = bins x pickups/week x yards x 4.33`
//! 2. `base = volume x price per yard` (or a flat base for broker rates)
//! 3. `fuel = base x fuel%`
//! 4. `franchise = (base + add-ons) x franchise%`
//! 5. `subtotal = base + franchise + fuel + add-ons`
//! 6. `tax = subtotal x tax%`
//! 7. `total = subtotal + tax`
//!
//! Delivery fees and extra pickup rates are one-time charges and never enter
//! this pipeline.

use serde::{Deserialize, Serialize};

use crate::frequency::monthly_volume;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
/// How a fee is charged.
pub enum Charge {
    /// Percentage of its basis, given as `15` for 15%.
    Percent(f64),
    /// Precomputed dollar amount; reported with a 0% rate.
    Amount(f64),
}

impl Charge {
    fn amount_on(self, basis: f64) -> f64 {
        match self {
            Self::Percent(rate) => basis * rate / 100.0,
            Self::Amount(amount) => amount,
        }
    }

    /// Effective percentage reported on the quote.
    #[must_use]
    pub fn rate(self) -> f64 {
        match self {
            Self::Percent(rate) => rate,
            Self::Amount(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Source of the pre-fee monthly cost.
pub enum BaseRate {
    /// Multiply the monthly volume by this price per yard.
    PerYard(f64),
    /// Use this monthly amount as is.
    Flat(f64),
}

#[derive(Debug, Clone, Copy)]
/// Everything the pipeline needs for one request.
pub struct CostInputs {
    /// Number of containers.
    pub bin_quantity: u32,
    /// Pickups per week.
    pub weekly_multiplier: f64,
    /// Yards per container.
    pub yards: u32,
    /// How the base cost is derived.
    pub base: BaseRate,
    /// Fuel surcharge.
    pub fuel_surcharge: Charge,
    /// Franchise fee.
    pub franchise_fee: Charge,
    /// Sales tax.
    pub local_tax: Charge,
    /// Monthly add-on cost.
    pub add_ons_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Result of the seven-step pipeline.
pub struct MonthlyBreakdown {
    /// Yards collected per month.
    pub total_monthly_volume: f64,
    /// Price per yard used for the base (derived for flat bases).
    pub price_per_yard: f64,
    /// Monthly cost before fees and tax.
    pub base_rate: f64,
    /// Fuel surcharge percentage.
    pub fuel_surcharge_rate: f64,
    /// Fuel surcharge in dollars.
    pub fuel_surcharge_amount: f64,
    /// Franchise fee percentage.
    pub franchise_fee_rate: f64,
    /// Franchise fee in dollars.
    pub franchise_fee_amount: f64,
    /// Monthly add-on cost.
    pub add_ons_cost: f64,
    /// Base plus fees and add-ons.
    pub subtotal: f64,
    /// Sales tax percentage.
    pub local_tax_rate: f64,
    /// Sales tax in dollars.
    pub local_tax_amount: f64,
    /// Subtotal plus tax.
    pub total_monthly_cost: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// The pipeline produced a value that is not a finite number.
#[error("Cost calculation produced a non-finite {0}")]
pub struct CalculationError(pub &'static str);

/// Run the seven steps in order.
///
/// # Errors
///
/// Returns a [`CalculationError`] if any intermediate value is NaN or infinite.
pub fn calculate(inputs: &CostInputs) -> Result<MonthlyBreakdown, CalculationError> {
    let total_monthly_volume =
        monthly_volume(inputs.bin_quantity, inputs.weekly_multiplier, inputs.yards);
    finite("monthly volume", total_monthly_volume)?;

    let (base_rate, price_per_yard) = match inputs.base {
        BaseRate::PerYard(price) => (total_monthly_volume * price, price),
        BaseRate::Flat(amount) => {
            let derived = if total_monthly_volume > 0.0 {
                amount / total_monthly_volume
            } else {
                0.0
            };
            (amount, derived)
        }
    };
    finite("base rate", base_rate)?;

    let fuel_surcharge_amount = inputs.fuel_surcharge.amount_on(base_rate);
    let franchise_fee_amount = inputs
        .franchise_fee
        .amount_on(base_rate + inputs.add_ons_cost);
    let subtotal = base_rate + franchise_fee_amount + fuel_surcharge_amount + inputs.add_ons_cost;
    finite("subtotal", subtotal)?;

    let local_tax_amount = inputs.local_tax.amount_on(subtotal);
    let total_monthly_cost = subtotal + local_tax_amount;
    finite("monthly total", total_monthly_cost)?;

    Ok(MonthlyBreakdown {
        total_monthly_volume,
        price_per_yard,
        base_rate,
        fuel_surcharge_rate: inputs.fuel_surcharge.rate(),
        fuel_surcharge_amount,
        franchise_fee_rate: inputs.franchise_fee.rate(),
        franchise_fee_amount,
        add_ons_cost: inputs.add_ons_cost,
        subtotal,
        local_tax_rate: inputs.local_tax.rate(),
        local_tax_amount,
        total_monthly_cost,
    })
}

fn finite(what: &'static str, value: f64) -> Result<(), CalculationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalculationError(what))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn regional_inputs() -> CostInputs {
        CostInputs {
            bin_quantity: 1,
            weekly_multiplier: 1.0,
            yards: 8,
            base: BaseRate::PerYard(110.85 / (8.0 * 4.33)),
            fuel_surcharge: Charge::Percent(15.0),
            franchise_fee: Charge::Percent(0.0),
            local_tax: Charge::Percent(8.25),
            add_ons_cost: 0.0,
        }
    }

    #[test]
    fn regional_weekly_eight_yard_breakdown() {
        let breakdown = calculate(&regional_inputs()).expect("finite inputs");
        assert!((breakdown.total_monthly_volume - 34.64).abs() < TOLERANCE);
        assert!((breakdown.base_rate - 110.85).abs() < TOLERANCE);
        assert!((breakdown.fuel_surcharge_amount - 16.6275).abs() < TOLERANCE);
        assert!((breakdown.subtotal - 127.4775).abs() < TOLERANCE);
        assert!((breakdown.local_tax_amount - 10.516_893_75).abs() < TOLERANCE);
        assert!((breakdown.total_monthly_cost - 137.994_393_75).abs() < TOLERANCE);
    }

    #[test]
    fn franchise_fee_applies_to_base_plus_add_ons() {
        let inputs = CostInputs {
            franchise_fee: Charge::Percent(10.0),
            fuel_surcharge: Charge::Percent(0.0),
            add_ons_cost: 50.0,
            base: BaseRate::Flat(100.0),
            ..regional_inputs()
        };
        let breakdown = calculate(&inputs).expect("finite inputs");
        assert!((breakdown.franchise_fee_amount - 15.0).abs() < TOLERANCE);
        assert!((breakdown.subtotal - 165.0).abs() < TOLERANCE);
    }

    #[test]
    fn precomputed_amounts_report_zero_rate() {
        let inputs = CostInputs {
            local_tax: Charge::Amount(12.0),
            ..regional_inputs()
        };
        let breakdown = calculate(&inputs).expect("finite inputs");
        assert!(breakdown.local_tax_rate.abs() < TOLERANCE);
        assert!((breakdown.local_tax_amount - 12.0).abs() < TOLERANCE);
    }

    #[test]
    fn infinite_price_is_rejected() {
        let inputs = CostInputs {
            base: BaseRate::PerYard(f64::INFINITY),
            ..regional_inputs()
        };
        assert_eq!(calculate(&inputs), Err(CalculationError("base rate")));
    }

    proptest! {
        #[test]
        fn totals_are_sum_of_parts(
            bins in 1_u32..20,
            multiplier in 0.0_f64..7.0,
            yards in 2_u32..40,
            price in 0.0_f64..50.0,
            fuel in 0.0_f64..30.0,
            franchise in 0.0_f64..15.0,
            tax in 0.0_f64..10.0,
            add_ons in 0.0_f64..500.0,
        ) {
            let breakdown = calculate(&CostInputs {
                bin_quantity: bins,
                weekly_multiplier: multiplier,
                yards,
                base: BaseRate::PerYard(price),
                fuel_surcharge: Charge::Percent(fuel),
                franchise_fee: Charge::Percent(franchise),
                local_tax: Charge::Percent(tax),
                add_ons_cost: add_ons,
            }).expect("finite inputs");

            let parts = breakdown.base_rate
                + breakdown.franchise_fee_amount
                + breakdown.fuel_surcharge_amount
                + breakdown.add_ons_cost;
            prop_assert!((breakdown.subtotal - parts).abs() < TOLERANCE);
            prop_assert!(
                (breakdown.total_monthly_cost - (breakdown.subtotal + breakdown.local_tax_amount)).abs()
                    < TOLERANCE
            );
        }
    }
}
