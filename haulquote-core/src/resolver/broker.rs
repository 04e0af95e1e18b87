//! Broker rate upload pricing.
//!
//! Broker rates are already final per-unit monthly prices, so this path skips
//! the volume formula and only scales by bin quantity.

use super::{DEFAULT_FUEL_SURCHARGE, FeeSchedule, PricingFailure, Resolution, first_configured};
use crate::calculator::{BaseRate, Charge};
use crate::model::ServiceRequest;
use crate::ports::{CityFees, DEFAULT_FRANCHISE_FEE, DEFAULT_SALES_TAX};
use crate::pricing::{BrokerPricing, BrokerRate, PricingConfig};
use crate::quote::{MatchedRate, PricingSource};
use crate::region::normalize_city;

pub(super) fn resolve(
    broker: &BrokerPricing,
    request: &ServiceRequest,
    fees: &CityFees,
    weekly_multiplier: f64,
) -> Result<Resolution, PricingFailure> {
    if broker.broker_rates.is_empty() {
        return Err(PricingFailure::MissingConfiguration(
            "no broker rates have been uploaded".to_owned(),
        ));
    }

    let rate = broker
        .broker_rates
        .iter()
        .find(|rate| rate_matches(rate, request))
        .ok_or_else(|| {
            PricingFailure::NoRateMatch(format!(
                "No broker rate found for {} {} at {} in {}, {}",
                request.container_size,
                request.equipment_type,
                request.frequency,
                request.city,
                request.state
            ))
        })?;

    let units = f64::from(request.bin_quantity);
    let config = broker.pricing_config.as_ref();
    let per_unit = |amount: Option<f64>| amount.map(|value| Charge::Amount(value * units));

    let schedule = FeeSchedule {
        fuel_surcharge: per_unit(rate.fuel_surcharge_amount).unwrap_or_else(|| {
            Charge::Percent(first_configured(
                [config.and_then(|cfg| cfg.fuel_surcharge)],
                DEFAULT_FUEL_SURCHARGE,
            ))
        }),
        franchise_fee: per_unit(rate.franchise_fee_amount).unwrap_or_else(|| {
            Charge::Percent(first_configured(
                [fees.franchise_fee, config.and_then(|cfg| cfg.franchise_fee)],
                DEFAULT_FRANCHISE_FEE,
            ))
        }),
        local_tax: per_unit(rate.tax_amount).unwrap_or_else(|| {
            Charge::Percent(first_configured(
                [fees.sales_tax, config.and_then(|cfg| cfg.tax_rate)],
                DEFAULT_SALES_TAX,
            ))
        }),
        delivery_fee: first_configured(
            [rate.delivery_fee, config.and_then(|cfg| cfg.delivery_fee)],
            0.0,
        ),
        extra_pickup_rate: first_configured(
            [
                rate.extra_pickup_rate,
                config.and_then(|cfg| cfg.extra_pickup_rate),
            ],
            0.0,
        ),
    };

    Ok(Resolution {
        source: PricingSource::BrokerSheet,
        matched_rate: MatchedRate::Broker { rate: rate.clone() },
        weekly_multiplier,
        base: BaseRate::Flat(rate.base_rate * units),
        fees: schedule,
        add_ons_cost: config.map_or(0.0, PricingConfig::additional_fees_monthly),
    })
}

fn rate_matches(rate: &BrokerRate, request: &ServiceRequest) -> bool {
    normalize_city(&rate.city) == normalize_city(&request.city)
        && rate.state.trim().eq_ignore_ascii_case(&request.state)
        && rate.equipment_type == request.equipment_type
        && rate.container_size == request.container_size
        && rate.frequency == request.frequency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{ContainerSize, Frequency};
    use crate::model::{EquipmentType, MaterialType};

    fn broker_rate() -> BrokerRate {
        BrokerRate {
            city: "FORT WORTH".to_owned(),
            state: "tx".to_owned(),
            equipment_type: EquipmentType::FrontLoad,
            container_size: ContainerSize::parse("8YD"),
            frequency: Frequency::parse("2x/week"),
            base_rate: 150.0,
            vendor: Some("Lone Star Hauling".to_owned()),
            franchise_fee_amount: None,
            tax_amount: None,
            fuel_surcharge_amount: None,
            delivery_fee: Some(95.0),
            extra_pickup_rate: None,
        }
    }

    fn request(bins: u32) -> ServiceRequest {
        ServiceRequest {
            id: "loc-4".to_owned(),
            address: "300 Throckmorton St".to_owned(),
            city: "Fort Worth".to_owned(),
            state: "TX".to_owned(),
            zip: "76102".to_owned(),
            equipment_type: EquipmentType::FrontLoad,
            container_size: ContainerSize::parse("8 yd"),
            frequency: Frequency::parse("twice weekly"),
            material_type: MaterialType::new("MSW"),
            bin_quantity: bins,
            add_ons: Vec::new(),
        }
    }

    #[test]
    fn base_is_rate_times_bins() {
        let broker = BrokerPricing {
            broker_rates: vec![broker_rate()],
            pricing_config: None,
        };
        let resolution = resolve(&broker, &request(3), &CityFees::unmatched("Fort Worth"), 2.0)
            .expect("rate matches case-insensitively");
        assert_eq!(resolution.base, BaseRate::Flat(450.0));
        assert_eq!(resolution.source, PricingSource::BrokerSheet);
        assert_eq!(resolution.fees.local_tax, Charge::Percent(8.25));
        assert!((resolution.fees.delivery_fee - 95.0).abs() < 1e-12);
    }

    #[test]
    fn embedded_amounts_replace_percentages() {
        let broker = BrokerPricing {
            broker_rates: vec![BrokerRate {
                franchise_fee_amount: Some(6.0),
                tax_amount: Some(12.5),
                ..broker_rate()
            }],
            pricing_config: None,
        };
        let fees = CityFees {
            franchise_fee: Some(4.0),
            ..CityFees::unmatched("Fort Worth")
        };
        let resolution = resolve(&broker, &request(2), &fees, 2.0).expect("rate matches");
        assert_eq!(resolution.fees.franchise_fee, Charge::Amount(12.0));
        assert_eq!(resolution.fees.local_tax, Charge::Amount(25.0));
        assert_eq!(resolution.fees.fuel_surcharge, Charge::Percent(15.0));
    }

    #[test]
    fn no_match_and_empty_upload() {
        let broker = BrokerPricing {
            broker_rates: vec![broker_rate()],
            pricing_config: None,
        };
        let mut elsewhere = request(1);
        elsewhere.city = "Dallas".to_owned();
        assert!(matches!(
            resolve(&broker, &elsewhere, &CityFees::unmatched("Dallas"), 2.0),
            Err(PricingFailure::NoRateMatch(_))
        ));

        assert!(matches!(
            resolve(
                &BrokerPricing::default(),
                &request(1),
                &CityFees::unmatched("Fort Worth"),
                2.0
            ),
            Err(PricingFailure::MissingConfiguration(_))
        ));
    }
}
