//! Franchised-city (municipal contract) pricing.

use tracing::debug;

use super::{DEFAULT_FUEL_SURCHARGE, FeeSchedule, PricingFailure, Resolution, first_configured};
use crate::calculator::{BaseRate, Charge};
use crate::frequency::WEEKS_PER_MONTH;
use crate::model::ServiceRequest;
use crate::ports::{CityFees, DEFAULT_FRANCHISE_FEE, DEFAULT_SALES_TAX};
use crate::pricing::{FranchisedCityRate, PricingConfig};
use crate::quote::{MatchedRate, PricingSource};

pub(super) fn resolve(
    rates: &[FranchisedCityRate],
    request: &ServiceRequest,
    fees: &CityFees,
    config: Option<&PricingConfig>,
    weekly_multiplier: f64,
) -> Result<Resolution, PricingFailure> {
    let rate = rates
        .iter()
        .find(|rate| {
            rate.container_size == request.container_size
                && rate.frequency == request.frequency
                && rate.equipment_type == request.equipment_type
                && rate
                    .material_type
                    .as_ref()
                    .is_none_or(|material| *material == request.material_type)
        })
        .ok_or_else(|| {
            PricingFailure::NoRateMatch(format!(
                "No municipal rate found for {} {} at {} in {}",
                request.container_size, request.equipment_type, request.frequency, fees.city_name
            ))
        })?;

    // Contract rates are flat monthly prices; convert so fee percentages apply
    // to the same per-yard base as every other path.
    let yards = f64::from(request.container_size.yards());
    let divisor = yards * weekly_multiplier * WEEKS_PER_MONTH;
    if divisor <= 0.0 {
        return Err(PricingFailure::NoPriceConfigured(format!(
            "Municipal rate for {} {} at {} in {} cannot be converted to a price per yard",
            request.container_size, request.equipment_type, request.frequency, fees.city_name
        )));
    }
    let price_per_yard = rate.monthly_rate / divisor;
    debug!(city = %fees.city_name, monthly_rate = rate.monthly_rate, price_per_yard, "matched municipal rate");

    let fuel = config.and_then(|cfg| cfg.fuel_surcharge);
    let schedule = FeeSchedule {
        fuel_surcharge: Charge::Percent(first_configured([fuel], DEFAULT_FUEL_SURCHARGE)),
        franchise_fee: Charge::Percent(first_configured(
            [
                rate.franchise_fee,
                fees.franchise_fee,
                config.and_then(|cfg| cfg.franchise_fee),
            ],
            DEFAULT_FRANCHISE_FEE,
        )),
        local_tax: Charge::Percent(first_configured(
            [
                rate.sales_tax,
                fees.sales_tax,
                config.and_then(|cfg| cfg.tax_rate),
            ],
            DEFAULT_SALES_TAX,
        )),
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
        source: PricingSource::MunicipalContract {
            city: fees.city_name.clone(),
        },
        matched_rate: MatchedRate::MunicipalContract { rate: rate.clone() },
        weekly_multiplier,
        base: BaseRate::PerYard(price_per_yard),
        fees: schedule,
        add_ons_cost: config.map_or(0.0, PricingConfig::additional_fees_monthly),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{CostInputs, calculate};
    use crate::frequency::{ContainerSize, Frequency};
    use crate::model::{EquipmentType, MaterialType};

    fn mansfield_rates() -> Vec<FranchisedCityRate> {
        vec![FranchisedCityRate {
            container_size: ContainerSize::parse("6YD"),
            frequency: Frequency::parse("2x/week"),
            equipment_type: EquipmentType::FrontLoad,
            material_type: None,
            monthly_rate: 259.80,
            delivery_fee: Some(75.0),
            franchise_fee: Some(5.0),
            sales_tax: None,
            extra_pickup_rate: Some(65.0),
        }]
    }

    fn request(size: &str, frequency: &str) -> ServiceRequest {
        ServiceRequest {
            id: "loc-1".to_owned(),
            address: "1200 E Broad St".to_owned(),
            city: "Mansfield".to_owned(),
            state: "TX".to_owned(),
            zip: "76063".to_owned(),
            equipment_type: EquipmentType::FrontLoad,
            container_size: ContainerSize::parse(size),
            frequency: Frequency::parse(frequency),
            material_type: MaterialType::new("MSW"),
            bin_quantity: 1,
            add_ons: Vec::new(),
        }
    }

    fn mansfield_fees() -> CityFees {
        CityFees {
            is_match: true,
            city_name: "Mansfield".to_owned(),
            franchise_fee: Some(2.0),
            sales_tax: Some(8.0),
            pricing_data: Some(mansfield_rates()),
        }
    }

    #[test]
    fn contract_rate_round_trips_to_monthly_price() {
        let rates = mansfield_rates();
        let resolution = resolve(&rates, &request("6YD", "2x/week"), &mansfield_fees(), None, 2.0)
            .expect("contract rate matches");

        let BaseRate::PerYard(price_per_yard) = resolution.base else {
            panic!("municipal rates resolve to a price per yard");
        };
        assert!((price_per_yard - 259.80 / 51.96).abs() < 1e-9);

        let breakdown = calculate(&CostInputs {
            bin_quantity: 1,
            weekly_multiplier: resolution.weekly_multiplier,
            yards: 6,
            base: resolution.base,
            fuel_surcharge: resolution.fees.fuel_surcharge,
            franchise_fee: resolution.fees.franchise_fee,
            local_tax: resolution.fees.local_tax,
            add_ons_cost: resolution.add_ons_cost,
        })
        .expect("finite");
        assert!((breakdown.total_monthly_volume - 51.96).abs() < 1e-9);
        assert!((breakdown.base_rate - 259.80).abs() < 1e-9);
    }

    #[test]
    fn contract_fees_override_city_and_config() {
        let rates = mansfield_rates();
        let config = PricingConfig {
            fuel_surcharge: Some(12.0),
            franchise_fee: Some(9.0),
            tax_rate: Some(7.0),
            ..PricingConfig::default()
        };
        let resolution = resolve(
            &rates,
            &request("6YD", "2x/week"),
            &mansfield_fees(),
            Some(&config),
            2.0,
        )
        .expect("contract rate matches");

        assert_eq!(resolution.fees.franchise_fee, Charge::Percent(5.0));
        assert_eq!(resolution.fees.local_tax, Charge::Percent(8.0));
        assert_eq!(resolution.fees.fuel_surcharge, Charge::Percent(12.0));
        assert!((resolution.fees.delivery_fee - 75.0).abs() < 1e-12);
        assert!((resolution.fees.extra_pickup_rate - 65.0).abs() < 1e-12);
        assert_eq!(resolution.source.to_string(), "Mansfield Municipal Contract");
    }

    #[test]
    fn missing_contract_row_names_the_request() {
        let rates = mansfield_rates();
        let failure = resolve(&rates, &request("8YD", "1x/week"), &mansfield_fees(), None, 1.0)
            .err();
        assert_eq!(
            failure,
            Some(PricingFailure::NoRateMatch(
                "No municipal rate found for 8YD Front-Load Container at 1x/week in Mansfield"
                    .to_owned()
            ))
        );
    }
}
