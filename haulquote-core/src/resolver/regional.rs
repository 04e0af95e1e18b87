//! Regional rate sheet pricing.

use super::{
    DEFAULT_FUEL_SURCHARGE, DEFAULT_REGIONAL_DELIVERY_FEE, FeeSchedule, PricingFailure, Resolution,
    first_configured,
};
use crate::calculator::{BaseRate, Charge};
use crate::frequency::WEEKS_PER_MONTH;
use crate::model::ServiceRequest;
use crate::ports::CityFees;
use crate::pricing::{PricingConfig, RegionalBrainPricing, RegionalPricingData};
use crate::quote::{MatchedRate, PricingSource};
use crate::region::Region;

pub(super) fn resolve(
    regional: &RegionalBrainPricing,
    context_data: Option<&RegionalPricingData>,
    request: &ServiceRequest,
    fees: &CityFees,
    weekly_multiplier: f64,
) -> Result<Resolution, PricingFailure> {
    let region = Region::for_city(&request.city, &request.state).ok_or_else(|| {
        PricingFailure::NoRegionMatch {
            city: request.city.clone(),
            state: request.state.clone(),
        }
    })?;

    let data = regional
        .regional_pricing_data
        .as_ref()
        .or(context_data)
        .ok_or_else(|| {
            PricingFailure::MissingConfiguration("no regional rate sheets are loaded".to_owned())
        })?;

    let sheet = data.sheet(region).ok_or_else(|| {
        PricingFailure::NoRateMatch(format!("No {region} rate sheet is loaded"))
    })?;

    let entry = sheet
        .find(&request.container_size, &request.frequency)
        .ok_or_else(|| {
            PricingFailure::NoRateMatch(format!(
                "No {region} rate found for {} at {}",
                request.container_size, request.frequency
            ))
        })?;

    // Sheet rows are already per frequency, so only size converts the price.
    let yards = f64::from(request.container_size.yards());
    let price_per_yard = entry.price / (yards * WEEKS_PER_MONTH);

    let config = regional.pricing_config.as_ref();
    let schedule = FeeSchedule {
        fuel_surcharge: Charge::Percent(first_configured(
            [config.and_then(|cfg| cfg.fuel_surcharge)],
            DEFAULT_FUEL_SURCHARGE,
        )),
        franchise_fee: Charge::Percent(fees.franchise_fee_or_default()),
        local_tax: Charge::Percent(fees.sales_tax_or_default()),
        delivery_fee: first_configured(
            [config.and_then(|cfg| cfg.delivery_fee)],
            DEFAULT_REGIONAL_DELIVERY_FEE,
        ),
        extra_pickup_rate: first_configured(
            [config.and_then(|cfg| cfg.extra_pickup_rate)],
            0.0,
        ),
    };

    Ok(Resolution {
        source: PricingSource::RegionalSheet { region },
        matched_rate: MatchedRate::RegionalSheet {
            region,
            entry: entry.clone(),
        },
        weekly_multiplier,
        base: BaseRate::PerYard(price_per_yard),
        fees: schedule,
        add_ons_cost: config.map_or(0.0, PricingConfig::additional_fees_monthly),
    })
}
