//! Custom rule pricing with container-specific and global fallbacks.

use tracing::debug;

use super::{
    DEFAULT_FUEL_SURCHARGE, FeeSchedule, GenerationScope, PricingFailure, Resolution,
    first_configured,
};
use crate::calculator::{BaseRate, Charge};
use crate::frequency::{ContainerCategory, ContainerSize};
use crate::model::ServiceRequest;
use crate::ports::{CityFees, DEFAULT_FRANCHISE_FEE, DEFAULT_SALES_TAX};
use crate::pricing::{CustomPricing, CustomPricingRule, PricingConfig};
use crate::quote::{MatchedRate, PricingSource};
use crate::region::normalize_city;

pub(super) fn resolve(
    custom: &CustomPricing,
    request: &ServiceRequest,
    fees: &CityFees,
    weekly_multiplier: f64,
    scope: GenerationScope,
) -> Result<Resolution, PricingFailure> {
    if custom.custom_rules.is_empty() && custom.pricing_config.is_none() {
        return Err(PricingFailure::MissingConfiguration(
            "custom pricing has neither rules nor a pricing configuration".to_owned(),
        ));
    }

    let fallback_config = PricingConfig::default();
    let config = custom.pricing_config.as_ref().unwrap_or(&fallback_config);
    let rule = custom
        .custom_rules
        .iter()
        .find(|rule| rule_matches(rule, request));

    let priced_rule = rule.and_then(|matched| {
        rule_price(matched, &request.container_size).map(|price| (matched, price))
    });
    let (price_per_yard, source, matched_rate) = match priced_rule {
        Some((matched, price)) => (
            price,
            PricingSource::CustomRule,
            MatchedRate::CustomRule {
                rule_id: matched.id.clone(),
                rule_name: matched.name.clone(),
            },
        ),
        None => {
            let (price, matched_rate) = config_price(config, request, scope)?;
            (price, PricingSource::PricingConfiguration, matched_rate)
        }
    };
    debug!(
        request = %request.id,
        rule = ?rule.map(|matched| matched.id.as_str()),
        price_per_yard,
        "custom price resolved"
    );

    let schedule = FeeSchedule {
        fuel_surcharge: Charge::Percent(first_configured(
            [rule.and_then(|matched| matched.fuel_surcharge), config.fuel_surcharge],
            DEFAULT_FUEL_SURCHARGE,
        )),
        franchise_fee: Charge::Percent(first_configured(
            [
                rule.and_then(|matched| matched.franchise_fee),
                fees.franchise_fee,
                config.franchise_fee,
            ],
            DEFAULT_FRANCHISE_FEE,
        )),
        local_tax: Charge::Percent(first_configured(
            [rule.and_then(|matched| matched.tax_rate), fees.sales_tax, config.tax_rate],
            DEFAULT_SALES_TAX,
        )),
        delivery_fee: first_configured(
            [rule.and_then(|matched| matched.delivery_fee), config.delivery_fee],
            0.0,
        ),
        extra_pickup_rate: first_configured(
            [rule.and_then(|matched| matched.extra_pickup_rate), config.extra_pickup_rate],
            0.0,
        ),
    };

    Ok(Resolution {
        source,
        matched_rate,
        weekly_multiplier,
        base: BaseRate::PerYard(price_per_yard),
        fees: schedule,
        add_ons_cost: config.additional_fees_monthly(),
    })
}

fn rule_matches(rule: &CustomPricingRule, request: &ServiceRequest) -> bool {
    scope_matches(rule.city.as_deref(), &request.city)
        && rule
            .state
            .as_deref()
            .map(str::trim)
            .filter(|state| !state.is_empty())
            .is_none_or(|state| state.eq_ignore_ascii_case(&request.state))
        && rule.equipment_type.accepts(&request.equipment_type)
        && rule.container_size.accepts(&request.container_size)
        && rule.frequency.accepts(&request.frequency)
        && rule.material_type.accepts(&request.material_type)
}

fn scope_matches(scope: Option<&str>, city: &str) -> bool {
    scope
        .map(normalize_city)
        .filter(|scope| !scope.is_empty())
        .is_none_or(|scope| scope == normalize_city(city))
}

fn rule_price(rule: &CustomPricingRule, size: &ContainerSize) -> Option<f64> {
    let small = rule.price_per_yard.filter(|price| *price > 0.0);
    match size.category() {
        ContainerCategory::Small => small,
        ContainerCategory::Large => rule
            .large_container_price_per_yard
            .filter(|price| *price > 0.0)
            .or(small),
    }
}

fn config_price(
    config: &PricingConfig,
    request: &ServiceRequest,
    scope: GenerationScope,
) -> Result<(f64, MatchedRate), PricingFailure> {
    if let Some(rule) = config.container_specific_pricing_rules.iter().find(|rule| {
        rule.container_size == request.container_size
            && rule.equipment_type == request.equipment_type
            && rule.price_per_yard > 0.0
    }) {
        return Ok((
            rule.price_per_yard,
            MatchedRate::ContainerSpecific { rule: rule.clone() },
        ));
    }

    let category = request.container_size.category();
    let price = config.category_price(&request.container_size);
    if price > 0.0 {
        return Ok((
            price,
            MatchedRate::GlobalCategory {
                category,
                price_per_yard: price,
            },
        ));
    }

    let hint = match scope {
        GenerationScope::Single => "Please configure the Price/YD field.",
        GenerationScope::Bulk => {
            "Please configure Container-Specific Pricing Rules or Global Container Pricing."
        }
    };
    Err(PricingFailure::NoPriceConfigured(format!(
        "No price per yard configured for {} {}. {hint}",
        request.container_size, request.equipment_type
    )))
}
