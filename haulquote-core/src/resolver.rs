//! Strategy selection and rate resolution.
//!
//! A request is priced by exactly one path. Municipal contract data for the
//! city always wins; otherwise the active [`PricingLogic`] decides. Each path
//! returns a [`Resolution`] that the calculator turns into money, or a
//! [`PricingFailure`] that becomes a failed quote.

mod broker;
mod custom;
mod municipal;
mod regional;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculator::{BaseRate, CalculationError, Charge};
use crate::model::{RequestError, ServiceRequest};
use crate::ports::CityFees;
use crate::pricing::{
    BrokerPricing, CustomPricing, FranchisedCityRate, PricingContext, PricingLogic,
    RegionalBrainPricing,
};
use crate::quote::{MatchedRate, PricingSource};

/// Fuel surcharge percentage applied when nothing else configures one.
pub const DEFAULT_FUEL_SURCHARGE: f64 = 15.0;

/// Delivery fee regional pricing charges when its configuration names none.
pub const DEFAULT_REGIONAL_DELIVERY_FEE: f64 = 100.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// Why a request could not be priced. Always surfaces as a failed quote.
pub enum PricingFailure {
    /// No rate table entry matches the request.
    #[error("{0}")]
    NoRateMatch(String),
    /// The city does not belong to any pricing region.
    #[error("No pricing region found for {city}, {state}")]
    NoRegionMatch {
        /// City as requested.
        city: String,
        /// State as requested.
        state: String,
    },
    /// Every fallback tier produced a zero or missing price.
    #[error("{0}")]
    NoPriceConfigured(String),
    /// No pricing logic, or the active mode lacks its required data.
    #[error("Missing pricing configuration: {0}")]
    MissingConfiguration(String),
    /// Malformed input or an arithmetic fault.
    #[error("{0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Category of a [`PricingFailure`], kept on failed quotes.
pub enum FailureKind {
    /// See [`PricingFailure::NoRateMatch`].
    NoRateMatch,
    /// See [`PricingFailure::NoRegionMatch`].
    NoRegionMatch,
    /// See [`PricingFailure::NoPriceConfigured`].
    NoPriceConfigured,
    /// See [`PricingFailure::MissingConfiguration`].
    MissingConfiguration,
    /// See [`PricingFailure::Unexpected`].
    Unexpected,
}

impl PricingFailure {
    /// Category of this failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoRateMatch(_) => FailureKind::NoRateMatch,
            Self::NoRegionMatch { .. } => FailureKind::NoRegionMatch,
            Self::NoPriceConfigured(_) => FailureKind::NoPriceConfigured,
            Self::MissingConfiguration(_) => FailureKind::MissingConfiguration,
            Self::Unexpected(_) => FailureKind::Unexpected,
        }
    }
}

impl From<RequestError> for PricingFailure {
    fn from(err: RequestError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

impl From<CalculationError> for PricingFailure {
    fn from(err: CalculationError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether quotes are generated for one location or a whole upload.
///
/// Only changes the wording of missing-price failures.
pub enum GenerationScope {
    /// A single location entered by hand.
    Single,
    /// A batch of uploaded locations.
    Bulk,
}

#[derive(Debug, Clone, Copy)]
/// Pricing path chosen for a request.
pub enum Strategy<'a> {
    /// City is under a municipal contract.
    Municipal(&'a [FranchisedCityRate]),
    /// Regional rate sheets.
    Regional(&'a RegionalBrainPricing),
    /// Custom rules and global configuration.
    Custom(&'a CustomPricing),
    /// Broker rate upload.
    Broker(&'a BrokerPricing),
}

/// Pick the pricing path for a request whose city fees are already known.
///
/// # Errors
///
/// Returns [`PricingFailure::MissingConfiguration`] when the city has no
/// municipal contract and no pricing logic is configured.
pub fn select_strategy<'a>(
    logic: Option<&'a PricingLogic>,
    fees: &'a CityFees,
) -> Result<Strategy<'a>, PricingFailure> {
    if let Some(rates) = fees.contract_rates() {
        return Ok(Strategy::Municipal(rates));
    }

    match logic {
        Some(PricingLogic::RegionalBrain(regional)) => Ok(Strategy::Regional(regional)),
        Some(PricingLogic::Custom(custom)) => Ok(Strategy::Custom(custom)),
        Some(PricingLogic::Broker(broker)) => Ok(Strategy::Broker(broker)),
        None => Err(PricingFailure::MissingConfiguration(
            "no pricing logic has been set".to_owned(),
        )),
    }
}

#[derive(Debug, Clone, Copy)]
/// Fees a path settled on.
pub(crate) struct FeeSchedule {
    pub(crate) fuel_surcharge: Charge,
    pub(crate) franchise_fee: Charge,
    pub(crate) local_tax: Charge,
    pub(crate) delivery_fee: f64,
    pub(crate) extra_pickup_rate: f64,
}

#[derive(Debug, Clone)]
/// Output of a rate resolver, ready for the calculator.
pub(crate) struct Resolution {
    pub(crate) source: PricingSource,
    pub(crate) matched_rate: MatchedRate,
    pub(crate) weekly_multiplier: f64,
    pub(crate) base: BaseRate,
    pub(crate) fees: FeeSchedule,
    pub(crate) add_ons_cost: f64,
}

/// Select a strategy and run its resolver.
pub(crate) fn resolve(
    context: &PricingContext,
    request: &ServiceRequest,
    fees: &CityFees,
    scope: GenerationScope,
) -> Result<Resolution, PricingFailure> {
    let strategy = select_strategy(context.pricing_logic.as_ref(), fees)?;
    let weekly_multiplier = request.frequency.weekly_multiplier().ok_or_else(|| {
        PricingFailure::Unexpected(format!("Unrecognized frequency '{}'", request.frequency))
    })?;
    let config = context
        .pricing_logic
        .as_ref()
        .and_then(PricingLogic::pricing_config);

    debug!(request = %request.id, strategy = strategy_name(&strategy), "resolving rate");

    let resolution = match strategy {
        Strategy::Municipal(rates) => {
            municipal::resolve(rates, request, fees, config, weekly_multiplier)
        }
        Strategy::Regional(regional) => regional::resolve(
            regional,
            context.regional_pricing_data.as_ref(),
            request,
            fees,
            weekly_multiplier,
        ),
        Strategy::Custom(custom) => custom::resolve(custom, request, fees, weekly_multiplier, scope),
        Strategy::Broker(broker) => broker::resolve(broker, request, fees, weekly_multiplier),
    }?;

    debug!(request = %request.id, source = %resolution.source, "rate resolved");
    Ok(resolution)
}

fn strategy_name(strategy: &Strategy<'_>) -> &'static str {
    match strategy {
        Strategy::Municipal(_) => "municipal",
        Strategy::Regional(_) => "regional-brain",
        Strategy::Custom(_) => "custom",
        Strategy::Broker(_) => "broker",
    }
}

/// First configured value in precedence order, else the default.
fn first_configured<const N: usize>(chain: [Option<f64>; N], default: f64) -> f64 {
    chain.into_iter().flatten().next().unwrap_or(default)
}
