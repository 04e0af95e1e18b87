//! Quote records produced for each service request.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculator::MonthlyBreakdown;
use crate::frequency::ContainerCategory;
use crate::model::ServiceRequest;
use crate::pricing::{
    BrokerRate, ContainerSpecificPricingRule, FranchisedCityRate, RegionalRateEntry,
};
use crate::region::Region;
use crate::resolver::{FailureKind, PricingFailure, Resolution};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which resolver path priced a quote.
pub enum PricingSource {
    /// Municipal contract of a franchised city.
    MunicipalContract {
        /// Canonical city name.
        city: String,
    },
    /// Regional rate sheet.
    RegionalSheet {
        /// Region of the sheet.
        region: Region,
    },
    /// A custom rule with its own price.
    CustomRule,
    /// Container-specific or global pricing configuration.
    PricingConfiguration,
    /// Broker rate upload.
    BrokerSheet,
}

impl fmt::Display for PricingSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MunicipalContract { city } => write!(formatter, "{city} Municipal Contract"),
            Self::RegionalSheet { region } => write!(formatter, "{region} Regional Rate Sheet"),
            Self::CustomRule => formatter.write_str("Custom Rule"),
            Self::PricingConfiguration => formatter.write_str("Pricing Configuration"),
            Self::BrokerSheet => formatter.write_str("Broker Rate Sheet"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
/// Reference to the table entry or rule a quote was priced from.
pub enum MatchedRate {
    /// Row of a municipal contract.
    #[serde(rename_all = "camelCase")]
    MunicipalContract {
        /// Matched row.
        rate: FranchisedCityRate,
    },
    /// Row of a regional rate sheet.
    #[serde(rename_all = "camelCase")]
    RegionalSheet {
        /// Sheet region.
        region: Region,
        /// Matched row.
        entry: RegionalRateEntry,
    },
    /// Custom rule with a direct price.
    #[serde(rename_all = "camelCase")]
    CustomRule {
        /// Rule identifier.
        rule_id: String,
        /// Rule display name.
        rule_name: Option<String>,
    },
    /// Container-specific pricing rule.
    #[serde(rename_all = "camelCase")]
    ContainerSpecific {
        /// Matched rule.
        rule: ContainerSpecificPricingRule,
    },
    /// Global small or large container price.
    #[serde(rename_all = "camelCase")]
    GlobalCategory {
        /// Size category priced.
        category: ContainerCategory,
        /// Configured price per yard.
        price_per_yard: f64,
    },
    /// Broker upload row.
    #[serde(rename_all = "camelCase")]
    Broker {
        /// Matched row.
        rate: BrokerRate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Outcome of pricing a request.
pub enum QuoteStatus {
    /// All money fields are populated.
    Success,
    /// No price could be resolved; see `failure_reason`.
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Itemized monthly quote for one service request.
pub struct Quote {
    /// Quote identifier, derived from the request identifier.
    pub id: String,
    /// Identifier of the request this quote answers.
    pub request_id: String,
    /// Resolved request; absent only when the draft itself could not be resolved.
    pub service_request: Option<ServiceRequest>,
    /// Rule or table row that produced the price.
    pub matched_rate: Option<MatchedRate>,
    /// Human-readable name of the pricing path.
    pub pricing_source: String,
    /// Price per yard used (derived for broker rates).
    pub price_per_yard: f64,
    /// Monthly cost before fees and tax.
    pub base_rate: f64,
    /// Yards collected per month.
    pub total_monthly_volume: f64,
    /// Number of containers.
    pub number_of_units: u32,
    /// Pickups per week.
    pub pickups_per_week: f64,
    /// Franchise fee in dollars.
    pub franchise_fee_amount: f64,
    /// Franchise fee percentage.
    pub franchise_fee_rate: f64,
    /// Sales tax in dollars.
    pub local_tax_amount: f64,
    /// Sales tax percentage.
    pub local_tax_rate: f64,
    /// Fuel surcharge in dollars.
    pub fuel_surcharge_amount: f64,
    /// Fuel surcharge percentage.
    pub fuel_surcharge_rate: f64,
    /// One-time delivery fee; not part of the monthly total.
    pub delivery_fee: f64,
    /// Price per extra pickup; not part of the monthly total.
    pub extra_pickup_rate: f64,
    /// Monthly add-on cost.
    pub add_ons_cost: f64,
    /// Base plus franchise fee, fuel surcharge, and add-ons.
    pub subtotal: f64,
    /// Subtotal plus sales tax.
    pub total_monthly_cost: f64,
    /// Whether pricing succeeded.
    pub status: QuoteStatus,
    /// Category of the failure, for failed quotes.
    pub failure_kind: Option<FailureKind>,
    /// Message explaining the failure, for failed quotes.
    pub failure_reason: Option<String>,
    /// When the quote was generated.
    pub generated_at: DateTime<Utc>,
}

impl Quote {
    pub(crate) fn success(
        request: ServiceRequest,
        resolution: Resolution,
        breakdown: &MonthlyBreakdown,
    ) -> Self {
        Self {
            id: quote_id(&request.id),
            request_id: request.id.clone(),
            number_of_units: request.bin_quantity,
            pickups_per_week: resolution.weekly_multiplier,
            service_request: Some(request),
            pricing_source: resolution.source.to_string(),
            matched_rate: Some(resolution.matched_rate),
            price_per_yard: breakdown.price_per_yard,
            base_rate: breakdown.base_rate,
            total_monthly_volume: breakdown.total_monthly_volume,
            franchise_fee_amount: breakdown.franchise_fee_amount,
            franchise_fee_rate: breakdown.franchise_fee_rate,
            local_tax_amount: breakdown.local_tax_amount,
            local_tax_rate: breakdown.local_tax_rate,
            fuel_surcharge_amount: breakdown.fuel_surcharge_amount,
            fuel_surcharge_rate: breakdown.fuel_surcharge_rate,
            delivery_fee: resolution.fees.delivery_fee,
            extra_pickup_rate: resolution.fees.extra_pickup_rate,
            add_ons_cost: breakdown.add_ons_cost,
            subtotal: breakdown.subtotal,
            total_monthly_cost: breakdown.total_monthly_cost,
            status: QuoteStatus::Success,
            failure_kind: None,
            failure_reason: None,
            generated_at: Utc::now(),
        }
    }

    pub(crate) fn failed(
        request_id: &str,
        request: Option<ServiceRequest>,
        failure: &PricingFailure,
    ) -> Self {
        let number_of_units = request.as_ref().map_or(0, |resolved| resolved.bin_quantity);
        let pickups_per_week = request
            .as_ref()
            .and_then(|resolved| resolved.frequency.weekly_multiplier())
            .unwrap_or(0.0);

        Self {
            id: quote_id(request_id),
            request_id: request_id.to_owned(),
            service_request: request,
            matched_rate: None,
            pricing_source: String::new(),
            price_per_yard: 0.0,
            base_rate: 0.0,
            total_monthly_volume: 0.0,
            number_of_units,
            pickups_per_week,
            franchise_fee_amount: 0.0,
            franchise_fee_rate: 0.0,
            local_tax_amount: 0.0,
            local_tax_rate: 0.0,
            fuel_surcharge_amount: 0.0,
            fuel_surcharge_rate: 0.0,
            delivery_fee: 0.0,
            extra_pickup_rate: 0.0,
            add_ons_cost: 0.0,
            subtotal: 0.0,
            total_monthly_cost: 0.0,
            status: QuoteStatus::Failed,
            failure_kind: Some(failure.kind()),
            failure_reason: Some(failure.to_string()),
            generated_at: Utc::now(),
        }
    }

    /// Failed quote for an input row that could not be read as a request.
    #[must_use]
    pub fn rejected(request_id: &str, reason: impl Into<String>) -> Self {
        Self::failed(request_id, None, &PricingFailure::Unexpected(reason.into()))
    }

    /// Whether pricing succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == QuoteStatus::Success
    }
}

fn quote_id(request_id: &str) -> String {
    format!("quote-{request_id}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Counts and totals over a batch of quotes.
pub struct BatchSummary {
    /// Quotes generated.
    pub total: usize,
    /// Successful quotes.
    pub succeeded: usize,
    /// Failed quotes.
    pub failed: usize,
    /// Sum of monthly totals over successful quotes.
    pub monthly_total: f64,
    /// Sum of one-time delivery fees over successful quotes.
    pub one_time_total: f64,
}

impl BatchSummary {
    /// Summarize a batch.
    #[must_use]
    pub fn from_quotes(quotes: &[Quote]) -> Self {
        quotes.iter().fold(Self::default(), |mut summary, quote| {
            summary.total += 1;
            if quote.is_success() {
                summary.succeeded += 1;
                summary.monthly_total += quote.total_monthly_cost;
                summary.one_time_total += quote.delivery_fee;
            } else {
                summary.failed += 1;
            }
            summary
        })
    }
}
