//! Traits describing fee provider capabilities and shared helper types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde::{Deserialize, Serialize};

use crate::model::ServiceRequest;
use crate::plugin::StateMeta;
use crate::pricing::FranchisedCityRate;

/// Sales tax applied when no city-specific value is known.
pub const DEFAULT_SALES_TAX: f64 = 8.25;

/// Franchise fee applied when no city-specific value is known.
pub const DEFAULT_FRANCHISE_FEE: f64 = 0.0;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to fee provider backends.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The state has no registered provider.
    #[error("Unsupported state: {0}")]
    UnsupportedState(String),
    /// Provider answered with data that cannot be used.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
/// City and state to resolve fees for.
pub struct CityQuery {
    /// City name as entered.
    pub city: String,
    /// State code.
    pub state: String,
}

impl CityQuery {
    /// Construct a new lookup query.
    #[must_use]
    pub fn new<C: Into<String>, S: Into<String>>(city: C, state: S) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }

    /// Query for the location of a service request.
    #[must_use]
    pub fn for_request(request: &ServiceRequest) -> Self {
        Self::new(request.city.as_str(), request.state.as_str())
    }

    /// Check if the query names no city.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.city.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Fees known for a city, and its municipal contract rates when it is franchised.
pub struct CityFees {
    /// Whether the provider recognized the city.
    pub is_match: bool,
    /// Canonical city name, or the queried name when unmatched.
    pub city_name: String,
    /// City franchise fee percentage.
    #[serde(default)]
    pub franchise_fee: Option<f64>,
    /// City sales tax percentage.
    #[serde(default)]
    pub sales_tax: Option<f64>,
    /// Municipal contract rate table, present only for franchised cities.
    #[serde(default)]
    pub pricing_data: Option<Vec<FranchisedCityRate>>,
}

impl CityFees {
    /// Result for a city no provider knows about.
    #[must_use]
    pub fn unmatched(city: &str) -> Self {
        Self {
            is_match: false,
            city_name: city.trim().to_owned(),
            franchise_fee: None,
            sales_tax: None,
            pricing_data: None,
        }
    }

    /// Municipal contract rates, if the city has a non-empty contract table.
    #[must_use]
    pub fn contract_rates(&self) -> Option<&[FranchisedCityRate]> {
        self.pricing_data
            .as_deref()
            .filter(|rates| !rates.is_empty())
    }

    /// Franchise fee, defaulting to [`DEFAULT_FRANCHISE_FEE`].
    #[must_use]
    pub fn franchise_fee_or_default(&self) -> f64 {
        self.franchise_fee.unwrap_or(DEFAULT_FRANCHISE_FEE)
    }

    /// Sales tax, defaulting to [`DEFAULT_SALES_TAX`].
    #[must_use]
    pub fn sales_tax_or_default(&self) -> f64 {
        self.sales_tax.unwrap_or(DEFAULT_SALES_TAX)
    }
}

#[async_trait]
/// Trait for provider-specific city fee backends.
pub trait CityFeePort: Send + Sync {
    /// Metadata describing the state handled by this port.
    fn state(&self) -> &StateMeta;

    /// Resolve franchise fee, sales tax, and contract rates for a city.
    ///
    /// Unknown cities are not an error: they resolve to [`CityFees::unmatched`].
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn lookup(&self, query: &CityQuery) -> Result<CityFees, PortError>;
}
