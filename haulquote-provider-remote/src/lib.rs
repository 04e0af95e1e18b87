//! Provider implementation that resolves city fees from a remote fee service.
//!
//! The service answers `GET {base}/fees?city=..&state=..` with a JSON body
//! shaped like [`CityFees`]. A `404` means the city is unknown.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use haulquote_core::{
    plugin::{FeePlugin, StateId, StateMeta},
    ports::{CityFeePort, CityFees, CityQuery, PortError},
    pricing::FranchisedCityRate,
};

/// Body of a successful fee lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeResponse {
    #[serde(default)]
    is_match: bool,
    #[serde(default)]
    city_name: Option<String>,
    #[serde(default)]
    franchise_fee: Option<f64>,
    #[serde(default)]
    sales_tax: Option<f64>,
    #[serde(default)]
    pricing_data: Option<Vec<FranchisedCityRate>>,
}

/// City fee lookup over HTTP for a single state.
pub struct HttpFeePort {
    client: Client,
    base_url: String,
    meta: StateMeta,
}

impl HttpFeePort {
    /// Create a new fee port bound to the given HTTP client and service URL.
    #[must_use]
    pub fn new(client: Client, base_url: &str, meta: StateMeta) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            meta,
        }
    }
}

#[async_trait]
impl CityFeePort for HttpFeePort {
    fn state(&self) -> &StateMeta {
        &self.meta
    }

    async fn lookup(&self, query: &CityQuery) -> Result<CityFees, PortError> {
        if query.is_empty() {
            return Ok(CityFees::unmatched(&query.city));
        }

        let req = self
            .client
            .get(format!("{}/fees", self.base_url))
            .query(&[("city", query.city.trim()), ("state", self.meta.id.0.as_str())]);

        let Some(resp) = fetch_json::<FeeResponse>(req).await? else {
            debug!(city = %query.city, "fee service does not know city");
            return Ok(CityFees::unmatched(&query.city));
        };

        for (name, value) in [("franchiseFee", resp.franchise_fee), ("salesTax", resp.sales_tax)] {
            if value.is_some_and(|percent| !(0.0..=100.0).contains(&percent)) {
                return Err(PortError::InvalidResponse(format!(
                    "{name} out of range for {}",
                    query.city
                )));
            }
        }

        Ok(CityFees {
            is_match: resp.is_match,
            city_name: resp
                .city_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| query.city.trim().to_owned()),
            franchise_fee: resp.franchise_fee,
            sales_tax: resp.sales_tax,
            pricing_data: resp.pricing_data,
        })
    }
}

/// Build one plugin per state, all backed by the same fee service.
#[must_use]
pub fn plugins(client: &Client, base_url: &str, states: &[StateId]) -> Vec<FeePlugin> {
    states
        .iter()
        .map(|id| {
            let meta = StateMeta {
                id: id.clone(),
                name: format!("{id} (remote)"),
            };
            FeePlugin {
                meta: meta.clone(),
                fee_port: Arc::new(HttpFeePort::new(client.clone(), base_url, meta)),
            }
        })
        .collect()
}

// Fetch and decode JSON; `None` on 404.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<Option<T>, PortError> {
    let resp = req.send().await.map_err(PortError::from)?;
    if resp.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    resp.error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map(Some)
        .map_err(PortError::from)
}
