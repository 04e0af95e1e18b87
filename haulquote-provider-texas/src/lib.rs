//! Provider implementation for Texas using built-in city fee and contract tables.

mod contracts;
mod sheets;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use haulquote_core::{
    plugin::{FeePlugin, StateId, StateMeta},
    ports::{CityFeePort, CityFees, CityQuery, PortError},
    pricing::FranchisedCityRate,
    region::normalize_city,
};

pub use sheets::regional_pricing_data;

/// Franchise fee and sales tax per city, as `(city, franchise fee %, sales tax %)`.
const CITY_FEES: &[(&str, f64, f64)] = &[
    ("Addison", 5.0, 8.25),
    ("Allen", 5.0, 8.25),
    ("Arlington", 7.0, 8.0),
    ("Austin", 5.0, 8.25),
    ("Carrollton", 6.0, 8.25),
    ("Cleburne", 8.0, 8.25),
    ("Corpus Christi", 4.0, 8.25),
    ("Dallas", 4.0, 8.25),
    ("Denton", 5.0, 8.25),
    ("Fort Worth", 5.0, 8.25),
    ("Frisco", 5.0, 8.25),
    ("Garland", 6.0, 8.25),
    ("Georgetown", 5.0, 8.25),
    ("Grand Prairie", 7.0, 8.25),
    ("Irving", 6.0, 8.25),
    ("Killeen", 4.0, 8.25),
    ("Laredo", 3.0, 8.25),
    ("Mansfield", 5.0, 8.25),
    ("McAllen", 4.0, 8.25),
    ("McKinney", 5.0, 8.25),
    ("Mesquite", 6.0, 8.25),
    ("New Braunfels", 5.0, 8.25),
    ("Plano", 5.0, 8.25),
    ("Richardson", 5.0, 8.25),
    ("Round Rock", 5.0, 8.25),
    ("San Antonio", 4.0, 8.25),
    ("San Marcos", 5.0, 8.25),
    ("Waco", 4.0, 8.25),
];

struct CityRecord {
    name: &'static str,
    franchise_fee: f64,
    sales_tax: f64,
    contract: Vec<FranchisedCityRate>,
}

/// City fee lookup backed by the built-in Texas tables.
pub struct TexasFeePort {
    meta: StateMeta,
    cities: HashMap<String, CityRecord>,
}

impl TexasFeePort {
    /// Create a new port with the built-in city and contract tables.
    #[must_use]
    pub fn new() -> Self {
        let cities = CITY_FEES
            .iter()
            .map(|&(name, franchise_fee, sales_tax)| {
                let record = CityRecord {
                    name,
                    franchise_fee,
                    sales_tax,
                    contract: contracts::contract_rates(name),
                };
                (normalize_city(name), record)
            })
            .collect();

        Self {
            meta: state_meta(),
            cities,
        }
    }
}

impl Default for TexasFeePort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CityFeePort for TexasFeePort {
    fn state(&self) -> &StateMeta {
        &self.meta
    }

    async fn lookup(&self, query: &CityQuery) -> Result<CityFees, PortError> {
        if StateId::new(&query.state) != self.meta.id {
            return Err(PortError::UnsupportedState(query.state.clone()));
        }
        if query.is_empty() {
            return Ok(CityFees::unmatched(&query.city));
        }

        let Some(record) = self.cities.get(&normalize_city(&query.city)) else {
            debug!(city = %query.city, "city not in Texas fee table");
            return Ok(CityFees::unmatched(&query.city));
        };

        Ok(CityFees {
            is_match: true,
            city_name: record.name.to_owned(),
            franchise_fee: Some(record.franchise_fee),
            sales_tax: Some(record.sales_tax),
            pricing_data: (!record.contract.is_empty()).then(|| record.contract.clone()),
        })
    }
}

/// Build the plugin bundle for the Texas provider.
#[must_use]
pub fn plugin() -> FeePlugin {
    FeePlugin {
        meta: state_meta(),
        fee_port: Arc::new(TexasFeePort::new()),
    }
}

fn state_meta() -> StateMeta {
    StateMeta {
        id: StateId::new("TX"),
        name: String::from("Texas"),
    }
}
