//! Pricing configuration: the active pricing mode and the rate data each mode reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::frequency::{ContainerCategory, ContainerSize, Frequency, WEEKS_PER_MONTH};
use crate::model::{EquipmentType, Inheritable, MaterialType};
use crate::region::Region;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
/// Active pricing mode with its mode-specific payload.
pub enum PricingLogic {
    /// Regional rate sheets keyed by Texas region.
    RegionalBrain(RegionalBrainPricing),
    /// Ordered custom rules on top of a global pricing configuration.
    Custom(CustomPricing),
    /// Flat rate list uploaded by a broker.
    Broker(BrokerPricing),
}

impl PricingLogic {
    /// Global pricing configuration carried by the active mode, if any.
    #[must_use]
    pub fn pricing_config(&self) -> Option<&PricingConfig> {
        match self {
            Self::RegionalBrain(regional) => regional.pricing_config.as_ref(),
            Self::Custom(custom) => custom.pricing_config.as_ref(),
            Self::Broker(broker) => broker.pricing_config.as_ref(),
        }
    }

    /// Wire name of the mode.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegionalBrain(_) => "regional-brain",
            Self::Custom(_) => "custom",
            Self::Broker(_) => "broker",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for [`PricingLogic::RegionalBrain`].
pub struct RegionalBrainPricing {
    /// Rate sheets; when absent the context-level sheets are used.
    #[serde(default)]
    pub regional_pricing_data: Option<RegionalPricingData>,
    /// Fuel surcharge, delivery, and extra pickup settings.
    #[serde(default)]
    pub pricing_config: Option<PricingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for [`PricingLogic::Custom`].
pub struct CustomPricing {
    /// Rules tried in order; the first match wins.
    #[serde(default)]
    pub custom_rules: Vec<CustomPricingRule>,
    /// Fallback pricing and fee settings.
    #[serde(default)]
    pub pricing_config: Option<PricingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for [`PricingLogic::Broker`].
pub struct BrokerPricing {
    /// Uploaded per-unit monthly rates.
    #[serde(default)]
    pub broker_rates: Vec<BrokerRate>,
    /// Fee settings used when a rate carries no precomputed amounts.
    #[serde(default)]
    pub pricing_config: Option<PricingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Global fallback pricing and fee settings. Percentages are given as `8.25` for 8.25%.
pub struct PricingConfig {
    /// Price per yard for 2, 3 and 4 yard containers.
    #[serde(default)]
    pub small_container_price: f64,
    /// Price per yard for 6, 8 and 10 yard containers and any other size.
    #[serde(default)]
    pub large_container_price: f64,
    /// Size and equipment specific prices, tried before the category prices.
    #[serde(default)]
    pub container_specific_pricing_rules: Vec<ContainerSpecificPricingRule>,
    /// Franchise fee percentage.
    #[serde(default)]
    pub franchise_fee: Option<f64>,
    /// Sales tax percentage.
    #[serde(default)]
    pub tax_rate: Option<f64>,
    /// Fuel surcharge percentage.
    #[serde(default)]
    pub fuel_surcharge: Option<f64>,
    /// One-time delivery fee in dollars.
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    /// Price of one extra pickup in dollars.
    #[serde(default)]
    pub extra_pickup_rate: Option<f64>,
    /// Recurring or one-time add-on fees.
    #[serde(default)]
    pub additional_fees: Vec<AdditionalFee>,
}

impl PricingConfig {
    /// Category price per yard for a container size.
    #[must_use]
    pub fn category_price(&self, size: &ContainerSize) -> f64 {
        match size.category() {
            ContainerCategory::Small => self.small_container_price,
            ContainerCategory::Large => self.large_container_price,
        }
    }

    /// Monthly equivalent of all additional fees.
    #[must_use]
    pub fn additional_fees_monthly(&self) -> f64 {
        self.additional_fees
            .iter()
            .map(AdditionalFee::monthly_cost)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Price per yard for an exact container size and equipment pair.
pub struct ContainerSpecificPricingRule {
    /// Container size the rule applies to.
    pub container_size: ContainerSize,
    /// Equipment the rule applies to.
    pub equipment_type: EquipmentType,
    /// Price per yard.
    pub price_per_yard: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Billing cadence of an [`AdditionalFee`].
pub enum FeeFrequency {
    /// Charged once; contributes nothing to the monthly cost.
    OneTime,
    /// Charged every week.
    Weekly,
    /// Charged every month.
    Monthly,
    /// Charged every three months.
    Quarterly,
    /// Charged once a year.
    Annually,
}

impl FeeFrequency {
    /// Factor turning one charge into its monthly equivalent.
    #[must_use]
    pub fn monthly_multiplier(self) -> f64 {
        match self {
            Self::OneTime => 0.0,
            Self::Weekly => WEEKS_PER_MONTH,
            Self::Monthly => 1.0,
            Self::Quarterly => 1.0 / 3.0,
            Self::Annually => 1.0 / 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Flat add-on fee such as a lock bar or enclosure cleaning.
pub struct AdditionalFee {
    /// Fee category label.
    pub category: String,
    /// Price per charge in dollars.
    pub price: f64,
    /// How often the fee is charged.
    pub frequency: FeeFrequency,
}

impl AdditionalFee {
    /// Monthly equivalent of this fee.
    #[must_use]
    pub fn monthly_cost(&self) -> f64 {
        self.price * self.frequency.monthly_multiplier()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// User-defined override, optionally scoped to a city and state.
pub struct CustomPricingRule {
    /// Rule identifier.
    pub id: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// City scope; `None` matches every city.
    #[serde(default)]
    pub city: Option<String>,
    /// State scope; `None` matches every state.
    #[serde(default)]
    pub state: Option<String>,
    /// Equipment the rule applies to.
    pub equipment_type: Inheritable<EquipmentType>,
    /// Container size the rule applies to.
    pub container_size: Inheritable<ContainerSize>,
    /// Frequency the rule applies to.
    pub frequency: Inheritable<Frequency>,
    /// Material the rule applies to.
    pub material_type: Inheritable<MaterialType>,
    /// Price per yard for small containers, and for large ones without their own price.
    #[serde(default)]
    pub price_per_yard: Option<f64>,
    /// Price per yard for large containers.
    #[serde(default)]
    pub large_container_price_per_yard: Option<f64>,
    /// Franchise fee percentage override.
    #[serde(default)]
    pub franchise_fee: Option<f64>,
    /// Sales tax percentage override.
    #[serde(default)]
    pub tax_rate: Option<f64>,
    /// Fuel surcharge percentage override.
    #[serde(default)]
    pub fuel_surcharge: Option<f64>,
    /// Delivery fee override.
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    /// Extra pickup rate override.
    #[serde(default)]
    pub extra_pickup_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Flat monthly price for a container size at a frequency.
pub struct RegionalRateEntry {
    /// Container size.
    pub container_size: ContainerSize,
    /// Pickup frequency.
    pub frequency: Frequency,
    /// Monthly price for one container.
    pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// All rate entries for one region.
pub struct RegionalRateSheet {
    /// Entries in sheet order.
    pub entries: Vec<RegionalRateEntry>,
}

impl RegionalRateSheet {
    /// First entry matching size and frequency exactly.
    #[must_use]
    pub fn find(&self, size: &ContainerSize, frequency: &Frequency) -> Option<&RegionalRateEntry> {
        self.entries
            .iter()
            .find(|entry| entry.container_size == *size && entry.frequency == *frequency)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Rate sheets keyed by region.
pub struct RegionalPricingData {
    /// One sheet per region.
    pub sheets: BTreeMap<Region, RegionalRateSheet>,
}

impl RegionalPricingData {
    /// Sheet for a region.
    #[must_use]
    pub fn sheet(&self, region: Region) -> Option<&RegionalRateSheet> {
        self.sheets.get(&region)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Municipal contract rate for a franchised city.
///
/// City-specific fee values here override every other source.
pub struct FranchisedCityRate {
    /// Container size.
    pub container_size: ContainerSize,
    /// Pickup frequency.
    pub frequency: Frequency,
    /// Equipment type.
    pub equipment_type: EquipmentType,
    /// Material stream; `None` applies to any material.
    #[serde(default)]
    pub material_type: Option<MaterialType>,
    /// Contract monthly price for one container.
    pub monthly_rate: f64,
    /// Contract delivery fee.
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    /// Contract franchise fee percentage.
    #[serde(default)]
    pub franchise_fee: Option<f64>,
    /// Contract sales tax percentage.
    #[serde(default)]
    pub sales_tax: Option<f64>,
    /// Contract extra pickup rate.
    #[serde(default)]
    pub extra_pickup_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Per-unit monthly rate from a broker upload.
///
/// Precomputed fee amounts, when present, are per unit and replace the
/// percentage calculation for that fee.
pub struct BrokerRate {
    /// City the rate applies to.
    pub city: String,
    /// State the rate applies to.
    pub state: String,
    /// Equipment type.
    pub equipment_type: EquipmentType,
    /// Container size.
    pub container_size: ContainerSize,
    /// Pickup frequency.
    pub frequency: Frequency,
    /// Monthly rate for one container.
    pub base_rate: f64,
    /// Hauler supplying the rate.
    #[serde(default)]
    pub vendor: Option<String>,
    /// Precomputed franchise fee in dollars.
    #[serde(default)]
    pub franchise_fee_amount: Option<f64>,
    /// Precomputed sales tax in dollars.
    #[serde(default)]
    pub tax_amount: Option<f64>,
    /// Precomputed fuel surcharge in dollars.
    #[serde(default)]
    pub fuel_surcharge_amount: Option<f64>,
    /// Delivery fee in dollars.
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    /// Extra pickup rate in dollars.
    #[serde(default)]
    pub extra_pickup_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Configuration value threaded through every quote generation call.
pub struct PricingContext {
    /// Active pricing mode.
    #[serde(default)]
    pub pricing_logic: Option<PricingLogic>,
    /// Regional sheets used by regional mode when the mode carries none of its own.
    #[serde(default)]
    pub regional_pricing_data: Option<RegionalPricingData>,
}

impl PricingContext {
    /// Replace the active pricing logic.
    #[must_use]
    pub fn with_pricing_logic(mut self, logic: PricingLogic) -> Self {
        self.pricing_logic = Some(logic);
        self
    }

    /// Replace the context-level regional rate sheets.
    #[must_use]
    pub fn with_regional_pricing_data(mut self, data: RegionalPricingData) -> Self {
        self.regional_pricing_data = Some(data);
        self
    }
}
