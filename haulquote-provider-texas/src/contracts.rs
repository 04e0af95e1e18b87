//! Municipal contract rate tables for franchised Texas cities.

use haulquote_core::frequency::{ContainerSize, Frequency};
use haulquote_core::model::{EquipmentType, MaterialType};
use haulquote_core::pricing::FranchisedCityRate;

/// Contract row: size, frequency, monthly rate.
type Row = (&'static str, &'static str, f64);

const MANSFIELD_FRONT_LOAD: &[Row] = &[
    ("2YD", "1x/week", 71.40),
    ("2YD", "2x/week", 128.55),
    ("3YD", "1x/week", 82.15),
    ("3YD", "2x/week", 150.05),
    ("4YD", "1x/week", 93.70),
    ("4YD", "2x/week", 172.90),
    ("4YD", "3x/week", 252.10),
    ("6YD", "1x/week", 141.20),
    ("6YD", "2x/week", 259.80),
    ("6YD", "3x/week", 378.40),
    ("8YD", "1x/week", 168.65),
    ("8YD", "2x/week", 311.25),
    ("8YD", "3x/week", 453.85),
];

const MANSFIELD_DELIVERY_FEE: f64 = 75.0;
const MANSFIELD_EXTRA_PICKUP: f64 = 65.0;

const CLEBURNE_FRONT_LOAD: &[Row] = &[
    ("4YD", "1x/week", 88.30),
    ("6YD", "1x/week", 121.75),
    ("6YD", "2x/week", 226.60),
    ("8YD", "1x/week", 149.10),
    ("8YD", "2x/week", 280.45),
];

/// Contract table for a franchised city; empty for every other city.
pub(crate) fn contract_rates(city: &str) -> Vec<FranchisedCityRate> {
    match city {
        "Mansfield" => front_load(MANSFIELD_FRONT_LOAD, |rate| FranchisedCityRate {
            delivery_fee: Some(MANSFIELD_DELIVERY_FEE),
            extra_pickup_rate: Some(MANSFIELD_EXTRA_PICKUP),
            ..rate
        }),
        "Cleburne" => front_load(CLEBURNE_FRONT_LOAD, |rate| rate),
        _ => Vec::new(),
    }
}

fn front_load(
    rows: &[Row],
    customize: impl Fn(FranchisedCityRate) -> FranchisedCityRate,
) -> Vec<FranchisedCityRate> {
    rows.iter()
        .map(|&(size, frequency, monthly_rate)| {
            customize(FranchisedCityRate {
                container_size: ContainerSize::parse(size),
                frequency: Frequency::parse(frequency),
                equipment_type: EquipmentType::FrontLoad,
                material_type: Some(MaterialType::new("MSW")),
                monthly_rate,
                delivery_fee: None,
                franchise_fee: None,
                sales_tax: None,
                extra_pickup_rate: None,
            })
        })
        .collect()
}
