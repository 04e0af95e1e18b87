//! Default regional rate sheets for North, Central, and South Texas.

use std::collections::BTreeMap;

use haulquote_core::frequency::{ContainerSize, Frequency};
use haulquote_core::pricing::{RegionalPricingData, RegionalRateEntry, RegionalRateSheet};
use haulquote_core::region::Region;

const FREQUENCIES: [&str; 5] = ["1x/week", "2x/week", "3x/week", "4x/week", "5x/week"];

/// Monthly price per container for one size, by pickups per week (1 to 5).
type Row = (&'static str, [f64; 5]);

const NORTH_TEXAS: &[Row] = &[
    ("2YD", [58.40, 98.15, 137.90, 177.65, 217.40]),
    ("3YD", [66.75, 113.60, 160.45, 207.30, 254.15]),
    ("4YD", [75.10, 129.05, 183.00, 236.95, 290.90]),
    ("6YD", [92.95, 162.40, 231.85, 301.30, 370.75]),
    ("8YD", [110.85, 195.70, 280.55, 365.40, 450.25]),
    ("10YD", [128.70, 229.05, 329.40, 429.75, 530.10]),
];

const CENTRAL_TEXAS: &[Row] = &[
    ("2YD", [61.20, 103.05, 144.90, 186.75, 228.60]),
    ("3YD", [70.05, 119.40, 168.75, 218.10, 267.45]),
    ("4YD", [78.90, 135.75, 192.60, 249.45, 306.30]),
    ("6YD", [97.60, 170.80, 244.00, 317.20, 390.40]),
    ("8YD", [116.35, 205.90, 295.45, 385.00, 474.55]),
    ("10YD", [135.10, 241.00, 346.90, 452.80, 558.70]),
];

const SOUTH_TEXAS: &[Row] = &[
    ("2YD", [55.90, 93.80, 131.70, 169.60, 207.50]),
    ("3YD", [63.85, 108.55, 153.25, 197.95, 242.65]),
    ("4YD", [71.80, 123.30, 174.80, 226.30, 277.80]),
    ("6YD", [88.90, 155.20, 221.50, 287.80, 354.10]),
    ("8YD", [105.95, 187.05, 268.15, 349.25, 430.35]),
    ("10YD", [123.05, 218.90, 314.75, 410.60, 506.45]),
];

/// Built-in rate sheets used when the pricing file carries none.
#[must_use]
pub fn regional_pricing_data() -> RegionalPricingData {
    let sheets = [
        (Region::NorthTexas, NORTH_TEXAS),
        (Region::CentralTexas, CENTRAL_TEXAS),
        (Region::SouthTexas, SOUTH_TEXAS),
    ]
    .into_iter()
    .map(|(region, rows)| (region, sheet(rows)))
    .collect::<BTreeMap<_, _>>();

    RegionalPricingData { sheets }
}

fn sheet(rows: &[Row]) -> RegionalRateSheet {
    let entries = rows
        .iter()
        .flat_map(|(size, prices)| {
            FREQUENCIES
                .iter()
                .zip(prices)
                .map(|(frequency, price)| RegionalRateEntry {
                    container_size: ContainerSize::parse(size),
                    frequency: Frequency::parse(frequency),
                    price: *price,
                })
        })
        .collect();

    RegionalRateSheet { entries }
}
