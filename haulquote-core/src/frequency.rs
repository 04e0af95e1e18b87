//! Normalization of pickup frequencies and container sizes into the numbers
//! the monthly volume formula needs.
//!
//! Volume is always `bins x pickups per week x yards x 4.33`, where 4.33 is the
//! average number of weeks in a month.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Average number of weeks per month used throughout the pricing math.
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// Yard count assumed when a size token carries no digits.
pub const DEFAULT_CONTAINER_YARDS: u32 = 8;

const ON_CALL: &str = "on-call";

/// Canonical tokens and their pickups-per-week multiplier.
const CANONICAL_FREQUENCIES: [(&str, f64); 11] = [
    ("0.5x/week", 0.5),
    ("1x/week", 1.0),
    ("2x/week", 2.0),
    ("3x/week", 3.0),
    ("4x/week", 4.0),
    ("5x/week", 5.0),
    ("6x/week", 6.0),
    ("7x/week", 7.0),
    ("1x/month", 1.0 / WEEKS_PER_MONTH),
    ("2x/month", 2.0 / WEEKS_PER_MONTH),
    (ON_CALL, 0.0),
];

const FREQUENCY_SYNONYMS: [(&str, &str); 15] = [
    ("daily", "7x/week"),
    ("weekly", "1x/week"),
    ("onceaweek", "1x/week"),
    ("twiceweekly", "2x/week"),
    ("twiceaweek", "2x/week"),
    ("biweekly", "0.5x/week"),
    ("bi-weekly", "0.5x/week"),
    ("everyotherweek", "0.5x/week"),
    ("monthly", "1x/month"),
    ("twiceamonth", "2x/month"),
    ("as-needed", ON_CALL),
    ("asneeded", ON_CALL),
    ("oncall", ON_CALL),
    ("on-demand", ON_CALL),
    ("ondemand", ON_CALL),
];

static PERIOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)(?:x|times)?(?:/|per|a)?(week|wk|w|month|mo|m)s?$")
        .expect("frequency pattern is a valid regex")
});

static LEADING_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+").expect("digit pattern is a valid regex")
});

static SIZE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)?").expect("size pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Pickup frequency, stored as a canonical token such as `2x/week`.
///
/// Unrecognized descriptors keep their trimmed input so that rate lookups fail
/// with a readable message instead of silently pricing at some default.
pub struct Frequency(String);

impl Frequency {
    /// Normalize a free-form frequency descriptor.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let compact: String = trimmed
            .to_lowercase()
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect();

        if let Some((token, _)) = CANONICAL_FREQUENCIES
            .iter()
            .find(|(token, _)| *token == compact)
        {
            return Self((*token).to_owned());
        }

        if let Some(token) = period_token(&compact) {
            return Self(token);
        }

        if let Some((_, token)) = FREQUENCY_SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == compact)
        {
            return Self((*token).to_owned());
        }

        if let Ok(count) = compact.parse::<f64>()
            && count.is_finite()
            && count > 0.0
        {
            return Self(format!("{}x/week", format_count(count)));
        }

        Self(trimmed.to_owned())
    }

    /// The canonical (or unrecognized, verbatim) token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is on-call service with no scheduled pickups.
    #[must_use]
    pub fn is_on_call(&self) -> bool {
        self.0 == ON_CALL
    }

    /// Pickups per week, or `None` when the token was not recognized.
    #[must_use]
    pub fn weekly_multiplier(&self) -> Option<f64> {
        if let Some((_, multiplier)) = CANONICAL_FREQUENCIES
            .iter()
            .find(|(token, _)| *token == self.0)
        {
            return Some(*multiplier);
        }

        let (count, period) = self.0.split_once("x/")?;
        let count = count.parse::<f64>().ok()?;
        match period {
            "week" => Some(count),
            "month" => Some(count / WEEKS_PER_MONTH),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for Frequency {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

impl From<String> for Frequency {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.0
    }
}

fn period_token(compact: &str) -> Option<String> {
    let captures = PERIOD_PATTERN.captures(compact)?;
    let count = captures.get(1)?.as_str().parse::<f64>().ok()?;
    if count <= 0.0 {
        return None;
    }
    let period = match captures.get(2)?.as_str() {
        "week" | "wk" | "w" => "week",
        _ => "month",
    };
    Some(format!("{}x/{period}", format_count(count)))
}

// 2.0 -> "2", 0.5 -> "0.5"
fn format_count(count: f64) -> String {
    if count.fract().abs() < f64::EPSILON {
        format!("{count:.0}")
    } else {
        count.to_string()
    }
}

/// Price tier a container falls into for global category pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerCategory {
    /// 2, 3 and 4 yard containers.
    Small,
    /// 6, 8 and 10 yard containers, and any size not otherwise listed.
    Large,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Container size token such as `8YD`.
pub struct ContainerSize(String);

impl ContainerSize {
    /// Normalize a size descriptor (`8`, `8 yd`, `8 Yard`, `8YD`) to `8YD`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match SIZE_NUMBER.find(trimmed) {
            Some(number) => Self(format!("{}YD", number.as_str())),
            None => Self(trimmed.to_uppercase()),
        }
    }

    /// The normalized size token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading integer of the token, or [`DEFAULT_CONTAINER_YARDS`] when there is none.
    #[must_use]
    pub fn yards(&self) -> u32 {
        LEADING_DIGITS
            .find(&self.0)
            .and_then(|digits| digits.as_str().parse().ok())
            .unwrap_or(DEFAULT_CONTAINER_YARDS)
    }

    /// Global pricing tier for this size.
    #[must_use]
    pub fn category(&self) -> ContainerCategory {
        match self.yards() {
            2..=4 => ContainerCategory::Small,
            _ => ContainerCategory::Large,
        }
    }
}

impl fmt::Display for ContainerSize {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for ContainerSize {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

impl From<String> for ContainerSize {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ContainerSize> for String {
    fn from(size: ContainerSize) -> Self {
        size.0
    }
}

/// Cubic yards collected per month.
#[must_use]
pub fn monthly_volume(bin_quantity: u32, weekly_multiplier: f64, yards: u32) -> f64 {
    f64::from(bin_quantity) * weekly_multiplier * f64::from(yards) * WEEKS_PER_MONTH
}
