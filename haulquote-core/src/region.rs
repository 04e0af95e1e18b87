//! Texas pricing regions and the static city lookup that assigns them.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Regional rate sheet identifier.
pub enum Region {
    /// North Texas (Dallas / Fort Worth metroplex).
    #[serde(rename = "NTX")]
    NorthTexas,
    /// Central Texas (Austin, Waco, Killeen).
    #[serde(rename = "CTX")]
    CentralTexas,
    /// South Texas (San Antonio down to the valley).
    #[serde(rename = "STX")]
    SouthTexas,
}

const NORTH_TEXAS: &[&str] = &[
    "addison", "allen", "arlington", "azle", "bedford", "burleson", "carrollton",
    "cedar hill", "cleburne", "colleyville", "coppell", "dallas", "denton", "desoto",
    "duncanville", "euless", "farmers branch", "flower mound", "forney", "fort worth",
    "frisco", "garland", "grand prairie", "grapevine", "haltom city", "hurst", "irving",
    "keller", "lancaster", "lewisville", "little elm", "mansfield", "mckinney", "mesquite",
    "midlothian", "north richland hills", "plano", "prosper", "richardson", "rockwall",
    "rowlett", "sachse", "southlake", "the colony", "waxahachie", "weatherford", "wylie",
];

const CENTRAL_TEXAS: &[&str] = &[
    "austin", "bastrop", "belton", "buda", "cedar park", "copperas cove", "georgetown",
    "harker heights", "hutto", "killeen", "kyle", "lakeway", "leander", "manor",
    "pflugerville", "round rock", "san marcos", "taylor", "temple", "waco",
];

const SOUTH_TEXAS: &[&str] = &[
    "alamo heights", "boerne", "brownsville", "cibolo", "converse", "corpus christi",
    "edinburg", "harlingen", "helotes", "laredo", "live oak", "mcallen", "new braunfels",
    "san antonio", "schertz", "seguin", "selma", "universal city",
];

impl Region {
    /// Short code as used on rate sheets.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NorthTexas => "NTX",
            Self::CentralTexas => "CTX",
            Self::SouthTexas => "STX",
        }
    }

    /// Region for a city, restricted to Texas.
    #[must_use]
    pub fn for_city(city: &str, state: &str) -> Option<Self> {
        let state = state.trim();
        if !(state.eq_ignore_ascii_case("tx") || state.eq_ignore_ascii_case("texas")) {
            return None;
        }

        let city = normalize_city(city);
        [
            (Self::NorthTexas, NORTH_TEXAS),
            (Self::CentralTexas, CENTRAL_TEXAS),
            (Self::SouthTexas, SOUTH_TEXAS),
        ]
        .into_iter()
        .find(|(_, cities)| cities.contains(&city.as_str()))
        .map(|(region, _)| region)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

/// Lower-case a city name and collapse punctuation and repeated whitespace.
#[must_use]
pub fn normalize_city(city: &str) -> String {
    city.to_lowercase()
        .replace(['.', ','], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
