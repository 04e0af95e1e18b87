//! Domain data structures for service requests.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::frequency::{ContainerSize, Frequency};

/// Wire form of [`Inheritable::InheritSelf`].
pub const AUTO_INHERIT: &str = "auto-inherit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// Kind of container serviced at a location.
pub enum EquipmentType {
    /// Front-load container emptied by a front-load truck.
    FrontLoad,
    /// Roll-off container hauled away and dumped.
    RollOff,
    /// Stationary or self-contained compactor.
    Compactor,
    /// Wheeled cart.
    Cart,
}

impl EquipmentType {
    /// Display label used in rate sheets and failure messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FrontLoad => "Front-Load Container",
            Self::RollOff => "Roll-off",
            Self::Compactor => "Compactor",
            Self::Cart => "Cart",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown equipment type: {0}")]
/// Equipment descriptor that matches none of the known types.
pub struct UnknownEquipmentType(pub String);

impl FromStr for EquipmentType {
    type Err = UnknownEquipmentType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();

        match key.as_str() {
            "frontloadcontainer" | "frontload" | "fel" | "fl" | "dumpster" => Ok(Self::FrontLoad),
            "rolloff" | "rolloffcontainer" | "ro" => Ok(Self::RollOff),
            "compactor" | "selfcontainedcompactor" | "stationarycompactor" => Ok(Self::Compactor),
            "cart" | "toter" | "polycart" => Ok(Self::Cart),
            _ => Err(UnknownEquipmentType(raw.trim().to_owned())),
        }
    }
}

impl TryFrom<String> for EquipmentType {
    type Error = UnknownEquipmentType;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<EquipmentType> for String {
    fn from(equipment: EquipmentType) -> Self {
        equipment.label().to_owned()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Waste stream collected (`MSW`, `Recycling`, ...), compared case-insensitively.
pub struct MaterialType(String);

impl MaterialType {
    /// Wrap a material descriptor.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_owned())
    }

    /// The material label as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for MaterialType {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for MaterialType {}

impl fmt::Display for MaterialType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for MaterialType {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(raw))
    }
}

impl From<String> for MaterialType {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<MaterialType> for String {
    fn from(material: MaterialType) -> Self {
        material.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A field that either carries a value or defers to the request's own recorded value.
///
/// On the wire this is the plain value or the string `auto-inherit`.
pub enum Inheritable<T> {
    /// A concrete value.
    Explicit(T),
    /// Use the value recorded on the same request.
    InheritSelf,
}

impl<T> Inheritable<T> {
    /// Resolve against a fallback value, consuming `self`.
    pub fn or_inherit(self, recorded: Option<T>) -> Option<T> {
        match self {
            Self::Explicit(value) => Some(value),
            Self::InheritSelf => recorded,
        }
    }

    /// Explicit value, if any.
    pub fn explicit(&self) -> Option<&T> {
        match self {
            Self::Explicit(value) => Some(value),
            Self::InheritSelf => None,
        }
    }

    /// Whether `candidate` satisfies this field; `InheritSelf` accepts anything.
    pub fn accepts(&self, candidate: &T) -> bool
    where
        T: PartialEq,
    {
        self.explicit().is_none_or(|value| value == candidate)
    }
}

impl<T> From<T> for Inheritable<T> {
    fn from(value: T) -> Self {
        Self::Explicit(value)
    }
}

impl<T: fmt::Display> Serialize for Inheritable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Explicit(value) => serializer.collect_str(value),
            Self::InheritSelf => serializer.serialize_str(AUTO_INHERIT),
        }
    }
}

impl<'de, T> Deserialize<'de> for Inheritable<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().eq_ignore_ascii_case(AUTO_INHERIT) {
            return Ok(Self::InheritSelf);
        }
        raw.parse().map(Self::Explicit).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Service currently on file for a location, as read from the upload.
pub struct RecordedService {
    /// Equipment on site.
    #[serde(default)]
    pub equipment_type: Option<EquipmentType>,
    /// Container size on site.
    #[serde(default)]
    pub container_size: Option<ContainerSize>,
    /// Current pickup frequency.
    #[serde(default)]
    pub frequency: Option<Frequency>,
    /// Current material stream.
    #[serde(default)]
    pub material_type: Option<MaterialType>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a draft request cannot be turned into a priceable request.
pub enum RequestError {
    /// A field asked to inherit but the request has nothing recorded for it.
    #[error("{0} is set to auto-inherit but the location has no recorded value")]
    MissingRecordedValue(&'static str),
    /// Bin quantity must be at least one.
    #[error("Bin quantity must be at least 1")]
    ZeroBins,
}

fn default_bin_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One location's requested service as delivered by ingestion, before inheritance is resolved.
pub struct ServiceRequestDraft {
    /// Identifier assigned by ingestion.
    pub id: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// City name.
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub zip: String,
    /// Requested equipment.
    pub equipment_type: Inheritable<EquipmentType>,
    /// Requested container size.
    pub container_size: Inheritable<ContainerSize>,
    /// Requested pickup frequency.
    pub frequency: Inheritable<Frequency>,
    /// Requested material stream.
    pub material_type: Inheritable<MaterialType>,
    /// Number of containers.
    #[serde(default = "default_bin_quantity")]
    pub bin_quantity: u32,
    /// Add-on service labels.
    #[serde(default)]
    pub add_ons: Vec<String>,
    /// Service on file, used by `auto-inherit` fields.
    #[serde(default)]
    pub recorded: RecordedService,
}

impl ServiceRequestDraft {
    /// Resolve every `auto-inherit` field against this request's own recorded service.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] when an inheriting field has no recorded value,
    /// or the bin quantity is zero.
    pub fn resolve(&self) -> Result<ServiceRequest, RequestError> {
        if self.bin_quantity == 0 {
            return Err(RequestError::ZeroBins);
        }

        let recorded = &self.recorded;
        let equipment_type = self
            .equipment_type
            .clone()
            .or_inherit(recorded.equipment_type)
            .ok_or(RequestError::MissingRecordedValue("Equipment type"))?;
        let container_size = self
            .container_size
            .clone()
            .or_inherit(recorded.container_size.clone())
            .ok_or(RequestError::MissingRecordedValue("Container size"))?;
        let frequency = self
            .frequency
            .clone()
            .or_inherit(recorded.frequency.clone())
            .ok_or(RequestError::MissingRecordedValue("Frequency"))?;
        let material_type = self
            .material_type
            .clone()
            .or_inherit(recorded.material_type.clone())
            .ok_or(RequestError::MissingRecordedValue("Material type"))?;

        Ok(ServiceRequest {
            id: self.id.clone(),
            address: self.address.clone(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_uppercase(),
            zip: self.zip.clone(),
            equipment_type,
            container_size,
            frequency,
            material_type,
            bin_quantity: self.bin_quantity,
            add_ons: self.add_ons.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A fully resolved, immutable service request ready for pricing.
pub struct ServiceRequest {
    /// Identifier assigned by ingestion.
    pub id: String,
    /// Street address.
    pub address: String,
    /// City name.
    pub city: String,
    /// Upper-case state code.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Equipment to price.
    pub equipment_type: EquipmentType,
    /// Container size to price.
    pub container_size: ContainerSize,
    /// Pickup frequency to price.
    pub frequency: Frequency,
    /// Material stream to price.
    pub material_type: MaterialType,
    /// Number of containers.
    pub bin_quantity: u32,
    /// Add-on service labels.
    pub add_ons: Vec<String>,
}
