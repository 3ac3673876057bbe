#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Permit record types and the dataset taxonomy.
//!
//! Every published spreadsheet (electricity generation permits,
//! petroliferos, gas LP, natural gas) is normalized into [`Permit`]
//! records that share the same shape: an optional location, one value per
//! declared [`CategoryField`], and two additive [`Metrics`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A raw spreadsheet row keyed by column header.
pub type RawRow = BTreeMap<String, String>;

/// The published dataset a permit was read from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// Electricity generation permits (capacity in MW, generation in GWh).
    Electricity,
    /// Petroleum products (petroliferos) retail and storage permits.
    Petroliferos,
    /// Liquefied petroleum gas permits.
    GasLp,
    /// Natural gas permits.
    GasNatural,
}

/// A categorical column that permits are grouped by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CategoryField {
    /// Entidad federativa as written in the spreadsheet.
    State,
    /// Generation technology (solar, eólica, ciclo combinado, ...).
    Technology,
    /// Permit type.
    PermitType,
    /// Commercial brand of the station.
    Brand,
    /// Permit status.
    Status,
}

impl CategoryField {
    /// Human-readable Spanish label for the field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::State => "Estado",
            Self::Technology => "Tecnología",
            Self::PermitType => "Tipo de Permiso",
            Self::Brand => "Marca",
            Self::Status => "Estatus",
        }
    }

    /// Value assigned when the spreadsheet has no value for this field
    /// (e.g. `"Sin Estado"`).
    #[must_use]
    pub fn missing_value(self) -> String {
        format!("Sin {}", self.label())
    }
}

/// A WGS84 position. Both components are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Location {
    /// Creates a location, rejecting NaN and infinite components.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if latitude.is_finite() && longitude.is_finite() {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }
}

/// Additive numeric values carried by a permit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Authorized capacity (MW for electricity, dataset-specific otherwise).
    pub capacity: f64,
    /// Estimated annual generation (GWh) for electricity, investment for
    /// the hydrocarbon datasets.
    pub output: f64,
}

/// One normalized permit row. Never mutated after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit {
    /// Dataset the row came from.
    pub kind: DatasetKind,
    /// Permit number (e.g. `"E/1234/GEN/2015"`).
    pub permit_number: Option<String>,
    /// Permit holder (razón social).
    pub holder: Option<String>,
    /// Position, when the row carried parseable coordinates.
    pub location: Option<Location>,
    /// One trimmed value per category field declared by the dataset.
    pub categories: BTreeMap<CategoryField, String>,
    /// Numeric values; unparseable cells are zero.
    pub metrics: Metrics,
}

impl Permit {
    /// Returns the normalized value for a category field, if the dataset
    /// declares it.
    #[must_use]
    pub fn category(&self, field: CategoryField) -> Option<&str> {
        self.categories.get(&field).map(String::as_str)
    }

    /// Whether the permit can take part in spatial attribution.
    #[must_use]
    pub const fn is_located(&self) -> bool {
        self.location.is_some()
    }
}
