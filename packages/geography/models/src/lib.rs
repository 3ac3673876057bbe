#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region kinds and Mexican administrative name tables.
//!
//! Permits are attributed against one of two boundary sets: the eight
//! Gerencias de Control Regional of the national grid operator, or the 32
//! entidades federativas.

pub mod states;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which boundary set a region catalog holds.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegionKind {
    /// Gerencia de Control Regional (8 regions).
    ControlArea,
    /// Entidad federativa (32 regions).
    State,
}

impl RegionKind {
    /// Human-readable Spanish label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ControlArea => "Gerencia de Control Regional",
            Self::State => "Estado",
        }
    }
}

/// The eight Gerencias de Control Regional, as named in the boundary
/// dataset.
pub const CONTROL_AREAS: &[&str] = &[
    "Baja California",
    "Central",
    "Noreste",
    "Noroeste",
    "Norte",
    "Occidental",
    "Oriental",
    "Peninsular",
];
