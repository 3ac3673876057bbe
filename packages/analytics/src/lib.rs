#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Permit statistics aggregation and ranking.
//!
//! [`aggregate`] is a pure function of its inputs: it never fails, never
//! sorts, and always recomputes from scratch. Presentation order is
//! applied afterwards by the [`ranking`] helpers.

pub mod aggregate;
pub mod ranking;

pub use aggregate::{aggregate, aggregate_with};
pub use energy_map_analytics_models::{
    AttributionSummary, Bucket, PermitStats, RankBy, RankedEntry,
};
pub use ranking::{ranked, ranked_regions};
