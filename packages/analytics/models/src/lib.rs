#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregated permit statistics.
//!
//! [`PermitStats`] is the output of one aggregation pass: overall totals,
//! a bucket per category value, and optionally the same statistics per
//! region together with an [`AttributionSummary`].

use std::collections::BTreeMap;

use energy_map_source_models::{CategoryField, Metrics};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Additive accumulator for a group of permits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Summed capacity.
    pub capacity: f64,
    /// Summed generation or investment.
    pub output: f64,
    /// Number of permits.
    pub count: u64,
}

impl Bucket {
    /// Adds one permit's metrics. Non-finite values contribute zero.
    pub fn record(&mut self, metrics: &Metrics) {
        self.capacity += finite_or_zero(metrics.capacity);
        self.output += finite_or_zero(metrics.output);
        self.count += 1;
    }

    /// The value used when ranking by `by`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn value(&self, by: RankBy) -> f64 {
        match by {
            RankBy::Capacity => self.capacity,
            RankBy::Output => self.output,
            RankBy::Count => self.count as f64,
        }
    }
}

const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Outcome counts of the spatial attribution behind `by_region`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionSummary {
    /// Permits assigned to some region.
    pub assigned: u64,
    /// Located permits outside every region.
    pub unassigned: u64,
    /// Permits without coordinates.
    pub unlocated: u64,
    /// Permits inside more than one region (only when overlap detection
    /// was requested).
    pub overlapping: u64,
    /// Failed containment tests on unusable region shapes.
    pub geometry_errors: u64,
}

/// Statistics over a set of permits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitStats {
    /// Sum over every permit.
    pub totals: Bucket,
    /// Category field to value to bucket.
    pub by_category: BTreeMap<CategoryField, BTreeMap<String, Bucket>>,
    /// Per-region statistics, when a region catalog was supplied. Region
    /// entries never carry regions of their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_region: Option<BTreeMap<String, Self>>,
    /// Attribution counters, when a region catalog was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<AttributionSummary>,
}

impl PermitStats {
    /// The breakdown for one category field; empty if no permit declared it.
    #[must_use]
    pub fn category(&self, field: CategoryField) -> BTreeMap<String, Bucket> {
        self.by_category.get(&field).cloned().unwrap_or_default()
    }

    /// Region × category view: region name to the region's breakdown for
    /// `field`. `None` without regional statistics.
    #[must_use]
    pub fn matrix(&self, field: CategoryField) -> Option<BTreeMap<String, BTreeMap<String, Bucket>>> {
        self.by_region.as_ref().map(|regions| {
            regions
                .iter()
                .map(|(name, stats)| (name.clone(), stats.category(field)))
                .collect()
        })
    }

    /// Per-region totals. `None` without regional statistics.
    #[must_use]
    pub fn region_totals(&self) -> Option<BTreeMap<String, Bucket>> {
        self.by_region.as_ref().map(|regions| {
            regions
                .iter()
                .map(|(name, stats)| (name.clone(), stats.totals))
                .collect()
        })
    }
}

/// Which bucket value orders a ranking.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RankBy {
    /// Summed capacity.
    #[default]
    Capacity,
    /// Summed generation or investment.
    Output,
    /// Number of permits.
    Count,
}

/// One row of a ranked breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// Category value or region name.
    pub name: String,
    pub bucket: Bucket,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ignores_non_finite_metrics() {
        let mut bucket = Bucket::default();
        bucket.record(&Metrics {
            capacity: f64::NAN,
            output: 2.5,
        });
        bucket.record(&Metrics {
            capacity: 10.0,
            output: f64::INFINITY,
        });
        assert!((bucket.capacity - 10.0).abs() < f64::EPSILON);
        assert!((bucket.output - 2.5).abs() < f64::EPSILON);
        assert_eq!(bucket.count, 2);
    }

    #[test]
    fn matrix_requires_regions() {
        let stats = PermitStats::default();
        assert!(stats.matrix(CategoryField::Technology).is_none());
        assert!(stats.category(CategoryField::Technology).is_empty());
    }

    #[test]
    fn matrix_projects_region_breakdowns() {
        let mut region = PermitStats::default();
        region
            .by_category
            .entry(CategoryField::Technology)
            .or_default()
            .entry("Solar".to_string())
            .or_default()
            .record(&Metrics {
                capacity: 10.0,
                output: 1.0,
            });

        let stats = PermitStats {
            by_region: Some(BTreeMap::from([
                ("Central".to_string(), region),
                ("Norte".to_string(), PermitStats::default()),
            ])),
            ..PermitStats::default()
        };

        let matrix = stats.matrix(CategoryField::Technology).unwrap();
        assert_eq!(matrix["Central"]["Solar"].count, 1);
        assert!(matrix["Norte"].is_empty());
    }

    #[test]
    fn serializes_camel_case_without_empty_regions() {
        let json = serde_json::to_value(PermitStats::default()).unwrap();
        assert!(json.get("byCategory").is_some());
        assert!(json.get("byRegion").is_none());
    }
}
