//! Ranked snapshots of breakdowns for presentation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use energy_map_analytics_models::{Bucket, PermitStats, RankBy, RankedEntry};

/// Orders a breakdown by descending `by`. The sort is stable, so ties keep
/// ascending name order.
#[must_use]
pub fn ranked(breakdown: &BTreeMap<String, Bucket>, by: RankBy) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = breakdown
        .iter()
        .map(|(name, bucket)| RankedEntry {
            name: name.clone(),
            bucket: *bucket,
        })
        .collect();

    entries.sort_by(|a, b| compare(&b.bucket, &a.bucket, by));
    entries
}

/// Ranks regions by their totals. Empty without regional statistics.
#[must_use]
pub fn ranked_regions(stats: &PermitStats, by: RankBy) -> Vec<RankedEntry> {
    stats
        .region_totals()
        .map(|totals| ranked(&totals, by))
        .unwrap_or_default()
}

fn compare(a: &Bucket, b: &Bucket, by: RankBy) -> Ordering {
    match by {
        RankBy::Count => a.count.cmp(&b.count),
        RankBy::Capacity | RankBy::Output => a.value(by).total_cmp(&b.value(by)),
    }
}
