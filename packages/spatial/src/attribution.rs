//! Attribution of located permits to catalog regions.
//!
//! Regions are tested in catalog order and the first region containing a
//! permit's point wins. A bounding-rectangle check rejects most regions
//! before the polygon test.

use std::collections::BTreeMap;

use energy_map_source_models::Permit;
use geo::{Intersects as _, Point};
use serde::{Deserialize, Serialize};

use crate::catalog::RegionCatalog;
use crate::containment::{ContainmentTest, GeoContainment};

/// Tunables for [`assign_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributionOptions {
    /// Keep testing after the first match to count points claimed by more
    /// than one region. The first match still wins.
    pub detect_overlaps: bool,
}

/// Counters describing an attribution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionDiagnostics {
    /// Permits without a location.
    pub unlocated: usize,
    /// Located permits that fell in no region.
    pub unassigned: usize,
    /// Located permits contained in more than one region. Only counted
    /// with [`AttributionOptions::detect_overlaps`].
    pub overlapping: usize,
    /// Containment tests that failed on an unusable region shape.
    pub geometry_errors: usize,
}

/// Result of attributing permits to a catalog.
#[derive(Debug, Clone, Default)]
pub struct Assignment<'a> {
    /// Region name to the permits it won, in input order. Every catalog
    /// region is present.
    pub regions: BTreeMap<String, Vec<&'a Permit>>,
    /// Located permits that no region contains.
    pub unassigned: Vec<&'a Permit>,
    /// Counters for the run.
    pub diagnostics: AttributionDiagnostics,
}

impl<'a> Assignment<'a> {
    /// Permits assigned to `name`; empty for unknown regions.
    #[must_use]
    pub fn region(&self, name: &str) -> &[&'a Permit] {
        self.regions.get(name).map_or(&[], Vec::as_slice)
    }

    /// Number of permits assigned to any region.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }
}

/// Attributes permits with the default `geo` containment test.
#[must_use]
pub fn assign<'a>(permits: &'a [Permit], catalog: &RegionCatalog) -> Assignment<'a> {
    assign_with(permits, catalog, &GeoContainment, AttributionOptions::default())
}

/// Attributes permits with a caller-supplied containment test.
///
/// Permits without a location are counted as unlocated and skipped. A
/// failing containment test counts as "not contained".
#[must_use]
pub fn assign_with<'a, C>(
    permits: &'a [Permit],
    catalog: &RegionCatalog,
    containment: &C,
    options: AttributionOptions,
) -> Assignment<'a>
where
    C: ContainmentTest + ?Sized,
{
    let mut assignment = Assignment {
        regions: catalog
            .names()
            .map(|name| (name.to_string(), Vec::new()))
            .collect(),
        ..Assignment::default()
    };
    let diagnostics = &mut assignment.diagnostics;

    for permit in permits {
        let Some(location) = permit.location else {
            diagnostics.unlocated += 1;
            continue;
        };
        let point = Point::new(location.longitude, location.latitude);

        let mut winner: Option<&str> = None;
        let mut matches = 0_usize;

        for region in catalog.regions() {
            if winner.is_some() && !options.detect_overlaps {
                break;
            }
            if region.bbox().is_some_and(|bbox| !bbox.intersects(&point)) {
                continue;
            }

            match containment.contains(region, &point) {
                Ok(true) => {
                    matches += 1;
                    if winner.is_none() {
                        winner = Some(region.name.as_str());
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    diagnostics.geometry_errors += 1;
                    log::trace!("{e}");
                }
            }
        }

        if matches > 1 {
            diagnostics.overlapping += 1;
        }

        match winner.and_then(|name| assignment.regions.get_mut(name)) {
            Some(list) => list.push(permit),
            None => {
                diagnostics.unassigned += 1;
                assignment.unassigned.push(permit);
            }
        }
    }

    let diagnostics = assignment.diagnostics;
    if diagnostics.overlapping > 0 {
        log::warn!(
            "{} permits fall inside more than one {} region",
            diagnostics.overlapping,
            catalog.kind()
        );
    }
    if diagnostics.geometry_errors > 0 {
        log::warn!(
            "{} containment tests failed on regions without usable geometry",
            diagnostics.geometry_errors
        );
    }
    log::debug!(
        "Attributed {} of {} permits to {} regions ({} unassigned, {} unlocated)",
        assignment.assigned_count(),
        permits.len(),
        catalog.len(),
        diagnostics.unassigned,
        diagnostics.unlocated
    );

    assignment
}
