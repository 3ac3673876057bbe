//! Normalizes raw spreadsheet rows into [`Permit`] values.
//!
//! Uses the dataset's [`FieldAliases`](crate::dataset_def::FieldAliases) to
//! resolve each canonical field regardless of how the spreadsheet names
//! its columns. Rows with unusable coordinates are dropped silently; the
//! caller decides whether to tally them via [`Normalizer::normalize_rows`].

use std::collections::BTreeMap;

use energy_map_source_models::{Location, Metrics, Permit, RawRow};

use crate::dataset_def::{DatasetDefinition, first_value};
use crate::parsing::{parse_locale_f64, parse_metric};

/// What to do with rows whose coordinates cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinatePolicy {
    /// Drop the row.
    #[default]
    Require,
    /// Keep the row with no location: it still counts towards totals and
    /// category breakdowns but never towards a region.
    KeepUnlocated,
}

/// Outcome of normalizing a batch of rows.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    /// Normalized permits, in row order.
    pub permits: Vec<Permit>,
    /// Rows dropped because their coordinates were unusable.
    pub skipped: usize,
    /// Permits kept without a location ([`CoordinatePolicy::KeepUnlocated`]).
    pub unlocated: usize,
}

/// Row normalizer bound to one dataset schema.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    def: &'a DatasetDefinition,
}

impl<'a> Normalizer<'a> {
    /// Creates a normalizer for the given dataset.
    #[must_use]
    pub const fn new(def: &'a DatasetDefinition) -> Self {
        Self { def }
    }

    /// Normalizes one row, returning `None` when either coordinate is
    /// missing or does not parse to a finite number.
    #[must_use]
    pub fn normalize(&self, row: &RawRow) -> Option<Permit> {
        let location = self.location(row)?;
        Some(self.build(row, Some(location)))
    }

    /// Normalizes one row, keeping it even when its coordinates are
    /// unusable.
    #[must_use]
    pub fn normalize_keep_unlocated(&self, row: &RawRow) -> Permit {
        self.build(row, self.location(row))
    }

    /// Resolves the row's coordinates through the alias lists.
    #[must_use]
    pub fn location(&self, row: &RawRow) -> Option<Location> {
        let fields = &self.def.fields;
        let latitude = first_value(row, &fields.latitude).and_then(parse_locale_f64)?;
        let longitude = first_value(row, &fields.longitude).and_then(parse_locale_f64)?;
        Location::new(latitude, longitude)
    }

    /// Normalizes a whole batch and tallies what was dropped.
    #[must_use]
    pub fn normalize_rows(&self, rows: &[RawRow], policy: CoordinatePolicy) -> NormalizeReport {
        let mut report = NormalizeReport {
            permits: Vec::with_capacity(rows.len()),
            ..NormalizeReport::default()
        };

        for row in rows {
            match policy {
                CoordinatePolicy::Require => match self.normalize(row) {
                    Some(permit) => report.permits.push(permit),
                    None => report.skipped += 1,
                },
                CoordinatePolicy::KeepUnlocated => {
                    let permit = self.normalize_keep_unlocated(row);
                    if !permit.is_located() {
                        report.unlocated += 1;
                    }
                    report.permits.push(permit);
                }
            }
        }

        log::debug!(
            "[{}] normalized {} of {} rows ({} skipped, {} unlocated)",
            self.def.id,
            report.permits.len(),
            rows.len(),
            report.skipped,
            report.unlocated,
        );

        report
    }

    fn build(&self, row: &RawRow, location: Option<Location>) -> Permit {
        let fields = &self.def.fields;

        let categories: BTreeMap<_, _> = fields
            .categories
            .iter()
            .map(|category| {
                let value = first_value(row, &category.aliases)
                    .map_or_else(|| category.field.missing_value(), String::from);
                (category.field, value)
            })
            .collect();

        Permit {
            kind: self.def.kind,
            permit_number: first_value(row, &fields.permit_number).map(String::from),
            holder: first_value(row, &fields.holder).map(String::from),
            location,
            categories,
            metrics: Metrics {
                capacity: parse_metric(first_value(row, &fields.capacity)),
                output: parse_metric(first_value(row, &fields.output)),
            },
        }
    }
}
