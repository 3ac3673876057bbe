//! Plain-text renderings of statistics and permits.

use energy_map_analytics::{ranked, ranked_regions};
use energy_map_analytics_models::{PermitStats, RankBy, RankedEntry};
use energy_map_source::dataset_def::DatasetDefinition;
use energy_map_source_models::Permit;

const NAME_WIDTH: usize = 36;

/// How many rows to show per table and how to order them.
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    pub top: usize,
    pub rank_by: RankBy,
}

pub fn print_stats(def: &DatasetDefinition, stats: &PermitStats, options: TableOptions) {
    let metrics = &def.metrics;

    println!();
    println!("{}", def.name);
    println!("{}", "=".repeat(def.name.chars().count()));
    println!("{:<28} {}", "Permisos", stats.totals.count);
    println!(
        "{:<28} {:.2} {}",
        metrics.capacity, stats.totals.capacity, metrics.capacity_unit
    );
    println!(
        "{:<28} {:.2} {}",
        metrics.output, stats.totals.output, metrics.output_unit
    );

    for field in def.category_fields() {
        let entries = ranked(&stats.category(field), options.rank_by);
        print_table(field.label(), &entries, def, options.top);
    }

    if stats.by_region.is_some() {
        let regions = ranked_regions(stats, options.rank_by);
        print_table("Regiones", &regions, def, options.top);
        print_matrix(def, stats, &regions, options);
    }

    if let Some(summary) = stats.attribution {
        println!();
        println!(
            "Asignados: {}  Sin región: {}  Sin coordenadas: {}  Traslapes: {}  Errores de geometría: {}",
            summary.assigned,
            summary.unassigned,
            summary.unlocated,
            summary.overlapping,
            summary.geometry_errors
        );
    }
}

fn print_table(title: &str, entries: &[RankedEntry], def: &DatasetDefinition, top: usize) {
    println!();
    println!("{title}");
    println!(
        "{:<NAME_WIDTH$} {:>14} {:>16} {:>8}",
        "NOMBRE", def.metrics.capacity_unit, def.metrics.output_unit, "PERMISOS"
    );
    println!("{}", "-".repeat(NAME_WIDTH + 41));

    for entry in entries.iter().take(top) {
        println!(
            "{:<NAME_WIDTH$} {:>14.2} {:>16.2} {:>8}",
            truncate(&entry.name, NAME_WIDTH),
            entry.bucket.capacity,
            entry.bucket.output,
            entry.bucket.count
        );
    }

    if entries.len() > top {
        println!("... {} más", entries.len() - top);
    }
}

/// Top categories of the dataset's matrix field within each region.
fn print_matrix(
    def: &DatasetDefinition,
    stats: &PermitStats,
    regions: &[RankedEntry],
    options: TableOptions,
) {
    let Some(matrix) = stats.matrix(def.matrix_field) else {
        return;
    };

    println!();
    println!("Regiones × {}", def.matrix_field.label());

    for region in regions.iter().take(options.top) {
        let Some(breakdown) = matrix.get(&region.name) else {
            continue;
        };
        let cells: Vec<String> = ranked(breakdown, options.rank_by)
            .iter()
            .take(3)
            .map(|entry| {
                format!(
                    "{} {:.2} {} ({})",
                    entry.name, entry.bucket.capacity, def.metrics.capacity_unit, entry.bucket.count
                )
            })
            .collect();

        println!(
            "{:<24} {}",
            truncate(&region.name, 24),
            if cells.is_empty() {
                "-".to_string()
            } else {
                cells.join(", ")
            }
        );
    }
}

pub fn print_permits(def: &DatasetDefinition, permits: &[&Permit]) {
    if permits.is_empty() {
        println!("Sin resultados");
        return;
    }

    println!(
        "{:<24} {:<NAME_WIDTH$} {:>12}  CATEGORÍAS",
        "PERMISO", "TITULAR", def.metrics.capacity_unit
    );
    println!("{}", "-".repeat(100));

    for permit in permits {
        let categories: Vec<&str> = permit.categories.values().map(String::as_str).collect();
        println!(
            "{:<24} {:<NAME_WIDTH$} {:>12.2}  {}",
            truncate(permit.permit_number.as_deref().unwrap_or("-"), 24),
            truncate(permit.holder.as_deref().unwrap_or("-"), NAME_WIDTH),
            permit.metrics.capacity,
            categories.join(" · ")
        );
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("Energía", 10), "Energía");
        assert_eq!(truncate("Energía Eólica", 8), "Energía…");
        assert_eq!(truncate("Energía Eólica", 8).chars().count(), 8);
    }
}
