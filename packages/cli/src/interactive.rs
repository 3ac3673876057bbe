//! Interactive menu for exploring a dataset without memorizing flags.
//!
//! The catalog cache lives for the whole menu session, so switching
//! between datasets that share a boundary set downloads it only once.

use dialoguer::{Input, Select};
use energy_map_analytics::ranked;
use energy_map_analytics_models::RankBy;
use energy_map_cli_utils::MultiProgress;
use energy_map_explorer::{ExplorerSession, FilterState, LoadRequest};
use energy_map_geography::all_boundaries;
use energy_map_source::SourceLocation;
use energy_map_source::dataset_def::DatasetDefinition;
use energy_map_source::registry;
use energy_map_spatial::CatalogCache;

use crate::output::{self, TableOptions};

const TABLE: TableOptions = TableOptions {
    top: 10,
    rank_by: RankBy::Capacity,
};
const SEARCH_LIMIT: usize = 25;

enum Action {
    FilterCategory,
    FilterRegion,
    Search,
    Reset,
    SwitchDataset,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::FilterCategory,
        Self::FilterRegion,
        Self::Search,
        Self::Reset,
        Self::SwitchDataset,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::FilterCategory => "Filtrar por categoría",
            Self::FilterRegion => "Filtrar por región",
            Self::Search => "Buscar permisos",
            Self::Reset => "Quitar filtro",
            Self::SwitchDataset => "Cambiar conjunto de datos",
            Self::Quit => "Salir",
        }
    }
}

/// Runs the interactive menu loop.
///
/// # Errors
///
/// Returns an error if a prompt fails or a dataset cannot be loaded.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let mut cache = CatalogCache::new();

    let request = prompt_request()?;
    let mut session = crate::load(&client, &mut cache, &request, multi)
        .await?
        .into_session();
    output::print_stats(session.dataset(), session.current_stats(), TABLE);

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("¿Qué deseas hacer?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::FilterCategory => {
                if !filter_category(&mut session)? {
                    continue;
                }
            }
            Action::FilterRegion => {
                if !filter_region(&mut session)? {
                    continue;
                }
            }
            Action::Search => {
                let query: String = Input::new().with_prompt("Buscar").interact_text()?;
                output::print_permits(session.dataset(), &session.search(&query, SEARCH_LIMIT));
                continue;
            }
            Action::Reset => {
                session.reset();
            }
            Action::SwitchDataset => {
                let request = prompt_request()?;
                let loaded = crate::load(&client, &mut cache, &request, multi).await?;
                session.replace_dataset(loaded.dataset, loaded.permits, loaded.catalog);
            }
            Action::Quit => break,
        }

        if let FilterState::Filtered(view) = session.state() {
            println!();
            println!("Filtro: {} ({} permisos)", view.criteria, view.permits.len());
        }
        output::print_stats(session.dataset(), session.current_stats(), TABLE);
    }

    Ok(())
}

/// Prompts for a dataset, its CSV location when it has no published
/// sheet, and a boundary set.
fn prompt_request() -> Result<LoadRequest, Box<dyn std::error::Error>> {
    let mut datasets = registry::all_datasets()?;
    let labels: Vec<&str> = datasets.iter().map(DatasetDefinition::name).collect();
    let idx = Select::new()
        .with_prompt("Conjunto de datos")
        .items(&labels)
        .default(0)
        .interact()?;
    let dataset = datasets.swap_remove(idx);

    let csv = if dataset.sheet_url.is_some() {
        None
    } else {
        let location: String = Input::new()
            .with_prompt("URL o ruta del CSV")
            .interact_text()?;
        Some(SourceLocation::parse(&location))
    };

    let mut boundaries = all_boundaries()?;
    let mut options: Vec<String> = boundaries.iter().map(|b| b.name.clone()).collect();
    options.push("Sin regiones".to_string());
    let default = dataset
        .default_boundary
        .as_deref()
        .and_then(|id| boundaries.iter().position(|b| b.id == id))
        .unwrap_or(boundaries.len());
    let choice = Select::new()
        .with_prompt("Regiones")
        .items(&options)
        .default(default)
        .interact()?;
    let boundary = (choice < boundaries.len()).then(|| boundaries.swap_remove(choice));

    Ok(LoadRequest {
        csv,
        boundary,
        ..LoadRequest::new(dataset)
    })
}

/// Returns `false` when there was nothing to choose from.
fn filter_category(session: &mut ExplorerSession) -> Result<bool, Box<dyn std::error::Error>> {
    let fields = session.dataset().category_fields();
    let field_labels: Vec<&str> = fields.iter().map(|f| f.label()).collect();
    let idx = Select::new()
        .with_prompt("Categoría")
        .items(&field_labels)
        .default(0)
        .interact()?;
    let field = fields[idx];

    let values: Vec<String> = ranked(&session.baseline().category(field), RankBy::Count)
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    if values.is_empty() {
        println!("Sin valores para {}", field.label());
        return Ok(false);
    }

    let idx = Select::new()
        .with_prompt(field.label())
        .items(&values)
        .default(0)
        .interact()?;
    session.filter_by_category(field, &values[idx]);
    Ok(true)
}

/// Returns `false` when no region catalog is loaded.
fn filter_region(session: &mut ExplorerSession) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(catalog) = session.catalog() else {
        println!("No hay regiones cargadas");
        return Ok(false);
    };
    let names: Vec<String> = catalog.names().map(String::from).collect();

    let idx = Select::new()
        .with_prompt(catalog.kind().label())
        .items(&names)
        .default(0)
        .interact()?;
    session.filter_by_region(&names[idx]);
    Ok(true)
}
