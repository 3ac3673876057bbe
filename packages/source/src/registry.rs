//! Dataset registry: loads every dataset definition from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the binary
//! at compile time via [`include_str!`].

use crate::SourceError;
use crate::dataset_def::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("electricity", include_str!("../datasets/electricity.toml")),
    ("petroliferos", include_str!("../datasets/petroliferos.toml")),
    ("gas_lp", include_str!("../datasets/gas_lp.toml")),
    ("gas_natural", include_str!("../datasets/gas_natural.toml")),
];

/// Returns every registered dataset definition.
///
/// # Errors
///
/// Returns [`SourceError::Definition`] naming the first embedded TOML file
/// that fails to parse.
pub fn all_datasets() -> Result<Vec<DatasetDefinition>, SourceError> {
    DATASET_TOMLS
        .iter()
        .map(|(file, toml_str)| {
            parse_dataset_toml(toml_str).map_err(|e| SourceError::Definition {
                message: format!("{file}.toml: {e}"),
            })
        })
        .collect()
}

/// Looks up a dataset definition by id.
///
/// # Errors
///
/// Returns [`SourceError::Definition`] if the registry fails to parse or
/// no dataset has the given id.
pub fn dataset(id: &str) -> Result<DatasetDefinition, SourceError> {
    all_datasets()?
        .into_iter()
        .find(|def| def.id == id)
        .ok_or_else(|| SourceError::Definition {
            message: format!("unknown dataset '{id}'"),
        })
}

#[cfg(test)]
mod tests {
    use energy_map_source_models::{CategoryField, DatasetKind};

    use super::*;

    #[test]
    fn all_embedded_definitions_parse() {
        let defs = all_datasets().unwrap();
        assert_eq!(defs.len(), DATASET_TOMLS.len());
        for (def, (file, _)) in defs.iter().zip(DATASET_TOMLS) {
            assert_eq!(def.id, *file, "id must match the file name");
        }
    }

    #[test]
    fn electricity_schema_matches_sheet_columns() {
        let def = dataset("electricity").unwrap();
        assert_eq!(def.kind, DatasetKind::Electricity);
        assert_eq!(def.matrix_field, CategoryField::Technology);
        assert_eq!(def.fields.capacity[0], "CapacidadAutorizadaMW");
        assert_eq!(def.default_boundary.as_deref(), Some("control_areas"));
    }

    #[test]
    fn unknown_dataset_is_an_error() {
        assert!(dataset("hidrogeno").is_err());
    }
}
