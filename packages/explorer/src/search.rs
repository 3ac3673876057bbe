//! Free-text permit search.

use energy_map_source_models::Permit;

/// Returns up to `limit` permits whose number, holder or any category
/// value contains `query`, ignoring case. A blank query matches nothing.
#[must_use]
pub fn search<'a>(permits: &'a [Permit], query: &str, limit: usize) -> Vec<&'a Permit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    permits
        .iter()
        .filter(|permit| matches(permit, &needle))
        .take(limit)
        .collect()
}

fn matches(permit: &Permit, needle: &str) -> bool {
    permit
        .permit_number
        .iter()
        .chain(permit.holder.iter())
        .chain(permit.categories.values())
        .any(|value| value.to_lowercase().contains(needle))
}
