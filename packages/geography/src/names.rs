//! State name normalization and matching.
//!
//! Spreadsheets name states colloquially and sometimes with their INEGI
//! code in front (`"09 Ciudad de México"`, `"Veracruz"`), while boundary
//! datasets use the official name, with or without accents
//! (`"Ciudad de Mexico"`, `"Veracruz de Ignacio de la Llave"`). The
//! cascade in [`match_state_name`] bridges the two.
//!
//! The last rule (substring containment) is heuristic: a short name that is
//! contained in a longer, unrelated name matches whichever candidate comes
//! first (`"California"` matches `"Baja California"` before
//! `"Baja California Sur"`).

use std::sync::LazyLock;

use energy_map_geography_models::states::state_name;
use regex::Regex;

/// Leading INEGI code and the whitespace after it.
static NUMERIC_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*").expect("valid regex"));

/// Honorific suffixes of official state names, in normalized form.
pub const HONORIFIC_SUFFIXES: &[&str] = &[
    " DE ZARAGOZA",
    " DE JUAREZ",
    " DE IGNACIO DE LA LLAVE",
];

/// Which rule of the cascade produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Normalized names are equal.
    Exact,
    /// Names are equal once honorific suffixes are removed.
    MainName,
    /// One main name contains the other.
    Substring,
}

/// A candidate selected by [`match_state_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMatch<'a> {
    /// The candidate as it was passed in.
    pub name: &'a str,
    /// The rule that matched.
    pub kind: MatchKind,
}

/// Folds the Spanish diacritics of an uppercase character.
const fn fold_diacritic(c: char) -> char {
    match c {
        'Á' | 'À' | 'Â' | 'Ä' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        other => other,
    }
}

/// Normalizes a state name for comparison.
///
/// 1. Trim and strip a leading numeric code plus whitespace
/// 2. Uppercase
/// 3. Fold diacritics (`MÉXICO` → `MEXICO`)
/// 4. Collapse whitespace
#[must_use]
pub fn normalize_state_name(raw: &str) -> String {
    let stripped = NUMERIC_PREFIX_RE.replace(raw.trim(), "");
    let folded: String = stripped
        .to_uppercase()
        .chars()
        .map(fold_diacritic)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes one honorific suffix from an already normalized name.
#[must_use]
pub fn main_state_name(normalized: &str) -> &str {
    HONORIFIC_SUFFIXES
        .iter()
        .find_map(|suffix| normalized.strip_suffix(suffix))
        .unwrap_or(normalized)
}

/// Finds the candidate that best corresponds to `query`.
///
/// A bare INEGI code (`"09"`, `"9"`) is first replaced by the official
/// state name. Rules are then tried in order (exact, main name, substring);
/// within a rule candidates are tried in the order given, and the first hit
/// wins.
#[must_use]
pub fn match_state_name<'a, I>(query: &str, candidates: I) -> Option<StateMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = normalize_state_name(state_name(query).unwrap_or(query));
    if query.is_empty() {
        return None;
    }
    let query_main = main_state_name(&query);

    let normalized: Vec<(&'a str, String)> = candidates
        .into_iter()
        .map(|name| (name, normalize_state_name(name)))
        .collect();

    let find = |kind: MatchKind, pred: &dyn Fn(&str) -> bool| {
        normalized
            .iter()
            .find(|(_, candidate)| pred(candidate.as_str()))
            .map(|(name, _)| StateMatch { name: *name, kind })
    };

    find(MatchKind::Exact, &|candidate| candidate == query)
        .or_else(|| {
            find(MatchKind::MainName, &|candidate| {
                main_state_name(candidate) == query_main
            })
        })
        .or_else(|| {
            find(MatchKind::Substring, &|candidate| {
                let candidate_main = main_state_name(candidate);
                !candidate_main.is_empty()
                    && (candidate_main.contains(query_main) || query_main.contains(candidate_main))
            })
        })
}
