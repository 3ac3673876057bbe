//! Locale-aware numeric parsing shared by the normalizer.
//!
//! The spreadsheets are maintained with Spanish locale settings, so a
//! decimal comma (`"19,5"`) is as common as a decimal point.

use std::sync::LazyLock;

use regex::Regex;

/// Leading decimal number: optional sign, digits with an optional
/// fraction, optional exponent.
static NUMBER_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid regex")
});

/// Parses a number written with either a decimal point or a decimal comma.
///
/// The first comma becomes the decimal separator, then the longest leading
/// number is read and anything after it is ignored (`"19,4 N"` is `19.4`,
/// `"1,234,5"` is `1.234`). Returns `None` when no number leads the cell or
/// the value is not finite.
#[must_use]
pub fn parse_locale_f64(raw: &str) -> Option<f64> {
    let dotted = raw.trim().replacen(',', ".", 1);
    let number = NUMBER_PREFIX_RE.find(&dotted)?;
    let value = number.as_str().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parses a metric cell. Anything that is not a finite number counts as
/// zero so a bad cell never removes the row from the sums.
#[must_use]
pub fn parse_metric(raw: Option<&str>) -> f64 {
    raw.and_then(parse_locale_f64).unwrap_or(0.0)
}
