//! Parsing of free-text set labels and equipment descriptions.
//!
//! Structured catalog fields always win; these helpers are the fallback
//! path and feed the decorative weight estimate.

use once_cell::sync::Lazy;
use regex::Regex;

static SET_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(\d+)\s*[x×]").expect("set count pattern is valid"));

static REP_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[x×]\s*(\d+)").expect("rep count pattern is valid"));

static EQUIPMENT_KG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*kg\b").expect("equipment weight pattern is valid")
});

/// Parse the set count from a label such as `"4 × 12-15"` or `"3x10"`
///
/// Returns `None` when the label does not start with an integer followed by
/// a multiplication sign (e.g. `"20-30 min"`), or when the count is zero.
pub fn parse_set_count(label: &str) -> Option<u32> {
    SET_COUNT
        .captures(label)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Parse a per-set rep estimate from a label
///
/// Takes the first integer after the multiplication sign, so `"4 × 12-15"`
/// yields 12 and `"3 × 12/leg"` yields 12. `"4 × max"` yields `None`.
pub fn parse_rep_estimate(label: &str) -> Option<u32> {
    REP_COUNT
        .captures(label)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

/// Extract the first load in kilograms from an equipment description
///
/// `"Dumbbells 15 kg or barbell 30 kg"` yields 15.0; a decimal comma is
/// accepted (`"2,5 kg"`).
pub fn parse_equipment_kg(equipment: &str) -> Option<f64> {
    EQUIPMENT_KG
        .captures(equipment)
        .and_then(|caps| caps[1].replace(',', ".").parse::<f64>().ok())
}
