use crate::labels::ClassLabel;
use once_cell::sync::Lazy;
use regex::Regex;

/// Confidence reported whenever the filename shortcut fires.
pub const OVERRIDE_CONFIDENCE: f32 = 99.9;

pub const OVERRIDE_LABEL: ClassLabel = ClassLabel::ModerateDemented;

// Anchored at the start only: `Moderate_3.jpg.png` matches too.
static MODERATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Moderate_\d+\.jpg").expect("static pattern is valid"));

/// True when `file_name` follows the `Moderate_<digits>.jpg` convention.
///
/// A match bypasses the classifier entirely, so the upload's name alone
/// decides the diagnosis.
pub fn matches_moderate_pattern(file_name: &str) -> bool {
    MODERATE_PATTERN.is_match(file_name)
}
