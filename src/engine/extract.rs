//! Value and label extraction from a regex match.

use regex::Captures;

use crate::error::ExtractError;

/// Position of `name` among a pattern's group names.
///
/// Index 0 is the whole match and never has a name.
pub fn index_of(name: &str, group_names: &[String]) -> Option<usize> {
    group_names.iter().position(|g| !g.is_empty() && g == name)
}

/// Parse the value group as a float.
///
/// Accepts decimal and exponent forms plus `inf`/`nan` in any case. Hex
/// floats (`0x1p-2`) and digit separators are not numbers here.
///
/// A group that did not take part in the match reads as the empty string,
/// which fails to parse like any other non-number.
pub fn extract_value(caps: &Captures<'_>, group: &str, index: usize) -> Result<f64, ExtractError> {
    let text = caps.get(index).map_or("", |m| m.as_str());
    text.parse::<f64>().map_err(|_| ExtractError::BadValue {
        group: group.to_string(),
        text: text.to_string(),
    })
}

/// Collect label values in label declaration order.
pub fn extract_labels<'h>(
    caps: &Captures<'h>,
    labels: &[(String, usize)],
) -> Result<Vec<&'h str>, ExtractError> {
    labels
        .iter()
        .map(|(name, index)| {
            caps.get(*index)
                .map(|m| m.as_str())
                .ok_or_else(|| ExtractError::MissingLabel {
                    group: name.clone(),
                })
        })
        .collect()
}
