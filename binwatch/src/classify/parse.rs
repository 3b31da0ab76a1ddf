//! Parsing of free-form model replies.
//!
//! Vision models are asked for bare JSON, but replies regularly arrive
//! wrapped in Markdown code fences or with a sentence around the answer.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use super::{canonical_name, ClassifyError, Component, UNIDENTIFIED};

/// Parse a component list reply.
///
/// Accepts a JSON array of components, a single component object, or an
/// object with a `components` array. Entries missing required fields are
/// skipped. An empty list is a valid answer ("nothing recognised").
pub fn parse_components(reply: &str) -> Result<Vec<Component>, ClassifyError> {
    let body = strip_code_fence(reply);
    let value: Value = serde_json::from_str(body)
        .or_else(|_| serde_json::from_str(extract_json(body)))
        .map_err(|e| ClassifyError::MalformedResponse(format!("{}: {}", e, preview(reply))))?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("components") {
            Some(Value::Array(entries)) => entries,
            _ => vec![Value::Object(map)],
        },
        other => {
            return Err(ClassifyError::MalformedResponse(format!(
                "expected a list of components, got {}",
                preview(&other.to_string())
            )))
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Component>(entry.clone()) {
            Ok(component) if !component.component_name.trim().is_empty() => Some(component),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, entry = %entry, "Skipping malformed component");
                None
            }
        })
        .collect())
}

/// Map a part-identification reply onto the candidate names.
///
/// Returns the canonical candidate name when the reply names one (exactly,
/// or as part of a longer sentence), otherwise [`UNIDENTIFIED`].
pub fn parse_part_name(reply: &str, candidates: &[String]) -> String {
    let answer = canonical_name(strip_code_fence(reply));
    if answer.is_empty() || answer == UNIDENTIFIED {
        return UNIDENTIFIED.to_string();
    }

    let canonical: Vec<String> = candidates.iter().map(|c| canonical_name(c)).collect();
    if canonical.iter().any(|c| *c == answer) {
        return answer;
    }

    // "The bottle cap" should match "bottle cap" rather than "bottle"
    canonical
        .into_iter()
        .filter(|c| !c.is_empty() && answer.contains(c.as_str()))
        .max_by_key(|c| c.len())
        .unwrap_or_else(|| UNIDENTIFIED.to_string())
}

/// Accepts strings, numbers, or null; "None"/"N/A"/"" become `None`.
pub(super) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            let empty = s.is_empty()
                || s.eq_ignore_ascii_case("none")
                || s.eq_ignore_ascii_case("n/a")
                || s.eq_ignore_ascii_case("null");
            (!empty).then(|| s.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// The outermost `[...]` or `{...}` span of a reply with prose around it.
fn extract_json(text: &str) -> &str {
    let start = text.find(['[', '{']);
    let end = text.rfind([']', '}']);
    match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 80;
    let text = text.trim();
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
