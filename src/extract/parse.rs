use serde_json::Value;
use tracing::debug;

use super::ExtractError;
use super::types::ExtractionResult;

const MAX_KEYWORDS: usize = 5;

/// Remove a surrounding markdown code fence (```` ``` ```` or ```` ```json ````).
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse an untrusted model reply into an `ExtractionResult`.
pub(super) fn parse_reply(reply: &str) -> Result<ExtractionResult, ExtractError> {
    let body = strip_code_fences(reply);
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(e) => object_slice(body)
            .and_then(|slice| serde_json::from_str::<Value>(slice).ok())
            .ok_or(ExtractError::Parse(e))?,
    };

    if !value.is_object() {
        return Err(ExtractError::Schema(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    let mut result: ExtractionResult =
        serde_json::from_value(value).map_err(|e| ExtractError::Schema(e.to_string()))?;

    if result.search_keywords.len() > MAX_KEYWORDS {
        debug!(
            returned = result.search_keywords.len(),
            kept = MAX_KEYWORDS,
            "truncating search keywords"
        );
        result.search_keywords.truncate(MAX_KEYWORDS);
    }

    Ok(result)
}

/// The outermost `{ ... }` span, for replies with prose around the object.
fn object_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
