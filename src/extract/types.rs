use serde::{Deserialize, Deserializer, Serialize};

/// Structured company profile extracted from one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "string_list")]
    pub industry: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub location: Vec<String>,
    /// Funding stage such as "Seed" or "Series A"; `None` when not mentioned.
    #[serde(default, deserialize_with = "stage")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub search_keywords: Vec<String>,
}

impl ExtractionResult {
    /// Whether any profile attribute (everything except keywords) was extracted.
    pub fn has_attributes(&self) -> bool {
        !self.industry.is_empty()
            || !self.location.is_empty()
            || self.stage.is_some()
            || !self.technologies.is_empty()
    }
}

/// Outcome of one extraction: either a populated result or a user-facing error,
/// never both. Serializes as the bare result object or as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Extraction {
    Found(ExtractionResult),
    Failed { error: String },
}

impl Extraction {
    pub fn result(&self) -> Option<&ExtractionResult> {
        match self {
            Extraction::Found(result) => Some(result),
            Extraction::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Extraction::Found(_) => None,
            Extraction::Failed { error } => Some(error),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Accepts `["a", "b"]`, `"a"` or `null`; trims entries and drops blank ones.
fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(raw
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Accepts `"Seed"`, `null`, `[]` or `["Seed", "Series A"]` (joined).
fn stage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let joined = Option::<OneOrMany>::deserialize(deserializer)?
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    Ok((!joined.is_empty()).then_some(joined))
}
