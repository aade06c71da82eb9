//! Query → structured company profile, via a single model completion.
//!
//! The model's reply is untrusted text. Every failure on the way (transport,
//! empty reply, malformed JSON, wrong shape) ends up as `Extraction::Failed`
//! carrying a message meant for the user; nothing escapes as an error.

mod parse;
mod prompt;
mod types;

pub use types::{Extraction, ExtractionResult};

use parse::parse_reply;
use prompt::build_prompt;
use tracing::{debug, warn};

use crate::gemini::{CompletionClient, GeminiError};

pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse AI response. Please try a different query.";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("AI request failed: {0}")]
    Gemini(#[from] GeminiError),

    #[error("model returned an empty reply")]
    EmptyReply,

    #[error("reply is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("reply does not match the expected schema: {0}")]
    Schema(String),
}

impl ExtractError {
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::Gemini(GeminiError::Timeout(limit)) => format!(
                "The AI service did not respond within {}s. Please try again.",
                limit.as_secs().max(1)
            ),
            ExtractError::Gemini(e) => {
                format!("The AI service request failed: {e}. Please try again.")
            }
            ExtractError::EmptyReply | ExtractError::Parse(_) | ExtractError::Schema(_) => {
                PARSE_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

/// Extract a company profile from `query`. Expects a non-blank query.
pub async fn extract(client: &impl CompletionClient, query: &str) -> Extraction {
    match try_extract(client, query).await {
        Ok(result) => {
            debug!(
                keywords = result.search_keywords.len(),
                has_attributes = result.has_attributes(),
                "extraction complete"
            );
            Extraction::Found(result)
        }
        Err(e) => {
            warn!(error = %e, "extraction failed");
            Extraction::Failed {
                error: e.user_message(),
            }
        }
    }
}

async fn try_extract(
    client: &impl CompletionClient,
    query: &str,
) -> Result<ExtractionResult, ExtractError> {
    let prompt = build_prompt(query);
    let reply = client
        .complete(&prompt)
        .await?
        .ok_or(ExtractError::EmptyReply)?;
    parse_reply(&reply)
}
