use tracing::{debug, info};

use crate::extract::{Extraction, extract};
use crate::gemini::CompletionClient;
use crate::links::{SearchLink, build_links};

/// Everything shown for one submitted query.
#[derive(Debug)]
pub struct Report {
    pub extraction: Extraction,
    pub links: Vec<SearchLink>,
}

#[derive(Debug)]
pub enum Submission {
    /// Blank input: nothing was sent.
    Idle,
    Completed(Report),
}

/// One query in, one report out. Holds no per-request state.
pub struct SmartSearch<C> {
    client: C,
}

impl<C: CompletionClient> SmartSearch<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn submit(&self, query: &str) -> Submission {
        let query = query.trim();
        if query.is_empty() {
            debug!("empty query, skipping request");
            return Submission::Idle;
        }

        info!(query, "query submitted");
        let extraction = extract(&self.client, query).await;
        let links = match &extraction {
            Extraction::Found(result) => build_links(&result.search_keywords),
            Extraction::Failed { .. } => Vec::new(),
        };
        info!(
            ok = extraction.result().is_some(),
            links = links.len(),
            "query complete"
        );

        Submission::Completed(Report { extraction, links })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiClient;
    use reqwest::Client;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }]
        }))
    }

    async fn app_with_reply(
        template: ResponseTemplate,
        expected_calls: u64,
    ) -> (MockServer, SmartSearch<GeminiClient>) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(template)
            .expect(expected_calls)
            .mount(&server)
            .await;
        let app = SmartSearch::new(GeminiClient::with_base_url(Client::new(), &server.uri()));
        (server, app)
    }

    #[tokio::test]
    async fn blank_query_makes_no_request() {
        let (server, app) = app_with_reply(reply("{}"), 0).await;

        for query in ["", "   ", "\n\t"] {
            assert!(matches!(app.submit(query).await, Submission::Idle));
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn fenced_reply_yields_result_and_links() {
        let text = "```json\n{\"industry\": [\"Healthcare\"], \"location\": [\"Boston\"], \"stage\": \"Seed\", \"technologies\": [], \"search_keywords\": [\"ai healthcare boston\", \"ai healthcare companies\", \"boston ai startups\"]}\n```";
        let (_server, app) = app_with_reply(reply(text), 1).await;

        let submission = app
            .submit("Seed-stage AI healthcare companies in Boston")
            .await;
        let Submission::Completed(report) = submission else {
            panic!("expected a completed submission");
        };

        let result = report.extraction.result().expect("should succeed");
        assert_eq!(result.location, ["Boston"]);
        assert_eq!(
            report.links[0].url,
            "https://www.google.com/search?q=ai+healthcare+boston"
        );
        assert_eq!(report.links.len(), 3);
    }

    #[tokio::test]
    async fn malformed_reply_yields_error_and_no_links() {
        let (_server, app) = app_with_reply(reply("not json at all"), 1).await;

        let Submission::Completed(report) = app.submit("anything").await else {
            panic!("expected a completed submission");
        };
        assert!(report.extraction.error().is_some());
        assert!(report.links.is_empty());
    }

    #[tokio::test]
    async fn server_error_yields_error_result() {
        let (_server, app) = app_with_reply(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"code": 500, "message": "Internal server error"}
            })),
            1,
        )
        .await;

        let Submission::Completed(report) = app.submit("anything").await else {
            panic!("expected a completed submission");
        };
        let error = report.extraction.error().expect("should fail");
        assert!(error.contains("Internal server error"), "got: {error}");
    }

    #[tokio::test]
    async fn query_is_trimmed_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .and(wiremock::matchers::body_string_contains(
                r#"User Query: \"robotics in Munich\""#,
            ))
            .respond_with(reply(r#"{"search_keywords": ["munich robotics"]}"#))
            .expect(1)
            .mount(&server)
            .await;
        let app = SmartSearch::new(GeminiClient::with_base_url(Client::new(), &server.uri()));

        let Submission::Completed(report) = app.submit("  robotics in Munich \n").await else {
            panic!("expected a completed submission");
        };
        assert_eq!(report.links.len(), 3);
    }
}
