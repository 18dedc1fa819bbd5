use super::prompts;
use super::types::{
    AnalyzeError, GeminiConfig, GenerateContentRequest, GenerateContentResponse, OutputLanguage,
};

use std::time::Instant;

const API_KEY_HEADER: &str = "x-goog-api-key";
const EXCERPT_LIMIT: usize = 800;

/// Stateless client for one model's `generateContent` endpoint.
///
/// Every call to [`GeminiClient::analyze`] builds one prompt and makes exactly
/// one request. Nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AnalyzeError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| AnalyzeError::Config(format!("invalid proxy '{}': {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| AnalyzeError::Config(e.to_string()))?;

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AnalyzeError::Config("Gemini base URL is required".to_string()));
        }

        let model = config.model.trim().to_string();
        if model.is_empty() {
            return Err(AnalyzeError::Config("Gemini model is required".to_string()));
        }

        Ok(Self {
            client,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Validates the inputs, then runs one analysis round-trip.
    pub async fn analyze(
        &self,
        narrative: &str,
        language: OutputLanguage,
        credential: &str,
    ) -> Result<String, AnalyzeError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AnalyzeError::MissingCredential);
        }
        if narrative.trim().is_empty() {
            return Err(AnalyzeError::MissingNarrative);
        }

        let prompt = prompts::build_prompt(narrative, language);
        tracing::info!(
            model = %self.model,
            language = language.code(),
            narrative_chars = narrative.chars().count(),
            "Starting conflict analysis"
        );

        let t0 = Instant::now();
        let result = self.generate(prompt, credential).await;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => tracing::info!(
                elapsed_ms,
                response_chars = text.chars().count(),
                "Analysis complete"
            ),
            Err(e) => tracing::warn!(elapsed_ms, kind = e.kind(), "Analysis failed"),
        }

        result
    }

    /// Sends `prompt` as a single-turn request and returns the first candidate's text.
    pub async fn generate(&self, prompt: String, credential: &str) -> Result<String, AnalyzeError> {
        let request = GenerateContentRequest::single_turn(prompt);

        let response = self
            .client
            .post(self.generate_content_url())
            .header(API_KEY_HEADER, credential)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Gemini responded");

        let body = response.text().await.map_err(transport_failure)?;

        if !status.is_success() {
            return Err(AnalyzeError::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        extract_text(&body)
    }
}

fn transport_failure(e: reqwest::Error) -> AnalyzeError {
    let description = if e.is_timeout() {
        format!("timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };
    AnalyzeError::TransportFailure { description }
}

/// Pulls `candidates[0].content.parts[0].text` out of a success body.
pub fn extract_text(body: &str) -> Result<String, AnalyzeError> {
    let malformed = |reason: String| AnalyzeError::MalformedResponse {
        reason,
        excerpt: excerpt(body),
    };

    let resp: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| malformed(format!("JSON parse: {}", e)))?;

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| malformed("no candidates returned".to_string()))?;

    candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| malformed("first candidate has no text part".to_string()))
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            base_url: "http://127.0.0.1:1/v1beta/".to_string(),
            model: " gemini-2.0-flash ".to_string(),
            timeout: Duration::from_secs(1),
            proxy: None,
        })
        .unwrap()
    }

    #[test]
    fn url_is_built_from_base_and_model() {
        assert_eq!(
            client().generate_content_url(),
            "http://127.0.0.1:1/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn bad_proxy_is_a_config_error() {
        let err = GeminiClient::new(GeminiConfig {
            proxy: Some("http://[::1".to_string()),
            ..GeminiConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, AnalyzeError::Config(_)));
    }

    #[test]
    fn blank_model_is_a_config_error() {
        let err = GeminiClient::new(GeminiConfig {
            model: "  ".to_string(),
            ..GeminiConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, AnalyzeError::Config(_)));
    }

    #[test]
    fn extracts_first_candidate_first_part() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"first"},{"text":"second"}]}},
            {"content":{"parts":[{"text":"other"}]}}
        ]}"#;
        assert_eq!(extract_text(body).unwrap(), "first");
    }

    #[test]
    fn missing_paths_are_malformed() {
        for body in [
            r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{}}]}}]}"#,
            "<html>oops</html>",
        ] {
            let err = extract_text(body).unwrap_err();
            assert!(
                matches!(err, AnalyzeError::MalformedResponse { .. }),
                "{body} -> {err:?}"
            );
        }
    }

    #[test]
    fn excerpt_is_bounded_on_char_boundary() {
        let long = "博".repeat(EXCERPT_LIMIT + 10);
        let e = excerpt(&long);
        assert_eq!(e.chars().count(), EXCERPT_LIMIT + 1);
        assert!(e.ends_with('…'));
        assert_eq!(excerpt(" short "), "short");
    }

    #[tokio::test]
    async fn validation_runs_before_any_io() {
        // port 1 is never listening; a request would surface as a transport failure
        let c = client();
        let err = c.analyze("story", OutputLanguage::English, "  ").await.unwrap_err();
        assert!(matches!(err, AnalyzeError::MissingCredential));

        let err = c.analyze(" \n ", OutputLanguage::Chinese, "key").await.unwrap_err();
        assert!(matches!(err, AnalyzeError::MissingNarrative));

        let err = c.analyze("", OutputLanguage::English, "").await.unwrap_err();
        assert!(matches!(err, AnalyzeError::MissingCredential));
    }
}
