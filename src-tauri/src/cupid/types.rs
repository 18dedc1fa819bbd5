use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Language the remote model is asked to answer in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLanguage {
    #[default]
    English,
    Chinese,
}

impl OutputLanguage {
    pub fn code(self) -> &'static str {
        match self {
            OutputLanguage::English => "en",
            OutputLanguage::Chinese => "zh",
        }
    }
}

/// An API token. Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let t = raw.trim();
        if t.is_empty() {
            None
        } else {
            Some(Self(t.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy: None,
        }
    }
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source; blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name).and_then(|v| {
                let t = v.trim().to_string();
                if t.is_empty() { None } else { Some(t) }
            })
        };

        let defaults = Self::default();

        let base_url = non_blank("CUPID_GEMINI_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let model = non_blank("CUPID_GEMINI_MODEL").unwrap_or(defaults.model);
        let timeout = non_blank("CUPID_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let proxy = non_blank("CUPID_PROXY");

        Self {
            base_url,
            model,
            timeout,
            proxy,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Please configure an API key first.")]
    MissingCredential,

    #[error("Please enter or select a story first.")]
    MissingNarrative,

    #[error("Error {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("Request failed: {description}")]
    TransportFailure { description: String },

    #[error("Unexpected response from the model: {reason} | body: {excerpt}")]
    MalformedResponse { reason: String, excerpt: String },

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl AnalyzeError {
    /// Short stable name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::MissingCredential => "missing_credential",
            AnalyzeError::MissingNarrative => "missing_narrative",
            AnalyzeError::RemoteRejected { .. } => "remote_rejected",
            AnalyzeError::TransportFailure { .. } => "transport_failure",
            AnalyzeError::MalformedResponse { .. } => "malformed_response",
            AnalyzeError::Config(_) => "config",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Single-turn request whose only content is `prompt`.
    pub fn single_turn(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn credential_debug_is_redacted() {
        let c = Credential::new("  sk-secret  ").unwrap();
        assert_eq!(c.expose(), "sk-secret");
        assert_eq!(format!("{:?}", c), "Credential(***)");
        assert!(Credential::new("   ").is_none());
    }

    #[test]
    fn config_defaults_when_env_is_empty() {
        let cfg = GeminiConfig::from_lookup(|_| None);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.proxy.is_none());
    }

    #[test]
    fn config_reads_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CUPID_GEMINI_BASE_URL", "http://127.0.0.1:9999/v1beta/"),
            ("CUPID_GEMINI_MODEL", "gemini-2.5-pro"),
            ("CUPID_TIMEOUT_SECS", "120"),
            ("CUPID_PROXY", "http://127.0.0.1:7890"),
        ]
        .into_iter()
        .collect();
        let cfg = GeminiConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.base_url, "http://127.0.0.1:9999/v1beta");
        assert_eq!(cfg.model, "gemini-2.5-pro");
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert_eq!(cfg.proxy.as_deref(), Some("http://127.0.0.1:7890"));
    }

    #[test]
    fn invalid_timeout_falls_back() {
        let cfg = GeminiConfig::from_lookup(|k| match k {
            "CUPID_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let cfg = GeminiConfig::from_lookup(|k| match k {
            "CUPID_TIMEOUT_SECS" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn request_body_has_single_part() {
        let body = serde_json::to_value(GenerateContentRequest::single_turn("hi".into())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "contents": [ { "parts": [ { "text": "hi" } ] } ] })
        );
    }

    #[test]
    fn remote_rejected_message_is_verbatim() {
        let e = AnalyzeError::RemoteRejected {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(e.to_string(), "Error 403: forbidden");
        assert_eq!(e.kind(), "remote_rejected");
    }
}
