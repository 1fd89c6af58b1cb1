use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Lang;
use crate::error::{Error, Result};
use super::traits::{Translator, TranslatorInfo};

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// How much of an error body is kept in the error message
const ERROR_BODY_PREVIEW: usize = 200;

/// LibreTranslate-compatible API translator.
///
/// Issues one `POST {api_base}/translate` per call. There is no retry: a
/// failed request is reported to the caller as-is.
pub struct LibreTranslator {
    client: Client,
    /// Base URL for the API (e.g., "https://libretranslate.example.com")
    pub api_base: String,
    /// API key sent with every request
    pub api_key: String,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    api_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslator {
    /// Create a translator with a wall-clock timeout per request.
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::TranslationRequest(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate", self.api_base.trim_end_matches('/'))
    }

    async fn request(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
        let url = self.endpoint();
        debug!("Translation request ({} chars) to {}", text.chars().count(), url);

        let body = TranslateRequest {
            q: text,
            source: source.as_str(),
            target: target.as_str(),
            format: "text",
            api_key: &self.api_key,
        };

        let response = self.client.post(&url).form(&body).send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            if e.is_timeout() {
                Error::TranslationTimeout
            } else {
                Error::TranslationRequest(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            warn!("API error: {} - {}", status, preview);
            return Err(Error::TranslationRequest(format!("HTTP {status}: {preview}")));
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse response: {}", e);
            if e.is_timeout() {
                Error::TranslationTimeout
            } else {
                Error::TranslationInvalidResponse(e.to_string())
            }
        })?;

        Ok(parsed.translated_text)
    }
}

#[async_trait]
impl Translator for LibreTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo { name: "LibreTranslate" }
    }

    async fn translate(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
        // Nothing to send for blank text
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        self.request(text, source, target).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn translator(base: &str) -> LibreTranslator {
        LibreTranslator::new(base, "secret", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(translator("http://lt.local/").endpoint(), "http://lt.local/translate");
        assert_eq!(translator("http://lt.local").endpoint(), "http://lt.local/translate");
    }

    #[test]
    fn test_response_requires_translated_text() {
        let ok: TranslateResponse = serde_json::from_str(r#"{"translatedText":"Hello"}"#).unwrap();
        assert_eq!(ok.translated_text, "Hello");

        let missing = serde_json::from_str::<TranslateResponse>(r#"{"error":"bad"}"#);
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_blank_text_skips_request() {
        // Unroutable base URL: any request would fail
        let t = translator("http://127.0.0.1:9");
        let out = t.translate("   ", &Lang::new("es"), &Lang::new("en")).await.unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        let t = translator("http://127.0.0.1:9");
        let err = t.translate("Hola", &Lang::new("es"), &Lang::new("en")).await.unwrap_err();
        assert!(err.is_translation(), "unexpected error: {err}");
    }
}
