use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::TranslationService;
use crate::config::TranslateConfig;
use crate::error::{DualsubError, Result};

/// Google Translate web endpoint (`client=gtx`)
pub struct GoogleTranslator {
    client: Client,
    config: TranslateConfig,
}

impl GoogleTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("dualsub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    fn request_url(&self) -> String {
        format!("{}/translate_a/single", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl TranslationService for GoogleTranslator {
    fn input_limit(&self) -> usize {
        self.config.input_limit
    }

    async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let url = self.request_url();
        let interface_language = self.config.region.to_lowercase();

        debug!(
            "Sending {} characters to {} ({} -> {})",
            text.chars().count(),
            url,
            source_language,
            target_language
        );

        let response = self
            .client
            .post(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source_language),
                ("tl", target_language),
                ("hl", interface_language.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await
            .map_err(|e| DualsubError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DualsubError::Translation(format!(
                "Translation endpoint error {}: {}",
                status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DualsubError::Translation(format!("Failed to parse response: {}", e)))?;

        parse_translation_response(&body)
    }
}

/// Concatenate the translated segments of a `translate_a/single` response.
///
/// The body is a nested array; its first element lists one
/// `[translated, original, ...]` entry per sentence.
pub fn parse_translation_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| DualsubError::Translation("Unexpected response shape".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(text) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(text);
        }
    }

    if translated.is_empty() && !segments.is_empty() {
        return Err(DualsubError::Translation("Empty translation received".to_string()));
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config_for(endpoint: &str) -> TranslateConfig {
        let mut config = crate::config::Config::default().translate;
        config.endpoint = endpoint.to_string();
        config
    }

    #[test]
    fn test_parse_joins_segments() {
        let body = json!([
            [
                ["Hello\n\n\n", "Bonjour\n\n\n", null, null, 10],
                ["Goodbye", "Au revoir", null, null, 10]
            ],
            null,
            "fr"
        ]);

        assert_eq!(parse_translation_response(&body).unwrap(), "Hello\n\n\nGoodbye");
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        let body = json!({"error": "quota"});
        assert!(matches!(
            parse_translation_response(&body),
            Err(DualsubError::Translation(_))
        ));
    }

    #[test]
    fn test_input_limit_comes_from_config() {
        let mut config = config_for("http://localhost");
        config.input_limit = 1234;
        let translator = GoogleTranslator::new(config).unwrap();
        assert_eq!(translator.input_limit(), 1234);
    }

    #[tokio::test]
    async fn test_translate_text_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/translate_a/single")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client".into(), "gtx".into()),
                Matcher::UrlEncoded("sl".into(), "fr".into()),
                Matcher::UrlEncoded("tl".into(), "en".into()),
                Matcher::UrlEncoded("hl".into(), "en".into()),
            ]))
            .match_body(Matcher::UrlEncoded("q".into(), "Bonjour\n\n\nAu revoir".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[[["Hello\n\n\nGoodbye","Bonjour\n\n\nAu revoir",null,null,10]],null,"fr"]"#)
            .create_async()
            .await;

        let translator = GoogleTranslator::new(config_for(&server.url())).unwrap();
        let result = translator
            .translate_text("Bonjour\n\n\nAu revoir", "fr", "en")
            .await
            .unwrap();

        assert_eq!(result, "Hello\n\n\nGoodbye");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_translation_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/translate_a/single")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let translator = GoogleTranslator::new(config_for(&server.url())).unwrap();
        let err = translator.translate_text("Bonjour", "fr", "en").await.unwrap_err();

        assert!(matches!(err, DualsubError::Translation(msg) if msg.contains("429")));
    }
}
