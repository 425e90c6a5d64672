// Subtitle translation
//
// - chunk: groups cue texts under the service's character limit
// - batch: translates a whole track chunk by chunk and reassembles it
// - google: HTTP client for the Google Translate web endpoint

pub mod batch;
pub mod chunk;
pub mod google;

use async_trait::async_trait;

pub use batch::SubtitleTranslator;
pub use chunk::{chunk_texts, Chunks, DELIMITER};
pub use google::GoogleTranslator;

use crate::config::TranslateConfig;
use crate::error::Result;

/// A machine translation backend with a bounded input size per call
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Maximum number of characters accepted by one `translate_text` call
    fn input_limit(&self) -> usize;

    /// Translate `text` from `source_language` to `target_language`
    async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the default translation backend
    pub fn create_service(config: &TranslateConfig) -> Result<Box<dyn TranslationService>> {
        Ok(Box::new(GoogleTranslator::new(config.clone())?))
    }

    /// Create a subtitle translator backed by the default service
    pub fn create_translator(config: &TranslateConfig) -> Result<SubtitleTranslator> {
        let service = Self::create_service(config)?;
        Ok(SubtitleTranslator::new(service, config))
    }
}
