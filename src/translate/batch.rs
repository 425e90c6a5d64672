use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use tracing::{debug, error, info};

use super::chunk::{chunk_texts, DELIMITER};
use super::TranslationService;
use crate::config::TranslateConfig;
use crate::error::{DualsubError, Result};
use crate::subtitle::SubtitleTrack;

/// Translates a whole subtitle track with as few service calls as the
/// input limit allows, keeping one translated text per cue.
pub struct SubtitleTranslator {
    service: Box<dyn TranslationService>,
    source_language: String,
    target_language: String,
    strip_cue_tags: bool,
    cue_tag_regex: Regex,
}

impl SubtitleTranslator {
    pub fn new(service: Box<dyn TranslationService>, config: &TranslateConfig) -> Self {
        let cue_tag_regex = Regex::new(r"<[^>]*>").expect("Valid cue tag regex");

        Self {
            service,
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            strip_cue_tags: config.strip_cue_tags,
            cue_tag_regex,
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Clean a cue text before it is sent for translation
    pub fn prepare_text(&self, text: &str) -> String {
        let text = text.replace("&nbsp;", "").replace('\u{a0}', " ");

        if !self.strip_cue_tags {
            return text.trim().to_string();
        }

        text.lines()
            .map(|line| self.cue_tag_regex.replace_all(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Translate `texts`, returning exactly one translation per input, in order.
    /// Empty texts are not sent and stay empty.
    pub async fn translate_texts<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>> {
        let prepared: Vec<String> = texts.iter().map(|t| self.prepare_text(t.as_ref())).collect();

        if let Some(index) = prepared.iter().position(|t| t.contains(DELIMITER)) {
            return Err(DualsubError::DelimiterCollision { index });
        }

        let pending: Vec<usize> = (0..prepared.len())
            .filter(|&i| !prepared[i].is_empty())
            .collect();
        let sources: Vec<&str> = pending.iter().map(|&i| prepared[i].as_str()).collect();

        info!(
            "Translating {} cues ({} -> {}), {} character limit per request",
            sources.len(),
            self.source_language,
            self.target_language,
            self.service.input_limit()
        );

        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cues")
                .expect("Valid progress template")
                .progress_chars("#>-"),
        );

        let mut translated: Vec<String> = Vec::with_capacity(sources.len());
        for (chunk_idx, chunk) in chunk_texts(&sources, self.service.input_limit()).enumerate() {
            let batch = chunk.join(DELIMITER);
            debug!(
                "Chunk {}: {} cues, {} characters",
                chunk_idx,
                chunk.len(),
                batch.chars().count()
            );

            let response = self
                .service
                .translate_text(&batch, &self.source_language, &self.target_language)
                .await?;

            let pieces: Vec<String> = response
                .split(DELIMITER)
                .map(|piece| piece.trim().to_string())
                .collect();

            if pieces.len() != chunk.len() {
                error!(
                    "Chunk {} came back with {} pieces instead of {}",
                    chunk_idx,
                    pieces.len(),
                    chunk.len()
                );
                pb.abandon();
                return Err(DualsubError::CountMismatch {
                    chunk: Some(chunk_idx),
                    expected: chunk.len(),
                    actual: pieces.len(),
                });
            }

            translated.extend(pieces);
            pb.inc(chunk.len() as u64);
        }
        pb.finish_and_clear();

        if translated.len() != sources.len() {
            return Err(DualsubError::CountMismatch {
                chunk: None,
                expected: sources.len(),
                actual: translated.len(),
            });
        }

        let mut output = vec![String::new(); prepared.len()];
        for (index, text) in pending.into_iter().zip(translated) {
            output[index] = text;
        }
        Ok(output)
    }

    /// Replace every cue's text with its translation, keeping timing and order
    pub async fn translate_track(&self, track: &mut SubtitleTrack) -> Result<()> {
        let texts = track.texts();
        let translated = self.translate_texts(&texts).await?;

        for (cue, text) in track.cues.iter_mut().zip(&translated) {
            cue.set_text(text);
        }
        track.set_language(&self.target_language);

        info!("Translated {} cues", track.len());
        Ok(())
    }
}
