use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DualsubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("No file matching '{pattern}' in {}", .dir.display())]
    MissingFile { dir: PathBuf, pattern: String },

    #[error("Expected exactly one file matching '{pattern}' in {}, found {count}", .dir.display())]
    AmbiguousFile {
        dir: PathBuf,
        pattern: String,
        count: usize,
    },

    #[error("Subtitle parsing error: {0}")]
    SubtitleParse(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Translation returned {actual} cues, expected {expected}{}", .chunk.map(|c| format!(" (chunk {})", c)).unwrap_or_default())]
    CountMismatch {
        /// Failing chunk, `None` when the whole track's total is off
        chunk: Option<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("Cue {index} contains the chunk delimiter")]
    DelimiterCollision { index: usize },

    #[error("Player error: {0}")]
    Player(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DualsubError {
    /// True for errors raised when a translated batch cannot be mapped back onto its cues
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            Self::CountMismatch { .. } | Self::DelimiterCollision { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DualsubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_errors_are_distinguishable() {
        let mismatch = DualsubError::CountMismatch {
            chunk: Some(4),
            expected: 3,
            actual: 2,
        };
        assert!(mismatch.is_integrity_error());
        assert_eq!(
            mismatch.to_string(),
            "Translation returned 2 cues, expected 3 (chunk 4)"
        );

        let total = DualsubError::CountMismatch {
            chunk: None,
            expected: 10,
            actual: 9,
        };
        assert_eq!(total.to_string(), "Translation returned 9 cues, expected 10");

        assert!(DualsubError::DelimiterCollision { index: 1 }.is_integrity_error());
        assert!(!DualsubError::Translation("quota".to_string()).is_integrity_error());
    }

    #[test]
    fn test_file_lookup_messages() {
        let err = DualsubError::AmbiguousFile {
            dir: PathBuf::from("videos/clip"),
            pattern: "*.fr.vtt".to_string(),
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "Expected exactly one file matching '*.fr.vtt' in videos/clip, found 2"
        );
    }
}
