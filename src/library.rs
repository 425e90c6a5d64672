use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibraryConfig;
use crate::error::{DualsubError, Result};

/// Per-video folder holding the video and both subtitle files
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDirectory {
    root: PathBuf,
}

impl AssetDirectory {
    /// Create (or reuse) `<base_dir>/<videos_dir>/<title>/`
    pub async fn create(base_dir: &Path, config: &LibraryConfig, title: &str) -> Result<Self> {
        let root = base_dir.join(&config.videos_dir).join(sanitize_title(title));
        fs::create_dir_all(&root).await?;

        info!("Video directory: {}", root.display());
        Ok(Self { root })
    }

    /// Use an existing directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(DualsubError::Config(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Final location of the subtitles for `language`, e.g. `fr.vtt`
    pub fn subtitle_path(&self, language: &str) -> PathBuf {
        self.root.join(format!("{}.vtt", language))
    }

    /// Existing final subtitle file for `language`
    pub fn existing_subtitle(&self, language: &str) -> Result<PathBuf> {
        let path = self.subtitle_path(language);
        if path.is_file() {
            Ok(path)
        } else {
            Err(DualsubError::MissingFile {
                dir: self.root.clone(),
                pattern: format!("{}.vtt", language),
            })
        }
    }

    /// The subtitle file written by the downloader, e.g. `Title [id].fr.vtt`
    pub fn downloaded_subtitle(&self, language: &str, format: &str) -> Result<PathBuf> {
        let suffix = format!(".{}.{}", language, format);
        self.find_single(&format!("*{}", suffix), |name| {
            name.ends_with(&suffix) && name.len() > suffix.len()
        })
    }

    /// The single video file in the directory
    pub fn video_file(&self, extensions: &[String]) -> Result<PathBuf> {
        let pattern = format!("*.{{{}}}", extensions.join(","));
        self.find_single(&pattern, |name| {
            Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
        })
    }

    fn find_single<F: Fn(&str) -> bool>(&self, pattern: &str, matches: F) -> Result<PathBuf> {
        let found: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_str().is_some_and(|n| matches(n)))
            .map(|e| e.into_path())
            .collect();

        debug!("{} matches for '{}' in {}", found.len(), pattern, self.root.display());

        match found.as_slice() {
            [single] => Ok(single.clone()),
            [] => Err(DualsubError::MissingFile {
                dir: self.root.clone(),
                pattern: pattern.to_string(),
            }),
            many => Err(DualsubError::AmbiguousFile {
                dir: self.root.clone(),
                pattern: pattern.to_string(),
                count: many.len(),
            }),
        }
    }
}

/// Make a video title usable as a single directory name
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim().trim_matches('.').trim();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}
