use std::path::Path;
use std::time::Duration;

use regex::Regex;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{DualsubError, Result};

/// A single timed subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub identifier: Option<String>,
    pub start: Duration,
    pub end: Duration,
    /// Cue settings following the timing, e.g. `align:start position:0%`
    pub settings: Option<String>,
    pub lines: Vec<String>,
}

impl Cue {
    pub fn new<S: Into<String>>(start: Duration, end: Duration, text: S) -> Self {
        let mut cue = Self {
            identifier: None,
            start,
            end,
            settings: None,
            lines: Vec::new(),
        };
        let text: String = text.into();
        cue.set_text(&text);
        cue
    }

    /// Cue text with lines joined by `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the text, keeping timing and settings
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.lines().map(|l| l.to_string()).collect();
    }
}

/// An ordered WebVTT track
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleTrack {
    /// `WEBVTT` line plus any header metadata lines (Kind:, Language:, ...)
    pub header: Vec<String>,
    pub cues: Vec<Cue>,
}

impl SubtitleTrack {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self {
            header: vec!["WEBVTT".to_string()],
            cues,
        }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn texts(&self) -> Vec<String> {
        self.cues.iter().map(|c| c.text()).collect()
    }

    /// Rewrite the `Language:` header line, if there is one
    pub fn set_language(&mut self, language: &str) {
        for line in self.header.iter_mut().filter(|l| l.starts_with("Language:")) {
            *line = format!("Language: {}", language);
        }
    }

    /// Read and parse a WebVTT file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading subtitles: {}", path.display());

        let content = fs::read_to_string(path).await?;
        let track = VttParser::new().parse(&content)?;

        info!("Parsed {} cues from {}", track.len(), path.display());
        Ok(track)
    }

    /// Serialize the track to WebVTT, overwriting `path`
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Writing {} cues to {}", self.len(), path.display());

        fs::write(path, self.to_vtt()).await?;
        Ok(())
    }

    pub fn to_vtt(&self) -> String {
        let mut out = String::new();

        if self.header.is_empty() {
            out.push_str("WEBVTT\n");
        } else {
            for line in &self.header {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('\n');

        for cue in &self.cues {
            if let Some(id) = &cue.identifier {
                out.push_str(id);
                out.push('\n');
            }
            out.push_str(&format!(
                "{} --> {}",
                format_vtt_time(cue.start),
                format_vtt_time(cue.end)
            ));
            if let Some(settings) = &cue.settings {
                out.push(' ');
                out.push_str(settings);
            }
            out.push('\n');
            for line in &cue.lines {
                // An empty line would terminate the cue early.
                if !line.is_empty() {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            out.push('\n');
        }

        out
    }
}

/// WebVTT parser
pub struct VttParser {
    timing_regex: Regex,
}

impl Default for VttParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VttParser {
    pub fn new() -> Self {
        // Hours are optional in WebVTT timestamps.
        let timing_regex = Regex::new(
            r"^(?:(\d{2,}):)?(\d{2}):(\d{2})\.(\d{3})\s+-->\s+(?:(\d{2,}):)?(\d{2}):(\d{2})\.(\d{3})(?:\s+(.*))?$",
        )
        .expect("Valid VTT timing regex");

        Self { timing_regex }
    }

    pub fn parse(&self, content: &str) -> Result<SubtitleTrack> {
        let content = content.trim_start_matches('\u{feff}');
        // Only a truly empty line ends a block; whitespace-only lines are cue text.
        let lines: Vec<&str> = content.lines().map(|l| l.trim_end_matches('\r')).collect();

        if !lines.first().is_some_and(|l| l.trim_end().starts_with("WEBVTT")) {
            return Err(DualsubError::SubtitleParse("missing WEBVTT header".to_string()));
        }

        let mut i = 0;
        let mut header = Vec::new();
        while i < lines.len() && !lines[i].is_empty() {
            header.push(lines[i].trim_end().to_string());
            i += 1;
        }

        let mut cues = Vec::new();
        while i < lines.len() {
            // Gather one block
            while i < lines.len() && lines[i].is_empty() {
                i += 1;
            }
            let mut block = Vec::new();
            while i < lines.len() && !lines[i].is_empty() {
                block.push(lines[i]);
                i += 1;
            }
            if block.is_empty() {
                break;
            }
            if let Some(cue) = self.parse_block(&block)? {
                cues.push(cue);
            }
        }

        debug!("Parsed header {:?} with {} cues", header, cues.len());
        Ok(SubtitleTrack { header, cues })
    }

    fn parse_block(&self, block: &[&str]) -> Result<Option<Cue>> {
        let first = block[0].trim_end();
        if first.starts_with("NOTE") || first == "STYLE" || first == "REGION" {
            return Ok(None);
        }

        let (identifier, timing_idx) = if first.contains("-->") {
            (None, 0)
        } else {
            (Some(first.to_string()), 1)
        };

        let timing = block.get(timing_idx).ok_or_else(|| {
            DualsubError::SubtitleParse(format!("cue '{}' has no timing line", first))
        })?;
        let captures = self
            .timing_regex
            .captures(timing.trim())
            .ok_or_else(|| DualsubError::SubtitleParse(format!("invalid timing line '{}'", timing)))?;

        let start = parse_vtt_time(&captures, 1)?;
        let end = parse_vtt_time(&captures, 5)?;
        let settings = captures
            .get(9)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Some(Cue {
            identifier,
            start,
            end,
            settings,
            lines: block[timing_idx + 1..].iter().map(|l| l.to_string()).collect(),
        }))
    }
}

fn parse_vtt_time(captures: &regex::Captures, start_group: usize) -> Result<Duration> {
    let field = |offset: usize| -> Result<u64> {
        match captures.get(start_group + offset) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| DualsubError::SubtitleParse(format!("invalid timestamp field '{}'", m.as_str()))),
            None => Ok(0),
        }
    };

    let hours = field(0)?;
    let minutes = field(1)?;
    let seconds = field(2)?;
    let millis = field(3)?;

    Ok(Duration::from_millis(
        hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis,
    ))
}

/// Format a duration as a WebVTT timestamp (HH:MM:SS.mmm)
fn format_vtt_time(duration: Duration) -> String {
    let total_milliseconds = duration.as_millis() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
