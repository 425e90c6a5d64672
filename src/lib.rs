//! dualsub - Watch foreign-language videos with dual subtitles
//!
//! Downloads a video and its foreign subtitles with yt-dlp, translates the
//! subtitles in size-bounded batches, and plays the result in mpv with the
//! original and translated tracks shown together.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod translate;
pub mod subtitle;
pub mod media;
pub mod library;
pub mod error;
