//! Shared data models for the clip service.
//!
//! This crate provides the pure, I/O-free core:
//! - Timecode parsing and formatting
//! - Time range validation and clamping policy
//! - Season/episode catalog types and slug resolution
//! - Caption truncation and word wrapping
//! - SRT subtitle cue parsing

pub mod caption;
pub mod library;
pub mod range;
pub mod subtitle;
pub mod timecode;

// Re-export common types
pub use caption::{wrap_caption, CaptionRequest};
pub use library::{Episode, EpisodeManifest, Library, Season, SeasonManifest};
pub use range::{
    clamp_end, validate_against_snapshots, validate_instant, validate_range, RangeError, TimeRange,
};
pub use subtitle::{parse_srt, SubtitleCue, SubtitleExport};
pub use timecode::{format_timecode, parse_timecode, TimecodeError};
