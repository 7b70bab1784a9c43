//! Season/episode catalog types.
//!
//! The catalog is built once at startup and held immutably for the
//! process lifetime. A rebuild replaces the whole [`Library`], never
//! mutates it in place.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::subtitle::SubtitleCue;

/// The full episode catalog.
#[derive(Debug, Default)]
pub struct Library {
    pub seasons: Vec<Season>,
}

impl Library {
    /// Look up a season by slug. First match wins; slugs are assumed
    /// unique within the library.
    pub fn find_season(&self, slug: &str) -> Option<&Season> {
        self.seasons.iter().find(|s| s.slug == slug)
    }

    /// Resolve an episode by `(season slug, episode slug)`.
    pub fn resolve(&self, season_slug: &str, episode_slug: &str) -> Option<&Episode> {
        self.find_season(season_slug)?.find_episode(episode_slug)
    }
}

/// A season: an ordered collection of episodes.
#[derive(Debug)]
pub struct Season {
    pub slug: String,
    pub name: Option<String>,
    /// Raw icon image bytes, if the manifest pointed at one.
    pub icon: Option<Vec<u8>>,
    pub episodes: Vec<Episode>,
}

impl Season {
    pub fn find_episode(&self, slug: &str) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.slug == slug)
    }
}

/// A single episode with its media handles and derived metadata.
#[derive(Debug)]
pub struct Episode {
    pub slug: String,
    pub name: Option<String>,
    pub video_path: PathBuf,
    pub subtitles_path: Option<PathBuf>,
    /// Total duration, probed once from the video source at catalog
    /// build time.
    pub duration_ms: u64,
    /// Millisecond offsets with a precomputed stored frame. Always a
    /// subset of `[0, duration_ms]`.
    pub snapshot_instants: BTreeSet<u64>,
    /// Parsed subtitle cues in cue-index order. Empty when the episode
    /// has no subtitle track.
    pub subtitles: Vec<SubtitleCue>,
}

impl Episode {
    pub fn new(slug: impl Into<String>, video_path: impl AsRef<Path>, duration_ms: u64) -> Self {
        Self {
            slug: slug.into(),
            name: None,
            video_path: video_path.as_ref().to_path_buf(),
            subtitles_path: None,
            duration_ms,
            snapshot_instants: BTreeSet::new(),
            subtitles: Vec::new(),
        }
    }

    /// Whether a frame was precomputed for this instant.
    pub fn has_snapshot(&self, ms: u64) -> bool {
        self.snapshot_instants.contains(&ms)
    }
}

/// Season entry in the library manifest file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonManifest {
    pub season_slug: String,
    #[serde(default)]
    pub season_name: Option<String>,
    /// Icon path, relative to the manifest file.
    #[serde(default)]
    pub season_icon: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeManifest>,
}

/// Episode entry in the library manifest file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeManifest {
    pub episode_slug: String,
    #[serde(default)]
    pub episode_name: Option<String>,
    /// Video path, relative to the manifest file.
    pub video_file: String,
    /// Subtitle track path, relative to the manifest file.
    #[serde(default)]
    pub subtitle_file: Option<String>,
}
