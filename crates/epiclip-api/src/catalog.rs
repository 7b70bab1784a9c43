//! Library catalog construction.
//!
//! The manifest file is a JSON array of seasons pointing at media files
//! relative to the manifest location. Building the catalog probes every
//! video for its duration, parses subtitle tracks, and scans the frame
//! store, so it runs once at startup; the result is immutable.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use epiclip_media::probe_duration_ms;
use epiclip_models::{parse_srt, Episode, Library, Season, SeasonManifest};

use crate::snapshots::SnapshotStore;

/// Load the library manifest and build the full catalog.
pub async fn build_library(
    manifest_path: &Path,
    snapshots: &dyn SnapshotStore,
) -> anyhow::Result<Library> {
    let content = tokio::fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("reading manifest {}", manifest_path.display()))?;
    let manifest: Vec<SeasonManifest> =
        serde_json::from_str(&content).context("parsing library manifest")?;

    // Media paths are relative to the manifest file.
    let base = manifest_path.parent().unwrap_or(Path::new("."));

    let mut seasons = Vec::with_capacity(manifest.len());
    for season_manifest in manifest {
        seasons.push(build_season(base, season_manifest, snapshots).await?);
    }

    let episode_count: usize = seasons.iter().map(|s| s.episodes.len()).sum();
    info!(
        seasons = seasons.len(),
        episodes = episode_count,
        "Library catalog built"
    );

    Ok(Library { seasons })
}

async fn build_season(
    base: &Path,
    manifest: SeasonManifest,
    snapshots: &dyn SnapshotStore,
) -> anyhow::Result<Season> {
    let icon = match &manifest.season_icon {
        Some(rel) => match tokio::fs::read(base.join(rel)).await {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(season = %manifest.season_slug, icon = %rel, %err, "Season icon unreadable");
                None
            }
        },
        None => None,
    };

    let mut episodes = Vec::with_capacity(manifest.episodes.len());
    for episode_manifest in manifest.episodes {
        let video_path = base.join(&episode_manifest.video_file);
        let duration_ms = probe_duration_ms(&video_path).await.with_context(|| {
            format!(
                "probing {}/{}",
                manifest.season_slug, episode_manifest.episode_slug
            )
        })?;

        let mut episode = Episode::new(&episode_manifest.episode_slug, &video_path, duration_ms);
        episode.name = episode_manifest.episode_name.clone();

        if let Some(rel) = &episode_manifest.subtitle_file {
            let subtitles_path = base.join(rel);
            let content = tokio::fs::read_to_string(&subtitles_path)
                .await
                .with_context(|| format!("reading subtitles {}", subtitles_path.display()))?;
            episode.subtitles = parse_srt(&content);
            episode.subtitles_path = Some(subtitles_path);
        }

        episode.snapshot_instants = snapshots
            .list_instants(&manifest.season_slug, &episode.slug)
            .await
            .map_err(|err| anyhow::anyhow!("scanning frame store: {err}"))?;

        info!(
            season = %manifest.season_slug,
            episode = %episode.slug,
            duration_ms,
            cues = episode.subtitles.len(),
            frames = episode.snapshot_instants.len(),
            "Episode loaded"
        );
        episodes.push(episode);
    }

    Ok(Season {
        slug: manifest.season_slug,
        name: manifest.season_name,
        icon,
        episodes,
    })
}
