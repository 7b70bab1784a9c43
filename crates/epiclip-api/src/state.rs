//! Shared application state.

use std::sync::Arc;

use tracing::warn;

use epiclip_media::{
    CaptionFont, CaptionStyle, FfmpegTranscoder, FontOptions, TranscodeConfig, Transcoder,
};
use epiclip_models::Library;

use crate::catalog::build_library;
use crate::config::ApiConfig;
use crate::snapshots::{FsSnapshotStore, SnapshotStore};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub library: Arc<Library>,
    pub transcoder: Arc<dyn Transcoder>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub caption_style: Arc<CaptionStyle>,
}

impl AppState {
    /// Build production state: load the catalog, wire up the system
    /// ffmpeg transcoder and the on-disk frame store.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let snapshots = FsSnapshotStore::new(&config.snapshot_dir);
        let library = build_library(&config.library_path, &snapshots).await?;

        let transcode_config = TranscodeConfig {
            timeout_secs: config.transcode_timeout_secs,
            fonts: FontOptions {
                font: config.subtitle_font.clone(),
                fonts_dir: config.subtitle_fonts_dir.clone(),
            },
            ..TranscodeConfig::default()
        };

        let caption_font = match &config.caption_font_path {
            Some(path) => match CaptionFont::load(path, config.caption_font_size) {
                Ok(font) => Some(font),
                Err(err) => {
                    warn!(%err, "Caption font unavailable, serving frames without captions");
                    None
                }
            },
            None => None,
        };
        let caption_style =
            CaptionStyle::new(caption_font, config.caption_line_width, config.jpeg_quality);

        Ok(Self {
            config: Arc::new(config),
            library: Arc::new(library),
            transcoder: Arc::new(FfmpegTranscoder::new(transcode_config)),
            snapshots: Arc::new(snapshots),
            caption_style: Arc::new(caption_style),
        })
    }

    /// Assemble state from pre-built parts. Used by tests to inject a
    /// fixed library and mock transcoder.
    pub fn with_parts(
        config: ApiConfig,
        library: Library,
        transcoder: Arc<dyn Transcoder>,
        snapshots: Arc<dyn SnapshotStore>,
        caption_style: CaptionStyle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            library: Arc::new(library),
            transcoder,
            snapshots,
            caption_style: Arc::new(caption_style),
        }
    }
}
