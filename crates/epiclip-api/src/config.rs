//! API configuration.

use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Path to the library manifest JSON file
    pub library_path: PathBuf,
    /// Root directory of the precomputed frame store
    pub snapshot_dir: PathBuf,
    /// Maximum GIF clip span in milliseconds
    pub max_gif_span_ms: u64,
    /// Maximum WebM clip span in milliseconds
    pub max_webm_span_ms: u64,
    /// Whether GIF generation with burned-in subtitles is allowed
    pub gif_subtitles_enabled: bool,
    /// Kill a transcode after this many seconds
    pub transcode_timeout_secs: u64,
    /// Font family name forwarded to subtitle burn-in
    pub subtitle_font: Option<String>,
    /// Directory searched for subtitle fonts
    pub subtitle_fonts_dir: Option<PathBuf>,
    /// TTF/OTF file used for caller caption rendering
    pub caption_font_path: Option<PathBuf>,
    /// Caption font pixel size
    pub caption_font_size: f32,
    /// Maximum caption line width in characters
    pub caption_line_width: usize,
    /// JPEG quality for captioned frames
    pub jpeg_quality: u8,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            library_path: PathBuf::from("library.json"),
            snapshot_dir: PathBuf::from("snapshots"),
            max_gif_span_ms: 10_000,
            max_webm_span_ms: 20_000,
            gif_subtitles_enabled: false,
            transcode_timeout_secs: 60,
            subtitle_font: None,
            subtitle_fonts_dir: None,
            caption_font_path: None,
            caption_font_size: 28.0,
            caption_line_width: 25,
            jpeg_quality: 85,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            library_path: std::env::var("LIBRARY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.library_path),
            snapshot_dir: std::env::var("SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_dir),
            max_gif_span_ms: std::env::var("MAX_GIF_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(defaults.max_gif_span_ms),
            max_webm_span_ms: std::env::var("MAX_WEBM_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(defaults.max_webm_span_ms),
            gif_subtitles_enabled: std::env::var("GIF_SUBTITLES_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.gif_subtitles_enabled),
            transcode_timeout_secs: std::env::var("TRANSCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.transcode_timeout_secs),
            subtitle_font: std::env::var("SUBTITLE_FONT").ok(),
            subtitle_fonts_dir: std::env::var("SUBTITLE_FONTS_DIR").ok().map(PathBuf::from),
            caption_font_path: std::env::var("CAPTION_FONT_PATH").ok().map(PathBuf::from),
            caption_font_size: std::env::var("CAPTION_FONT_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.caption_font_size),
            caption_line_width: std::env::var("CAPTION_LINE_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.caption_line_width),
            jpeg_quality: std::env::var("JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jpeg_quality),
        }
    }
}
