//! Artifact generation via FFmpeg.
//!
//! The [`Transcoder`] trait is the seam between the HTTP layer and the
//! external tool: handlers validate first, then call exactly one
//! operation, and any tool failure is fatal for that request. The trait
//! is mockable so route logic can be tested without a real binary.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use epiclip_models::TimeRange;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Subtitle rendering font configuration.
///
/// Forwarding is soft: a configured font is passed to the tool, the
/// fonts directory only together with a font, and nothing configured
/// falls back to the tool's own defaults. Never an error.
#[derive(Debug, Clone, Default)]
pub struct FontOptions {
    /// Font family name for subtitle rendering.
    pub font: Option<String>,
    /// Directory searched for font files.
    pub fonts_dir: Option<PathBuf>,
}

impl FontOptions {
    /// Build the `subtitles=` filter for burning a track into frames.
    fn subtitle_filter(&self, subtitles: &Path) -> String {
        let mut filter = format!(
            "subtitles={}",
            escape_filter_value(&subtitles.to_string_lossy())
        );
        if let Some(ref font) = self.font {
            if let Some(ref dir) = self.fonts_dir {
                filter.push_str(&format!(
                    ":fontsdir={}",
                    escape_filter_value(&dir.to_string_lossy())
                ));
            }
            filter.push_str(&format!(
                ":force_style={}",
                escape_filter_value(&format!("FontName={}", font))
            ));
        }
        filter
    }
}

/// Escape a value for use inside an FFmpeg filter graph.
fn escape_filter_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':' | ',' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Fixed encoding policy for generated artifacts.
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    /// GIF frame rate.
    pub gif_fps: u32,
    /// GIF vertical resolution (short edge).
    pub gif_vres: u32,
    /// WebM constant-rate factor.
    pub webm_crf: u8,
    /// JPEG quality scale for snapshots (`-q:v`, lower is better).
    pub snapshot_quality: u8,
    /// Kill a transcode after this many seconds.
    pub timeout_secs: u64,
    /// Subtitle rendering fonts.
    pub fonts: FontOptions,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            gif_fps: 15,
            gif_vres: 360,
            webm_crf: 33,
            snapshot_quality: 2,
            timeout_secs: 60,
            fonts: FontOptions::default(),
        }
    }
}

/// Produces clip artifacts from episode sources.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Single JPEG frame at an instant.
    async fn snapshot(&self, video: &Path, ms: u64) -> MediaResult<Vec<u8>>;

    /// Single JPEG frame with the subtitle track burned in.
    async fn snapshot_with_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        ms: u64,
    ) -> MediaResult<Vec<u8>>;

    /// Animated GIF over `[start, end)`.
    async fn gif(&self, video: &Path, range: TimeRange) -> MediaResult<Vec<u8>>;

    /// Animated GIF with the subtitle track burned in.
    async fn gif_with_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        range: TimeRange,
    ) -> MediaResult<Vec<u8>>;

    /// WebM clip over `[start, end)` at source resolution.
    async fn webm(&self, video: &Path, range: TimeRange) -> MediaResult<Vec<u8>>;

    /// WebM clip with the subtitle track burned in.
    async fn webm_with_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        range: TimeRange,
    ) -> MediaResult<Vec<u8>>;
}

/// [`Transcoder`] backed by the system `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    config: TranscodeConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }

    fn runner(&self) -> FfmpegRunner {
        FfmpegRunner::new().with_timeout(self.config.timeout_secs)
    }

    fn gif_filter(&self) -> String {
        format!(
            "fps={},scale=-2:{}:flags=lanczos",
            self.config.gif_fps, self.config.gif_vres
        )
    }

    async fn run_to_bytes(&self, cmd: &FfmpegCommand, output: &Path) -> MediaResult<Vec<u8>> {
        self.runner().run(cmd).await?;
        Ok(tokio::fs::read(output).await?)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn snapshot(&self, video: &Path, ms: u64) -> MediaResult<Vec<u8>> {
        info!(video = %video.display(), ms, "Generating snapshot");
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("snapshot.jpg");

        let cmd = FfmpegCommand::new(video, &out)
            .seek(ms as f64 / 1000.0)
            .single_frame()
            .output_arg("-q:v")
            .output_arg(self.config.snapshot_quality.to_string());

        self.run_to_bytes(&cmd, &out).await
    }

    async fn snapshot_with_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        ms: u64,
    ) -> MediaResult<Vec<u8>> {
        info!(video = %video.display(), ms, "Generating snapshot with subtitles");
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("snapshot.jpg");

        // Output-side seek keeps input timestamps intact so the
        // subtitles filter picks the cue for the requested instant.
        let cmd = FfmpegCommand::new(video, &out)
            .video_filter(self.config.fonts.subtitle_filter(subtitles))
            .output_seek(ms as f64 / 1000.0)
            .single_frame()
            .output_arg("-q:v")
            .output_arg(self.config.snapshot_quality.to_string());

        self.run_to_bytes(&cmd, &out).await
    }

    async fn gif(&self, video: &Path, range: TimeRange) -> MediaResult<Vec<u8>> {
        info!(video = %video.display(), start_ms = range.start_ms, end_ms = range.end_ms, "Generating gif");
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("clip.gif");

        let cmd = FfmpegCommand::new(video, &out)
            .seek(range.start_ms as f64 / 1000.0)
            .duration(range.span_ms() as f64 / 1000.0)
            .video_filter(self.gif_filter())
            .no_audio();

        self.run_to_bytes(&cmd, &out).await
    }

    async fn gif_with_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        range: TimeRange,
    ) -> MediaResult<Vec<u8>> {
        info!(video = %video.display(), start_ms = range.start_ms, end_ms = range.end_ms, "Generating gif with subtitles");
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("clip.gif");

        let filter = format!(
            "{},{}",
            self.config.fonts.subtitle_filter(subtitles),
            self.gif_filter()
        );
        let cmd = FfmpegCommand::new(video, &out)
            .video_filter(filter)
            .output_seek(range.start_ms as f64 / 1000.0)
            .duration(range.span_ms() as f64 / 1000.0)
            .no_audio();

        self.run_to_bytes(&cmd, &out).await
    }

    async fn webm(&self, video: &Path, range: TimeRange) -> MediaResult<Vec<u8>> {
        info!(video = %video.display(), start_ms = range.start_ms, end_ms = range.end_ms, "Generating webm");
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("clip.webm");

        let cmd = FfmpegCommand::new(video, &out)
            .seek(range.start_ms as f64 / 1000.0)
            .duration(range.span_ms() as f64 / 1000.0)
            .video_codec("libvpx-vp9")
            .crf(self.config.webm_crf)
            .output_arg("-b:v")
            .output_arg("0")
            .audio_codec("libopus");

        self.run_to_bytes(&cmd, &out).await
    }

    async fn webm_with_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        range: TimeRange,
    ) -> MediaResult<Vec<u8>> {
        info!(video = %video.display(), start_ms = range.start_ms, end_ms = range.end_ms, "Generating webm with subtitles");
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("clip.webm");

        let cmd = FfmpegCommand::new(video, &out)
            .video_filter(self.config.fonts.subtitle_filter(subtitles))
            .output_seek(range.start_ms as f64 / 1000.0)
            .duration(range.span_ms() as f64 / 1000.0)
            .video_codec("libvpx-vp9")
            .crf(self.config.webm_crf)
            .output_arg("-b:v")
            .output_arg("0")
            .audio_codec("libopus");

        self.run_to_bytes(&cmd, &out).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_filter_without_fonts() {
        let fonts = FontOptions::default();
        let filter = fonts.subtitle_filter(Path::new("/media/ep1.srt"));
        assert_eq!(filter, "subtitles=/media/ep1.srt");
    }

    #[test]
    fn test_subtitle_filter_with_font_only() {
        let fonts = FontOptions {
            font: Some("Ubuntu".to_string()),
            fonts_dir: None,
        };
        let filter = fonts.subtitle_filter(Path::new("/media/ep1.srt"));
        assert_eq!(filter, "subtitles=/media/ep1.srt:force_style=FontName=Ubuntu");
    }

    #[test]
    fn test_subtitle_filter_with_font_and_dir() {
        let fonts = FontOptions {
            font: Some("Ubuntu".to_string()),
            fonts_dir: Some(PathBuf::from("/fonts")),
        };
        let filter = fonts.subtitle_filter(Path::new("/media/ep1.srt"));
        assert!(filter.contains(":fontsdir=/fonts"));
        assert!(filter.contains("force_style=FontName=Ubuntu"));
    }

    #[test]
    fn test_fonts_dir_alone_is_not_forwarded() {
        let fonts = FontOptions {
            font: None,
            fonts_dir: Some(PathBuf::from("/fonts")),
        };
        let filter = fonts.subtitle_filter(Path::new("/media/ep1.srt"));
        assert_eq!(filter, "subtitles=/media/ep1.srt");
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("C:/media"), "C\\:/media");
        assert_eq!(escape_filter_value("a,b"), "a\\,b");
        assert_eq!(escape_filter_value("plain"), "plain");
    }

    #[test]
    fn test_gif_filter_uses_configured_resolution() {
        let transcoder = FfmpegTranscoder::new(TranscodeConfig::default());
        assert_eq!(transcoder.gif_filter(), "fps=15,scale=-2:360:flags=lanczos");
    }
}
