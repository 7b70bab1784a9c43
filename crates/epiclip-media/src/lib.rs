//! FFmpeg CLI wrapper and caption compositing for the clip service.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeouts
//! - Snapshot/GIF/WebM artifact generation with optional subtitle
//!   burn-in, behind the mockable [`Transcoder`] seam
//! - FFprobe duration probing for catalog builds
//! - Pure, deterministic caption compositing

pub mod command;
pub mod compose;
pub mod error;
pub mod probe;
pub mod transcode;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{compose, compose_to_jpeg, encode_jpeg, CaptionFont, CaptionStyle};
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration_ms;
pub use transcode::{FfmpegTranscoder, FontOptions, TranscodeConfig, Transcoder};

#[cfg(any(test, feature = "mocks"))]
pub use transcode::MockTranscoder;
