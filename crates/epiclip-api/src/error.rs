//! API error types and HTTP status mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use epiclip_media::MediaError;
use epiclip_models::{RangeError, TimecodeError};

pub type ApiResult<T> = Result<T, ApiError>;

/// Request outcome taxonomy, mapped to transport-level results.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Season or episode slug did not resolve.
    #[error("season/episode not found")]
    NotFound,

    /// Subtitle burn-in or export requested for an episode without a
    /// subtitle track. Same status as NotFound, distinct message.
    #[error("no subtitles available")]
    SubtitlesUnavailable,

    /// Requested instant has no precomputed frame.
    #[error("time not found")]
    FrameNotFound,

    #[error("invalid timecode format")]
    InvalidTimecode,

    /// Endpoint outside the episode duration (and clamping does not apply).
    #[error("timecode out of range")]
    OutOfRange,

    #[error("bad time range")]
    BadRange,

    #[error("requested time range exceeds maximum limit")]
    RangeTooLarge,

    #[error("creating gifs with subtitles is currently prohibited")]
    FeatureDisabled,

    #[error("clip generation failed")]
    Transcode(#[source] MediaError),

    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound | ApiError::SubtitlesUnavailable | ApiError::FrameNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::InvalidTimecode | ApiError::BadRange => StatusCode::BAD_REQUEST,
            ApiError::OutOfRange | ApiError::RangeTooLarge => StatusCode::RANGE_NOT_SATISFIABLE,
            ApiError::FeatureDisabled => StatusCode::FORBIDDEN,
            ApiError::Transcode(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TimecodeError> for ApiError {
    fn from(_: TimecodeError) -> Self {
        ApiError::InvalidTimecode
    }
}

impl From<RangeError> for ApiError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::OutOfRange => ApiError::OutOfRange,
            RangeError::BadRange => ApiError::BadRange,
            RangeError::RangeTooLarge { .. } => ApiError::RangeTooLarge,
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::SubtitlesUnavailable => ApiError::SubtitlesUnavailable,
            other => ApiError::Transcode(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Tool diagnostics and internal causes are logged, never exposed.
        match &self {
            ApiError::Transcode(cause) => error!(%cause, "transcode failed"),
            ApiError::Internal(cause) => error!(%cause, "internal error"),
            _ => {}
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
