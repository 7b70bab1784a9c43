//! Live-transcode clip endpoints, addressed by timecode.
//!
//! Validation happens entirely before the transcoder is invoked: slug
//! resolution, timecode parsing, then range policy. A request that
//! reaches ffmpeg has already been accepted.

use axum::extract::{Path, State};
use axum::response::Response;
use tracing::debug;

use epiclip_models::{parse_timecode, validate_instant, validate_range, TimeRange};

use crate::error::{ApiError, ApiResult};
use crate::handlers::{artifact, resolve};
use crate::state::AppState;

/// Parse and validate a `(start, end)` timecode pair for an episode.
fn parse_range(
    start: &str,
    end: &str,
    max_span_ms: u64,
    duration_ms: u64,
) -> ApiResult<TimeRange> {
    let start_ms = parse_timecode(start)?;
    let end_ms = parse_timecode(end)?;
    Ok(validate_range(start_ms, end_ms, max_span_ms, duration_ms)?)
}

/// GET /:season/:episode/:timecode/pic
pub async fn snapshot(
    State(state): State<AppState>,
    Path((season, episode, timecode)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let ep = resolve(&state.library, &season, &episode)?;
    let ms = parse_timecode(&timecode)?;
    validate_instant(ms, ep.duration_ms)?;

    let bytes = state.transcoder.snapshot(&ep.video_path, ms).await?;
    Ok(artifact("image/jpeg", bytes))
}

/// GET /:season/:episode/:timecode/pic/sub
pub async fn snapshot_with_subtitles(
    State(state): State<AppState>,
    Path((season, episode, timecode)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let ep = resolve(&state.library, &season, &episode)?;
    let subtitles = ep
        .subtitles_path
        .as_deref()
        .ok_or(ApiError::SubtitlesUnavailable)?;
    let ms = parse_timecode(&timecode)?;
    validate_instant(ms, ep.duration_ms)?;

    let bytes = state
        .transcoder
        .snapshot_with_subtitles(&ep.video_path, subtitles, ms)
        .await?;
    Ok(artifact("image/jpeg", bytes))
}

/// GET /:season/:episode/:start/:end/gif
pub async fn gif(
    State(state): State<AppState>,
    Path((season, episode, start, end)): Path<(String, String, String, String)>,
) -> ApiResult<Response> {
    let ep = resolve(&state.library, &season, &episode)?;
    let range = parse_range(&start, &end, state.config.max_gif_span_ms, ep.duration_ms)?;

    let bytes = state.transcoder.gif(&ep.video_path, range).await?;
    Ok(artifact("image/gif", bytes))
}

/// GET /:season/:episode/:start/:end/gif/sub
pub async fn gif_with_subtitles(
    State(state): State<AppState>,
    Path((season, episode, start, end)): Path<(String, String, String, String)>,
) -> ApiResult<Response> {
    // Feature gate first: prohibited means prohibited, even for
    // requests that would not otherwise resolve.
    if !state.config.gif_subtitles_enabled {
        debug!("Subtitled gif requested while disabled");
        return Err(ApiError::FeatureDisabled);
    }

    let ep = resolve(&state.library, &season, &episode)?;
    let subtitles = ep
        .subtitles_path
        .as_deref()
        .ok_or(ApiError::SubtitlesUnavailable)?;
    let range = parse_range(&start, &end, state.config.max_gif_span_ms, ep.duration_ms)?;

    let bytes = state
        .transcoder
        .gif_with_subtitles(&ep.video_path, subtitles, range)
        .await?;
    Ok(artifact("image/gif", bytes))
}

/// GET /:season/:episode/:start/:end/webm
pub async fn webm(
    State(state): State<AppState>,
    Path((season, episode, start, end)): Path<(String, String, String, String)>,
) -> ApiResult<Response> {
    let ep = resolve(&state.library, &season, &episode)?;
    let range = parse_range(&start, &end, state.config.max_webm_span_ms, ep.duration_ms)?;

    let bytes = state.transcoder.webm(&ep.video_path, range).await?;
    Ok(artifact("video/webm", bytes))
}

/// GET /:season/:episode/:start/:end/webm/sub
pub async fn webm_with_subtitles(
    State(state): State<AppState>,
    Path((season, episode, start, end)): Path<(String, String, String, String)>,
) -> ApiResult<Response> {
    let ep = resolve(&state.library, &season, &episode)?;
    let subtitles = ep
        .subtitles_path
        .as_deref()
        .ok_or(ApiError::SubtitlesUnavailable)?;
    let range = parse_range(&start, &end, state.config.max_webm_span_ms, ep.duration_ms)?;

    let bytes = state
        .transcoder
        .webm_with_subtitles(&ep.video_path, subtitles, range)
        .await?;
    Ok(artifact("video/webm", bytes))
}
