//! Subtitle cue export.

use axum::extract::{Path, State};
use axum::Json;

use epiclip_models::SubtitleExport;

use crate::error::{ApiError, ApiResult};
use crate::handlers::resolve;
use crate::state::AppState;

/// GET /:season/:episode/subtitles
///
/// The episode's full cue list as JSON, in cue-index order, with
/// timecode-formatted endpoints.
pub async fn export(
    State(state): State<AppState>,
    Path((season, episode)): Path<(String, String)>,
) -> ApiResult<Json<Vec<SubtitleExport>>> {
    let ep = resolve(&state.library, &season, &episode)?;
    if ep.subtitles_path.is_none() {
        return Err(ApiError::SubtitlesUnavailable);
    }

    Ok(Json(ep.subtitles.iter().map(|cue| cue.export()).collect()))
}
