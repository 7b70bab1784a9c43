//! Precomputed frame endpoints, addressed by millisecond offset.
//!
//! These serve frames generated ahead of time by the snapshot pipeline,
//! never the transcoder. The addressing is strict: an offset without a
//! stored frame is a 404 even when it lies inside the episode.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use epiclip_models::CaptionRequest;

use crate::error::{ApiError, ApiResult};
use crate::handlers::{artifact, resolve};
use crate::state::AppState;

/// Caller-supplied captions, base64 in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct CaptionParams {
    #[serde(default)]
    pub topb64: Option<String>,
    #[serde(default)]
    pub btmb64: Option<String>,
}

/// Decode a base64 caption parameter.
///
/// Lenient on purpose: a caption is decoration, so undecodable input
/// degrades to an absent caption instead of failing the frame request,
/// and non-ASCII bytes in decoded text are dropped rather than
/// rejected.
fn decode_caption(param: Option<&str>) -> String {
    let Some(encoded) = param else {
        return String::new();
    };
    let bytes = STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded));
    match bytes {
        Ok(bytes) => bytes
            .into_iter()
            .filter(|b| b.is_ascii() && !b.is_ascii_control())
            .map(char::from)
            .collect(),
        Err(err) => {
            debug!(%err, "Ignoring undecodable caption parameter");
            String::new()
        }
    }
}

/// GET /:season/:episode/:ms/frame
pub async fn frame(
    State(state): State<AppState>,
    Path((season, episode, ms)): Path<(String, String, u64)>,
    Query(params): Query<CaptionParams>,
) -> ApiResult<Response> {
    let ep = resolve(&state.library, &season, &episode)?;
    if !ep.has_snapshot(ms) {
        debug!(season, episode, ms, "No stored frame for instant");
        return Err(ApiError::FrameNotFound);
    }

    let request = CaptionRequest::new(
        decode_caption(params.topb64.as_deref()),
        decode_caption(params.btmb64.as_deref()),
    );

    let png = state.snapshots.frame(&season, &episode, ms).await?;
    if request.is_empty() {
        // No compositing: serve the stored frame untouched.
        return Ok(artifact("image/png", png));
    }

    let style = state.caption_style.clone();
    let jpeg = tokio::task::spawn_blocking(move || {
        epiclip_media::compose_to_jpeg(&png, &request, &style)
    })
    .await
    .map_err(|err| ApiError::internal(format!("caption task panicked: {err}")))??;

    Ok(artifact("image/jpeg", jpeg))
}

/// GET /:season/:episode/:ms/frame/tiny
pub async fn tiny_frame(
    State(state): State<AppState>,
    Path((season, episode, ms)): Path<(String, String, u64)>,
) -> ApiResult<Response> {
    let ep = resolve(&state.library, &season, &episode)?;
    if !ep.has_snapshot(ms) {
        return Err(ApiError::FrameNotFound);
    }

    let bytes = state.snapshots.tiny_frame(&season, &episode, ms).await?;
    Ok(artifact("image/jpeg", bytes))
}
