//! HTTP request handlers.

pub mod clips;
pub mod frames;
pub mod subtitles;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::debug;

use epiclip_models::{Episode, Library};

use crate::error::{ApiError, ApiResult};

/// Resolve `(season, episode)` slugs against the catalog.
pub(crate) fn resolve<'a>(
    library: &'a Library,
    season: &str,
    episode: &str,
) -> ApiResult<&'a Episode> {
    match library.resolve(season, episode) {
        Some(ep) => Ok(ep),
        None => {
            debug!(season, episode, "Unknown season/episode");
            Err(ApiError::NotFound)
        }
    }
}

/// Generated artifacts are immutable for a given address, so clients
/// and proxies may cache them indefinitely.
pub(crate) fn artifact(content_type: &'static str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable",
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    axum::Json(json!({ "status": "ok" }))
}
