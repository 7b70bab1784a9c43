//! API routes.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::health;
use crate::handlers::clips::{
    gif, gif_with_subtitles, snapshot, snapshot_with_subtitles, webm, webm_with_subtitles,
};
use crate::handlers::frames::{frame, tiny_frame};
use crate::handlers::subtitles::export as export_subtitles;
use crate::state::AppState;

/// Create the API router.
///
/// Path segments three and four are parameters in every artifact route,
/// so they must carry the same names (`:start`, `:end`) throughout; the
/// single-instant routes read `:start` as their one timestamp.
pub fn create_router(state: AppState) -> Router {
    let episode_routes = Router::new()
        // Live-transcode artifacts, timecode-addressed
        .route("/:season/:episode/:start/pic", get(snapshot))
        .route("/:season/:episode/:start/pic/sub", get(snapshot_with_subtitles))
        .route("/:season/:episode/:start/:end/gif", get(gif))
        .route("/:season/:episode/:start/:end/gif/sub", get(gif_with_subtitles))
        .route("/:season/:episode/:start/:end/webm", get(webm))
        .route("/:season/:episode/:start/:end/webm/sub", get(webm_with_subtitles))
        // Full cue list for an episode
        .route("/:season/:episode/subtitles", get(export_subtitles))
        // Precomputed frames, millisecond-addressed
        .route("/:season/:episode/:start/frame", get(frame))
        .route("/:season/:episode/:start/frame/tiny", get(tiny_frame));

    Router::new()
        .route("/health", get(health))
        .merge(episode_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
