//! Axum HTTP server for episodic clip extraction.
//!
//! Routes resolve a `(season, episode)` slug pair, validate the
//! requested time address, and serve one of:
//! - a live-transcoded JPEG snapshot, GIF, or WebM clip
//! - a precomputed frame, optionally with caller captions composited
//! - the episode's subtitle cues as JSON

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod snapshots;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use snapshots::{FsSnapshotStore, SnapshotStore};
pub use state::AppState;
