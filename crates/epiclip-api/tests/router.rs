//! End-to-end router tests with a mocked transcoder and an on-disk
//! frame store fixture.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use epiclip_api::{ApiConfig, AppState, FsSnapshotStore};
use epiclip_media::{CaptionStyle, MockTranscoder, Transcoder};
use epiclip_models::{Episode, Library, Season, SubtitleCue};

const DURATION_MS: u64 = 600_000;

fn test_library(with_subtitles: bool) -> Library {
    let mut episode = Episode::new("e1", "/media/s1e1.mkv", DURATION_MS);
    episode.snapshot_instants = [0u64, 1_000, 2_000].into_iter().collect();
    if with_subtitles {
        episode.subtitles_path = Some("/media/s1e1.srt".into());
        episode.subtitles = vec![
            SubtitleCue {
                index: 1,
                start_ms: 1_000,
                end_ms: 3_000,
                text: "First cue".to_string(),
            },
            SubtitleCue {
                index: 2,
                start_ms: 30_000,
                end_ms: 32_000,
                text: "Second cue".to_string(),
            },
        ];
    }
    Library {
        seasons: vec![Season {
            slug: "s1".to_string(),
            name: None,
            icon: None,
            episodes: vec![episode],
        }],
    }
}

fn build_router(config: ApiConfig, library: Library, transcoder: MockTranscoder) -> Router {
    let snapshots = Arc::new(FsSnapshotStore::new("/nonexistent"));
    build_router_with_store(config, library, transcoder, snapshots)
}

fn build_router_with_store(
    config: ApiConfig,
    library: Library,
    transcoder: MockTranscoder,
    snapshots: Arc<FsSnapshotStore>,
) -> Router {
    let transcoder: Arc<dyn Transcoder> = Arc::new(transcoder);
    let style = CaptionStyle::new(None, config.caption_line_width, config.jpeg_quality);
    let state = AppState::with_parts(config, library, transcoder, snapshots, style);
    epiclip_api::create_router(state)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, body, content_type)
}

fn png_fixture() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(64, 48, image::Rgba([40, 80, 120, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

/// Write a frame-store fixture for s1/e1 and return the store.
fn frame_store_fixture(root: &std::path::Path) -> Arc<FsSnapshotStore> {
    let dir = root.join("s1").join("e1");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("1000.png"), png_fixture()).unwrap();
    std::fs::write(dir.join("1000.tiny.jpg"), b"tiny jpeg bytes").unwrap();
    Arc::new(FsSnapshotStore::new(root))
}

#[tokio::test]
async fn health_is_ok() {
    let router = build_router(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
    );
    let (status, _, _) = get(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_episode_is_404() {
    let router = build_router(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
    );
    let (status, body, _) = get(router, "/s9/e1/1:00/pic").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"season/episode not found");
}

#[tokio::test]
async fn snapshot_returns_jpeg_with_cache_headers() {
    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_snapshot()
        .withf(|_, ms| *ms == 60_000)
        .returning(|_, _| Ok(vec![0xFF, 0xD8, 0xFF]));

    let router = build_router(ApiConfig::default(), test_library(false), transcoder);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/s1/e1/1:00/pic")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], &[0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn malformed_timecode_is_400() {
    let router = build_router(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
    );
    let (status, body, _) = get(router, "/s1/e1/99:99/pic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"invalid timecode format");
}

#[tokio::test]
async fn snapshot_past_duration_is_416() {
    let router = build_router(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
    );
    // 11:00 on a ten minute episode
    let (status, _, _) = get(router, "/s1/e1/11:00/pic").await;
    assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
}

#[tokio::test]
async fn snapshot_with_subtitles_requires_track() {
    let router = build_router(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
    );
    let (status, body, _) = get(router, "/s1/e1/1:00/pic/sub").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"no subtitles available");
}

#[tokio::test]
async fn gif_span_over_limit_is_416() {
    let router = build_router(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
    );
    // 15s span against the 10s gif budget
    let (status, body, _) = get(router, "/s1/e1/1:00/1:15/gif").await;
    assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(body, b"requested time range exceeds maximum limit");
}

#[tokio::test]
async fn inverted_range_is_400() {
    let router = build_router(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
    );
    let (status, body, _) = get(router, "/s1/e1/1:15/1:00/gif").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"bad time range");
}

#[tokio::test]
async fn gif_end_marker_clamps_to_duration() {
    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_gif()
        .withf(|_, range| range.start_ms == 590_000 && range.end_ms == DURATION_MS)
        .returning(|_, _| Ok(b"GIF89a".to_vec()));

    let router = build_router(ApiConfig::default(), test_library(false), transcoder);
    // End marker 10:05 overshoots the 10:00 episode and clamps
    let (status, body, content_type) = get(router, "/s1/e1/9:50/10:05/gif").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/gif"));
    assert_eq!(body, b"GIF89a");
}

#[tokio::test]
async fn subtitled_gif_is_forbidden_when_disabled() {
    let router = build_router(
        ApiConfig::default(),
        test_library(true),
        MockTranscoder::new(),
    );
    let (status, body, _) = get(router, "/s1/e1/1:00/1:05/gif/sub").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, b"creating gifs with subtitles is currently prohibited");

    // The gate applies before resolution
    let router = build_router(
        ApiConfig::default(),
        test_library(true),
        MockTranscoder::new(),
    );
    let (status, _, _) = get(router, "/s9/e9/1:00/1:05/gif/sub").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn subtitled_gif_served_when_enabled() {
    let config = ApiConfig {
        gif_subtitles_enabled: true,
        ..ApiConfig::default()
    };
    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_gif_with_subtitles()
        .returning(|_, _, _| Ok(b"GIF89a".to_vec()));

    let router = build_router(config, test_library(true), transcoder);
    let (status, body, _) = get(router, "/s1/e1/1:00/1:05/gif/sub").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"GIF89a");
}

#[tokio::test]
async fn webm_uses_larger_span_budget() {
    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_webm()
        .withf(|_, range| range.span_ms() == 15_000)
        .returning(|_, _| Ok(b"webm bytes".to_vec()));

    let router = build_router(ApiConfig::default(), test_library(false), transcoder);
    // 15s is over the gif budget but inside the 20s webm budget
    let (status, _, content_type) = get(router, "/s1/e1/1:00/1:15/webm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("video/webm"));
}

#[tokio::test]
async fn transcoder_failure_is_500() {
    let mut transcoder = MockTranscoder::new();
    transcoder.expect_webm().returning(|_, _| {
        Err(epiclip_media::MediaError::ffmpeg_failed(
            "conversion failed",
            Some("stderr output".to_string()),
            Some(1),
        ))
    });

    let router = build_router(ApiConfig::default(), test_library(false), transcoder);
    let (status, body, _) = get(router, "/s1/e1/1:00/1:05/webm").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"clip generation failed");
}

#[tokio::test]
async fn subtitle_export_lists_cues_in_order() {
    let router = build_router(
        ApiConfig::default(),
        test_library(true),
        MockTranscoder::new(),
    );
    let (status, body, content_type) = get(router, "/s1/e1/subtitles").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/json"));

    let cues: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let cues = cues.as_array().unwrap();
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0]["text"], "First cue");
    assert_eq!(cues[0]["start"], "0:01");
    assert_eq!(cues[0]["end"], "0:03");
    assert_eq!(cues[1]["text"], "Second cue");
}

#[tokio::test]
async fn subtitle_export_without_track_is_404() {
    let router = build_router(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
    );
    let (status, body, _) = get(router, "/s1/e1/subtitles").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"no subtitles available");
}

#[tokio::test]
async fn frame_requires_exact_stored_instant() {
    let dir = tempfile::tempdir().unwrap();
    let store = frame_store_fixture(dir.path());
    let router = build_router_with_store(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
        store,
    );
    // 1500 is inside the episode but not a stored instant
    let (status, body, _) = get(router, "/s1/e1/1500/frame").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"time not found");
}

#[tokio::test]
async fn frame_without_captions_is_png_passthrough() {
    let dir = tempfile::tempdir().unwrap();
    let store = frame_store_fixture(dir.path());
    let router = build_router_with_store(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
        store,
    );
    let (status, body, content_type) = get(router, "/s1/e1/1000/frame").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(body, png_fixture());
}

#[tokio::test]
async fn captioned_frame_is_reencoded_as_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let store = frame_store_fixture(dir.path());
    let router = build_router_with_store(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
        store,
    );
    // "hello" in base64
    let (status, body, content_type) = get(router, "/s1/e1/1000/frame?topb64=aGVsbG8=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/jpeg"));
    // JPEG SOI marker
    assert_eq!(&body[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn undecodable_caption_degrades_to_passthrough() {
    let dir = tempfile::tempdir().unwrap();
    let store = frame_store_fixture(dir.path());
    let router = build_router_with_store(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
        store,
    );
    let (status, _, content_type) = get(router, "/s1/e1/1000/frame?topb64=!!!invalid!!!").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn tiny_frame_is_served_as_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let store = frame_store_fixture(dir.path());
    let router = build_router_with_store(
        ApiConfig::default(),
        test_library(false),
        MockTranscoder::new(),
        store,
    );
    let (status, body, content_type) = get(router, "/s1/e1/1000/frame/tiny").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(body, b"tiny jpeg bytes");
}
