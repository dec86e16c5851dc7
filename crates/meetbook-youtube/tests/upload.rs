//! Upload flow tests against a mock Google API.

use meetbook_youtube::{YouTubeCredentials, YouTubeError, YouTubeUploader};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> YouTubeCredentials {
    YouTubeCredentials::from_json(
        r#"{"client_id":"id","client_secret":"secret","refresh_token":"refresh"}"#,
    )
    .unwrap()
}

fn uploader_for(server: &MockServer) -> YouTubeUploader {
    YouTubeUploader::new(credentials())
        .with_token_url(format!("{}/token", server.uri()))
        .with_upload_url(format!("{}/upload/youtube/v3/videos", server.uri()))
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "yt-token",
            "expires_in": 3599,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn uploads_through_the_resumable_session() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/upload/youtube/v3/videos"))
        .and(query_param("uploadType", "resumable"))
        .and(header("authorization", "Bearer yt-token"))
        .and(body_string_contains("unlisted"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("location", format!("{}/session/1", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/session/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "vid123" })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("Team Sync.mp4");
    std::fs::write(&video, b"video-bytes").unwrap();

    let link = uploader_for(&server)
        .upload_video(&video, "Team Sync", "Recording from 01.06.2030")
        .await
        .expect("upload");

    assert_eq!(link, "https://www.youtube.com/watch?v=vid123");
}

#[tokio::test]
async fn missing_session_url_is_an_invalid_response() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/upload/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("x.mp4");
    std::fs::write(&video, b"v").unwrap();

    let err = uploader_for(&server)
        .upload_video(&video, "x", "")
        .await
        .expect_err("no location header");
    assert!(matches!(err, YouTubeError::InvalidResponse(_)));
}

#[tokio::test]
async fn rejected_refresh_token_surfaces_the_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("x.mp4");
    std::fs::write(&video, b"v").unwrap();

    let err = uploader_for(&server)
        .upload_video(&video, "x", "")
        .await
        .expect_err("bad grant");
    assert!(matches!(err, YouTubeError::Api { status: 400, .. }));
}

#[tokio::test]
async fn missing_video_file_is_an_io_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/upload/youtube/v3/videos"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("location", format!("{}/session/1", server.uri()).as_str()),
        )
        .mount(&server)
        .await;

    let err = uploader_for(&server)
        .upload_video(std::path::Path::new("/nonexistent/x.mp4"), "x", "")
        .await
        .expect_err("no file");
    assert!(matches!(err, YouTubeError::Io(_)));
}
