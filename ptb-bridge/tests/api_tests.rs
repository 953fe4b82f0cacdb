//! HTTP boundary behavior: tool allow-listing, write gating, and the
//! health probe, exercised through the router with a scripted transport.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use helpers::*;
use http_body_util::BodyExt;
use ptb_bridge::api::{build_router, AppState};
use serde_json::{json, Value};
use serial_test::serial;
use tower::util::ServiceExt;

fn clear_permission_env() {
    std::env::remove_var(ptb_common::config::ALLOW_WRITES_ENV);
    std::env::remove_var(ptb_common::config::ALLOW_WRITES_LEGACY_ENV);
}

fn tool_request(tool: &str, args: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/tools")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "tool": tool, "args": args }).to_string(),
        ))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_workstation_connectivity() {
    let app = build_router(AppState::new(ready_client(MockDialer::new()).await));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["protools_connected"], json!(true));
    assert_eq!(body["session_id"], json!("test-session"));
}

#[tokio::test]
async fn health_shows_disconnected_when_no_session() {
    let app = build_router(AppState::new(new_client(MockDialer::new())));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["protools_connected"], json!(false));
    assert_eq!(body["session_id"], json!(null));
}

#[tokio::test]
async fn unknown_tool_is_a_bad_request() {
    let app = build_router(AppState::new(ready_client(MockDialer::new()).await));

    let response = app
        .oneshot(tool_request("delete_everything", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("delete_everything"));
}

#[tokio::test]
#[serial]
async fn import_is_forbidden_without_write_permission() {
    clear_permission_env();
    let dialer = MockDialer::new();
    let app = build_router(AppState::new(ready_client(dialer.clone()).await));
    let before = dialer.exchange_count();

    let response = app
        .oneshot(tool_request(
            "import_audio",
            json!({ "file_paths": ["/audio/a.wav"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(dialer.exchange_count(), before);
}

#[tokio::test]
#[serial]
async fn import_succeeds_with_all_permission() {
    clear_permission_env();
    std::env::set_var(ptb_common::config::ALLOW_WRITES_ENV, "all");

    let dialer = MockDialer::new();
    dialer.push_response(success_response(json!({
        "file_list": [
            {
                "original_input_path": "/audio/a.wav",
                "destination_file_list": [{
                    "file_path": "/sess/Audio Files/a.wav",
                    "clip_id_list": ["clip-a"]
                }]
            }
        ],
        "failure_list": []
    })));
    let app = build_router(AppState::new(ready_client(dialer).await));

    let response = app
        .oneshot(tool_request(
            "import_audio",
            json!({ "file_paths": ["/audio/a.wav"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["data"]["ok"], json!(true));
    assert_eq!(body["data"]["clips"][0]["clip_ids"], json!(["clip-a"]));

    clear_permission_env();
}

#[tokio::test]
#[serial]
async fn memory_permission_allows_mutating_tools() {
    clear_permission_env();
    std::env::set_var(ptb_common::config::ALLOW_WRITES_ENV, "memory");

    let dialer = MockDialer::new();
    dialer.push_response(success_response(json!({
        "file_list": [
            {
                "original_input_path": "/audio/a.wav",
                "destination_file_list": [{
                    "file_path": "/sess/Audio Files/a.wav",
                    "clip_id_list": ["clip-a"]
                }]
            }
        ],
        "failure_list": []
    })));
    let app = build_router(AppState::new(ready_client(dialer).await));

    let response = app
        .oneshot(tool_request(
            "import_audio",
            json!({ "file_paths": ["/audio/a.wav"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["ok"], json!(true));

    clear_permission_env();
}

#[tokio::test]
#[serial]
async fn raw_mutating_command_is_gated_like_its_typed_equivalent() {
    clear_permission_env();
    let dialer = MockDialer::new();
    let app = build_router(AppState::new(ready_client(dialer.clone()).await));
    let before = dialer.exchange_count();

    let response = app
        .oneshot(tool_request(
            "ptsl_command",
            json!({ "command": "SaveSession", "params": {} }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(dialer.exchange_count(), before);
}

#[tokio::test]
#[serial]
async fn raw_read_only_command_needs_no_permission() {
    clear_permission_env();
    let dialer = MockDialer::new();
    dialer.push_response(success_response(json!({ "session_name": "Mix" })));
    let app = build_router(AppState::new(ready_client(dialer).await));

    let response = app
        .oneshot(tool_request(
            "ptsl_command",
            json!({ "command": "GetSessionName" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], json!("success"));
}

#[tokio::test]
async fn raw_unknown_command_is_a_bad_request() {
    let app = build_router(AppState::new(ready_client(MockDialer::new()).await));

    let response = app
        .oneshot(tool_request(
            "ptsl_command",
            json!({ "command": "FrobnicateSession" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_track_list_returns_workstation_body() {
    let dialer = MockDialer::new();
    dialer.push_response(success_response(json!({
        "track_list": [{"name": "Dialog", "id": "t1"}]
    })));
    let app = build_router(AppState::new(ready_client(dialer).await));

    let response = app
        .oneshot(tool_request("get_track_list", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["track_list"][0]["name"], json!("Dialog"));
}

#[tokio::test]
async fn get_session_info_aggregates_queries() {
    let dialer = MockDialer::new();
    dialer.push_response(success_response(json!({ "session_name": "Mix v3" })));
    dialer.push_response(success_response(json!({ "session_path": "/sessions/mix" })));
    dialer.push_response(success_response(json!({ "sample_rate": "SR_48000" })));
    dialer.push_response(success_response(json!({ "current_bit_depth": "Bit24" })));
    let app = build_router(AppState::new(ready_client(dialer).await));

    let response = app
        .oneshot(tool_request("get_session_info", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["name"], json!("Mix v3"));
    assert_eq!(body["data"]["path"], json!("/sessions/mix"));
    assert_eq!(body["data"]["sample_rate"], json!("SR_48000"));
    assert_eq!(body["data"]["bit_depth"], json!("Bit24"));
}

#[tokio::test]
async fn transport_failure_surfaces_as_bad_gateway() {
    let dialer = MockDialer::new();
    dialer.push(Scripted::Fail("connection reset".to_string()));
    let app = build_router(AppState::new(ready_client(dialer).await));

    let response = app
        .oneshot(tool_request("get_track_list", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response_json(response).await;
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn get_track_format_inspects_a_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    writer.write_sample(0i16).unwrap();
    writer.finalize().unwrap();

    let app = build_router(AppState::new(ready_client(MockDialer::new()).await));
    let response = app
        .oneshot(tool_request(
            "get_track_format",
            json!({ "file_path": path.to_str().unwrap() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["channels"], json!(1));
    assert_eq!(body["data"]["track_format"], json!("TFormat_Mono"));
}

#[tokio::test]
async fn missing_file_falls_back_to_stereo() {
    let app = build_router(AppState::new(ready_client(MockDialer::new()).await));
    let response = app
        .oneshot(tool_request(
            "get_track_format",
            json!({ "file_path": "/nonexistent/x.wav" }),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["data"]["channels"], json!(null));
    assert_eq!(body["data"]["track_format"], json!("TFormat_Stereo"));
}
