//! Recording sessions driven through the HTTP handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use command_recorder::api::handlers::{health, playback, recording};
use command_recorder::api::state::{AppState, WsEvent};
use command_recorder::config::Config;
use command_recorder::error::{AppError, PlaybackError};
use command_recorder::frame::FrameTree;

fn tree_with_indicator() -> FrameTree {
    let mut tree = FrameTree::new();
    let _indicator = tree.add_frame(0);
    let app = tree.add_frame(0);
    tree.set_current(app);
    tree
}

async fn create(state: &Arc<AppState>) -> String {
    let request = serde_json::from_value(json!({
        "title": "Search",
        "frame_tree": tree_with_indicator(),
        "indicator_index": 0,
    }))
    .unwrap();
    let Json(created) = recording::create_recording(State(state.clone()), Json(request))
        .await
        .unwrap();
    assert_eq!(created.status, "recording");
    assert_eq!(created.frame_location.to_string(), "root:0");
    created.session_id
}

fn typing_batch() -> serde_json::Value {
    json!({
        "updates": [
            {
                "type": "snapshot",
                "data": {
                    "id": 10,
                    "parent": 2,
                    "tag": "INPUT",
                    "attributes": { "name": "q" },
                    "value": "rust"
                }
            },
            {
                "type": "event",
                "data": { "kind": "change", "target": 10, "timestamp_ms": 5 }
            }
        ],
        "now_ms": 20
    })
}

#[tokio::test]
async fn test_session_records_and_broadcasts() {
    let state = Arc::new(AppState::new(Config::default()));
    let mut events = state.subscribe();
    let id = create(&state).await;

    let batch = serde_json::from_value(typing_batch()).unwrap();
    let Json(result) = recording::post_events(State(state.clone()), Path(id.clone()), Json(batch))
        .await
        .unwrap();
    assert_eq!(result.emitted, 1);
    assert!(result.attached);

    let Json(status) = recording::get_recording_status(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    assert_eq!(status.status, "recording");
    assert_eq!(status.command_count, 1);
    assert_eq!(status.commands[0].command, "type");
    assert_eq!(status.commands[0].best_target(), Some("name=q"));
    assert_eq!(status.commands[0].value, "rust");
    assert_eq!(status.commands[0].frame_location.to_string(), "root:0");

    match events.recv().await.unwrap() {
        WsEvent::FrameLocation { frame_location, .. } => {
            assert_eq!(frame_location.to_string(), "root:0")
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match events.recv().await.unwrap() {
        WsEvent::RecordedCommand { session_id, command } => {
            assert_eq!(session_id, id);
            assert_eq!(command.command, "type");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_detached_session_rejects_events() {
    let state = Arc::new(AppState::new(Config::default()));
    let id = create(&state).await;

    recording::detach_recording(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    let Json(status) = recording::get_recording_status(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    assert_eq!(status.status, "detached");

    let batch = serde_json::from_value(typing_batch()).unwrap();
    let err = recording::post_events(State(state.clone()), Path(id.clone()), Json(batch))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::RecordingError(_)));
}

#[tokio::test]
async fn test_context_command_requires_a_command() {
    let state = Arc::new(AppState::new(Config::default()));
    let id = create(&state).await;

    let request = serde_json::from_value(json!({ "command": "  " })).unwrap();
    let err = recording::context_command(State(state.clone()), Path(id), Json(request))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_recalculate_and_delete() {
    let state = Arc::new(AppState::new(Config::default()));
    let id = create(&state).await;

    let Json(location) =
        recording::recalculate_frame_location(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
    assert_eq!(location.frame_location.to_string(), "root:0");

    recording::delete_recording(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    let err = recording::get_recording_status(State(state.clone()), Path(id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SessionNotFound(_)));
}

#[tokio::test]
async fn test_disconnect_drops_client_sessions() {
    let state = Arc::new(AppState::new(Config::default()));
    let request = serde_json::from_value(json!({ "title": "Mine", "client_id": "c1" })).unwrap();
    let Json(created) = recording::create_recording(State(state.clone()), Json(request))
        .await
        .unwrap();
    assert_eq!(created.frame_location.to_string(), "root");
    let other = create(&state).await;

    state.client_connected("c1");
    state.client_disconnected("c1");

    assert!(state.recordings.get(&created.session_id).is_none());
    assert!(state.recordings.get(&other).is_some());
    assert_eq!(state.active_connection_count(), 0);
}

#[tokio::test]
async fn test_health_counts_sessions() {
    let state = Arc::new(AppState::new(Config::default()));
    create(&state).await;

    let Json(report) = health::health_check(State(state.clone())).await;
    assert_eq!(report.status, "healthy");
    assert_eq!(report.active_recordings, 1);
    assert_eq!(report.connected_clients, 0);
}

fn project() -> serde_json::Value {
    json!({
        "entry": "checkout",
        "tests": [
            {
                "name": "checkout",
                "commands": [
                    { "command": "open", "target": "/cart" },
                    { "command": "run", "target": "login" },
                    { "command": "click", "target": "id=pay" }
                ]
            },
            {
                "name": "login",
                "commands": [
                    { "command": "type", "target": "id=user", "value": "ada" }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn test_plan_flattens_called_tests() {
    let state = Arc::new(AppState::new(Config::default()));
    let request = serde_json::from_value(project()).unwrap();

    let Json(plan) = playback::plan_playback(State(state), Json(request))
        .await
        .unwrap();
    assert_eq!(plan.entry, "checkout");
    assert_eq!(plan.max_depth, 1);
    let steps: Vec<(&str, &str, &str)> = plan
        .steps
        .iter()
        .map(|s| (s.test.as_str(), s.command.as_str(), s.target.as_str()))
        .collect();
    assert_eq!(
        steps,
        vec![
            ("checkout", "open", "/cart"),
            ("login", "type", "id=user"),
            ("checkout", "click", "id=pay"),
        ]
    );
    assert_eq!(plan.steps[1].value, "ada");
    assert_eq!(plan.steps[2].index, 2);
}

#[tokio::test]
async fn test_plan_honors_configured_call_depth() {
    let config = Config {
        max_call_depth: 3,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config));
    let request = serde_json::from_value(json!({
        "entry": "loop",
        "tests": [
            { "name": "loop", "commands": [ { "command": "run", "target": "loop" } ] }
        ]
    }))
    .unwrap();

    let err = playback::plan_playback(State(state), Json(request))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::PlaybackError(PlaybackError::CallDepthExceeded(3))
    ));
    assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_plan_unknown_entry() {
    let state = Arc::new(AppState::new(Config::default()));
    let request = serde_json::from_value(json!({ "entry": "missing", "tests": [] })).unwrap();

    let err = playback::plan_playback(State(state), Json(request))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::PlaybackError(PlaybackError::TestNotFound(ref name)) if name == "missing"
    ));
}
