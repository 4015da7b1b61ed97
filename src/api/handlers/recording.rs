use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::dom::Document;
use crate::error::{AppError, Result};
use crate::frame::{FrameLocator, FrameTree};
use crate::models::{
    BatchResponse, ContextCommandRequest, CreateRecordingRequest, CreateRecordingResponse,
    FrameLocationResponse, GenericResponse, PageBatch, RecordingSession, RecordingStatusResponse,
};
use crate::recording::{ChannelHost, Recorder};

use crate::api::state::{ActiveRecording, AppState, RecordingHandle, SessionCoordinator};

/// Create a recording session for one frame and attach its recorder
pub async fn create_recording(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRecordingRequest>,
) -> Result<Json<CreateRecordingResponse>> {
    let mut session = RecordingSession::new(request.title.clone());
    let session_id = session.id.clone();

    let coordinator = SessionCoordinator::new(
        session_id.clone(),
        request.indicator_index,
        state.ws_broadcast.clone(),
    );
    let mut frames = FrameLocator::new(
        Arc::new(request.frame_tree.unwrap_or_else(FrameTree::new)),
        Arc::new(coordinator),
        Duration::from_millis(state.config.frame_count_timeout_ms),
    );
    let frame_location = frames.resolve().await;

    let (host, host_rx) = ChannelHost::channel();
    let mut recorder = Recorder::new(
        Document::new(request.title),
        Arc::clone(&state.locators),
        Arc::new(host),
        state.config.recorder.clone(),
    );
    recorder.set_frame_location(frame_location.clone());
    recorder.attach();
    session.start(frame_location.clone());

    state.recordings.insert(
        session_id.clone(),
        ActiveRecording {
            handle: Arc::new(Mutex::new(RecordingHandle {
                recorder,
                frames,
                host_rx,
            })),
            session,
            client_id: request.client_id,
        },
    );

    tracing::info!("Created recording session {} in frame {}", session_id, frame_location);

    Ok(Json(CreateRecordingResponse {
        session_id,
        status: "recording".to_string(),
        frame_location,
    }))
}

/// Get the status and recorded commands of a session
pub async fn get_recording_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<RecordingStatusResponse>> {
    let active = state
        .recordings
        .get(&session_id)
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;
    let session = &active.session;

    Ok(Json(RecordingStatusResponse {
        session_id: session_id.clone(),
        status: session.status.clone(),
        frame_location: session.frame_location.clone(),
        command_count: session.commands.len(),
        commands: session.commands.clone(),
        error: session.error.clone(),
    }))
}

/// Feed page updates to the recorder
pub async fn post_events(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(batch): Json<PageBatch>,
) -> Result<Json<BatchResponse>> {
    let handle = state.recording_handle(&session_id)?;
    let mut guard = handle.lock().await;
    if !guard.recorder.is_attached() {
        return Err(AppError::RecordingError(format!(
            "session {} is not recording",
            session_id
        )));
    }

    let before = guard.recorder.emitted();
    for update in batch.updates {
        guard.recorder.apply(update);
    }
    if let Some(now_ms) = batch.now_ms {
        guard.recorder.advance(now_ms);
    }
    let emitted = guard.recorder.emitted() - before;

    state.drain_host_messages(&session_id, &mut guard);

    Ok(Json(BatchResponse {
        emitted,
        attached: guard.recorder.is_attached(),
        pending_timers: guard.recorder.pending_timers(),
    }))
}

/// Answer the recorder's pending context-menu request
pub async fn context_command(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<ContextCommandRequest>,
) -> Result<Json<GenericResponse>> {
    if request.command.trim().is_empty() {
        return Err(AppError::ValidationError("command must not be empty".to_string()));
    }
    let handle = state.recording_handle(&session_id)?;
    let mut guard = handle.lock().await;
    guard.recorder.apply_context_command(&request.command);
    state.drain_host_messages(&session_id, &mut guard);

    Ok(Json(GenericResponse {
        status: "applied".to_string(),
    }))
}

/// Force the frame location to be computed again
pub async fn recalculate_frame_location(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<FrameLocationResponse>> {
    let handle = state.recording_handle(&session_id)?;
    let mut guard = handle.lock().await;
    let frame_location = guard.frames.recalculate().await;
    guard.recorder.set_frame_location(frame_location.clone());

    if let Some(mut active) = state.recordings.get_mut(&session_id) {
        active.session.frame_location = Some(frame_location.clone());
    }
    tracing::info!("Session {} frame location is now {}", session_id, frame_location);

    Ok(Json(FrameLocationResponse { frame_location }))
}

/// Stop recording but keep the session and its commands
pub async fn detach_recording(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<GenericResponse>> {
    let handle = state.recording_handle(&session_id)?;
    let mut guard = handle.lock().await;
    guard.recorder.detach();
    if let Some(mut active) = state.recordings.get_mut(&session_id) {
        active.session.detach();
    }
    state.drain_host_messages(&session_id, &mut guard);
    tracing::info!("Detached recording session {}", session_id);

    Ok(Json(GenericResponse {
        status: "detached".to_string(),
    }))
}

/// Drop a session entirely
pub async fn delete_recording(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<GenericResponse>> {
    state
        .recordings
        .remove(&session_id)
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;
    tracing::info!("Deleted recording session {}", session_id);

    Ok(Json(GenericResponse {
        status: "deleted".to_string(),
    }))
}
