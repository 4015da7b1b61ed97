use serde::Serialize;

use super::command::{CommandRecord, FrameLocation};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub active_recordings: usize,
    pub connected_clients: usize,
}

#[derive(Debug, Serialize)]
pub struct CreateRecordingResponse {
    pub session_id: String,
    pub status: String,
    pub frame_location: FrameLocation,
}

#[derive(Debug, Serialize)]
pub struct RecordingStatusResponse {
    pub session_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_location: Option<FrameLocation>,
    pub command_count: usize,
    pub commands: Vec<CommandRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// Commands emitted while handling the batch
    pub emitted: usize,
    pub attached: bool,
    pub pending_timers: usize,
}

#[derive(Debug, Serialize)]
pub struct FrameLocationResponse {
    pub frame_location: FrameLocation,
}

#[derive(Debug, Serialize)]
pub struct GenericResponse {
    pub status: String,
}

/// One command a playback would hand to the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStep {
    pub test: String,
    pub index: usize,
    pub command: String,
    pub target: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct PlaybackPlanResponse {
    pub entry: String,
    pub steps: Vec<PlannedStep>,
    pub max_depth: usize,
}
