use serde::Deserialize;

use crate::dom::PageUpdate;
use crate::frame::FrameTree;
use crate::playback::TestCase;

#[derive(Debug, Deserialize)]
pub struct CreateRecordingRequest {
    #[serde(default)]
    pub title: String,
    /// Window hierarchy around the recorded frame; the top window when absent
    pub frame_tree: Option<FrameTree>,
    /// Slot of the recording-indicator frame among the top window's frames
    pub indicator_index: Option<usize>,
    /// Optional client ID for routing WebSocket messages
    pub client_id: Option<String>,
}

/// Page steps observed since the last batch
#[derive(Debug, Deserialize)]
pub struct PageBatch {
    #[serde(default)]
    pub updates: Vec<PageUpdate>,
    /// Page clock at the end of the batch; due timers fire up to it
    pub now_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ContextCommandRequest {
    pub command: String,
}

/// Test cases of a project and the one to start from
#[derive(Debug, Deserialize)]
pub struct PlaybackPlanRequest {
    pub tests: Vec<TestCase>,
    pub entry: String,
}
