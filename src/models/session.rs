use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::command::{CommandRecord, FrameLocation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSession {
    pub id: String,
    pub title: String,
    #[serde(default = "default_status")]
    pub status: String, // "pending", "recording", "detached", "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_location: Option<FrameLocation>,
    #[serde(default)]
    pub commands: Vec<CommandRecord>,
    #[serde(default)]
    pub frames_removed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    "pending".to_string()
}

impl RecordingSession {
    pub fn new(title: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            status: "pending".to_string(),
            frame_location: None,
            commands: Vec::new(),
            frames_removed: 0,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self, frame_location: FrameLocation) {
        self.status = "recording".to_string();
        self.frame_location = Some(frame_location);
        self.started_at = Some(Utc::now());
    }

    pub fn detach(&mut self) {
        self.status = "detached".to_string();
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: String) {
        self.status = "error".to_string();
        self.error = Some(error);
        self.completed_at = Some(Utc::now());
    }

    pub fn is_recording(&self) -> bool {
        self.status == "recording"
    }

    pub fn add_command(&mut self, command: CommandRecord) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let mut session = RecordingSession::new("Checkout".to_string());
        assert_eq!(session.status, "pending");
        assert!(!session.is_recording());

        session.start(FrameLocation::from_indices(vec![0]));
        assert!(session.is_recording());
        assert!(session.started_at.is_some());

        session.fail("host gone".to_string());
        assert_eq!(session.status, "error");
        assert_eq!(session.error.as_deref(), Some("host gone"));
        assert!(session.completed_at.is_some());
    }
}
