use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, Mutex};

use crate::config::Config;
use crate::error::{AppError, FrameError};
use crate::frame::{FrameCoordinator, FrameCount, FrameLocator};
use crate::locator::{BasicLocatorBuilder, LocatorBuilder};
use crate::models::{CommandRecord, FrameLocation, RecordingSession};
use crate::recording::{HostMessage, Recorder};

/// WebSocket event types broadcast to clients
#[derive(Debug, Clone)]
pub enum WsEvent {
    RecordedCommand {
        session_id: String,
        command: CommandRecord,
    },
    FrameRemoved {
        session_id: String,
    },
    ContextMenu {
        session_id: String,
    },
    FrameLocation {
        session_id: String,
        frame_location: FrameLocation,
    },
    Error {
        session_id: String,
        error: String,
    },
    Pong,
}

/// Connected WebSocket client info
#[derive(Debug)]
pub struct ConnectedClient {
    pub connected_at: Instant,
}

/// Recorder of one session together with the receiving end of its host channel
pub struct RecordingHandle {
    pub recorder: Recorder,
    pub frames: FrameLocator,
    pub host_rx: mpsc::UnboundedReceiver<HostMessage>,
}

/// Active recording with its session
pub struct ActiveRecording {
    pub handle: Arc<Mutex<RecordingHandle>>,
    pub session: RecordingSession,
    /// Optional client ID that started this recording
    pub client_id: Option<String>,
}

/// Answers frame coordination for one session from what the client reported at creation
pub struct SessionCoordinator {
    session_id: String,
    indicator_index: Option<usize>,
    ws_broadcast: broadcast::Sender<WsEvent>,
}

impl SessionCoordinator {
    pub fn new(
        session_id: String,
        indicator_index: Option<usize>,
        ws_broadcast: broadcast::Sender<WsEvent>,
    ) -> Self {
        Self {
            session_id,
            indicator_index,
            ws_broadcast,
        }
    }
}

#[async_trait]
impl FrameCoordinator for SessionCoordinator {
    async fn request_frame_count(&self) -> Result<FrameCount, FrameError> {
        Ok(FrameCount {
            indicator_index: self.indicator_index,
        })
    }

    async fn report_frame_location(&self, location: &FrameLocation) -> Result<(), FrameError> {
        // Ignore send errors (no receivers)
        let _ = self.ws_broadcast.send(WsEvent::FrameLocation {
            session_id: self.session_id.clone(),
            frame_location: location.clone(),
        });
        Ok(())
    }
}

/// Shared application state
pub struct AppState {
    pub config: Config,

    /// Active recording sessions: session_id -> recording
    pub recordings: DashMap<String, ActiveRecording>,

    /// Connected WebSocket clients: client_id -> client info
    pub connected_clients: DashMap<String, ConnectedClient>,

    /// Total connection count (for metrics)
    connection_count: AtomicUsize,

    /// Broadcast channel for WebSocket events
    pub ws_broadcast: broadcast::Sender<WsEvent>,

    pub locators: Arc<dyn LocatorBuilder>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let (tx, _) = broadcast::channel(1024);

        Self {
            config,
            recordings: DashMap::new(),
            connected_clients: DashMap::new(),
            connection_count: AtomicUsize::new(0),
            ws_broadcast: tx,
            locators: Arc::new(BasicLocatorBuilder::new()),
        }
    }

    pub fn broadcast(&self, event: WsEvent) {
        // Ignore send errors (no receivers)
        let _ = self.ws_broadcast.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.ws_broadcast.subscribe()
    }

    /// Handle of a session, without holding the map entry across awaits
    pub fn recording_handle(&self, session_id: &str) -> Result<Arc<Mutex<RecordingHandle>>, AppError> {
        self.recordings
            .get(session_id)
            .map(|active| Arc::clone(&active.handle))
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))
    }

    /// Move everything the recorder sent to its host into the session and out to clients
    pub fn drain_host_messages(&self, session_id: &str, handle: &mut RecordingHandle) {
        while let Ok(message) = handle.host_rx.try_recv() {
            match message {
                HostMessage::Command(command) => {
                    if let Some(mut active) = self.recordings.get_mut(session_id) {
                        active.session.add_command(command.clone());
                    }
                    self.broadcast(WsEvent::RecordedCommand {
                        session_id: session_id.to_string(),
                        command,
                    });
                }
                HostMessage::FrameRemoved => {
                    if let Some(mut active) = self.recordings.get_mut(session_id) {
                        active.session.frames_removed += 1;
                    }
                    self.broadcast(WsEvent::FrameRemoved {
                        session_id: session_id.to_string(),
                    });
                }
                HostMessage::ContextMenuRequested => {
                    self.broadcast(WsEvent::ContextMenu {
                        session_id: session_id.to_string(),
                    });
                }
            }
        }

        if !handle.recorder.is_attached() {
            if let Some(mut active) = self.recordings.get_mut(session_id) {
                if active.session.is_recording() {
                    let error = "host transport closed".to_string();
                    tracing::warn!("Recording session {} lost its host", session_id);
                    active.session.fail(error.clone());
                    drop(active);
                    self.broadcast(WsEvent::Error {
                        session_id: session_id.to_string(),
                        error,
                    });
                }
            }
        }
    }

    /// Register a WebSocket client connection
    pub fn client_connected(&self, client_id: &str) {
        self.connected_clients.insert(
            client_id.to_string(),
            ConnectedClient {
                connected_at: Instant::now(),
            },
        );
        let count = self.connection_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            "Client {} connected (total: {}, active: {})",
            client_id,
            count,
            self.connected_clients.len()
        );
    }

    /// Unregister a WebSocket client connection and drop the recordings it started
    pub fn client_disconnected(&self, client_id: &str) {
        if let Some((_, client)) = self.connected_clients.remove(client_id) {
            let duration = client.connected_at.elapsed();
            tracing::debug!(
                "Client {} disconnected after {:?} (active: {})",
                client_id,
                duration,
                self.connected_clients.len()
            );
        }

        self.recordings.retain(|session_id, active| {
            let keep = active.client_id.as_deref() != Some(client_id);
            if !keep {
                tracing::info!("Cleaning up orphaned recording session: {}", session_id);
            }
            keep
        });
    }

    pub fn active_connection_count(&self) -> usize {
        self.connected_clients.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
