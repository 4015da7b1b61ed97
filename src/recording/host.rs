use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::models::CommandRecord;

/// Messages a recorder sends to its host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Command(CommandRecord),
    FrameRemoved,
    /// The user opened a context menu; the host answers with a command name
    ContextMenuRequested,
}

pub trait Host: Send + Sync {
    fn send(&self, message: HostMessage) -> Result<(), TransportError>;
}

/// Host reached through an in-process channel
#[derive(Debug, Clone)]
pub struct ChannelHost {
    sender: mpsc::UnboundedSender<HostMessage>,
}

impl ChannelHost {
    pub fn new(sender: mpsc::UnboundedSender<HostMessage>) -> Self {
        Self { sender }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Host for ChannelHost {
    fn send(&self, message: HostMessage) -> Result<(), TransportError> {
        self.sender
            .send(message)
            .map_err(|_| TransportError("host receiver dropped".to_string()))
    }
}
