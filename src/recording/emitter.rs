use std::sync::Arc;

use super::host::{Host, HostMessage};
use crate::locator::RECORDING_INDICATOR_LOCATOR;
use crate::models::{CommandRecord, FrameLocation, Locator};

/// The only path by which commands leave the recorder
pub struct CommandEmitter {
    host: Arc<dyn Host>,
    frame_location: FrameLocation,
    closed: bool,
    emitted: usize,
}

impl CommandEmitter {
    pub fn new(host: Arc<dyn Host>, frame_location: FrameLocation) -> Self {
        Self {
            host,
            frame_location,
            closed: false,
            emitted: 0,
        }
    }

    pub fn frame_location(&self) -> &FrameLocation {
        &self.frame_location
    }

    pub fn set_frame_location(&mut self, location: FrameLocation) {
        self.frame_location = location;
    }

    /// Transport failed; nothing more will be delivered
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn reopen(&mut self) {
        self.closed = false;
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Build a command record and deliver it. Returns whether it was delivered.
    pub fn record(
        &mut self,
        command: &str,
        target: Vec<Locator>,
        value: impl Into<String>,
        insert_before_last_command: bool,
        frame_location: Option<FrameLocation>,
    ) -> bool {
        if self.closed {
            tracing::debug!("Dropping {} after transport failure", command);
            return false;
        }
        if target.is_empty() {
            tracing::debug!("Dropping {} with no locator for its target", command);
            return false;
        }
        if target.iter().any(|l| l.value == RECORDING_INDICATOR_LOCATOR) {
            tracing::debug!("Ignoring {} on the recording indicator", command);
            return false;
        }

        let record = CommandRecord {
            command: command.to_string(),
            target,
            value: value.into(),
            insert_before_last_command,
            frame_location: frame_location.unwrap_or_else(|| self.frame_location.clone()),
        };
        tracing::debug!(
            "Recorded {} on {:?} = {:?}",
            record.command,
            record.best_target(),
            record.value
        );

        if self.send(HostMessage::Command(record)) {
            self.emitted += 1;
            true
        } else {
            false
        }
    }

    /// Deliver a message; a failure closes the emitter
    pub fn send(&mut self, message: HostMessage) -> bool {
        if self.closed {
            return false;
        }
        match self.host.send(message) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{}; recording will stop", e);
                self.closed = true;
                false
            }
        }
    }

    /// Deliver a notification whose loss does not end the session
    pub fn notify(&self, message: HostMessage) {
        if let Err(e) = self.host.send(message) {
            tracing::debug!("Notification not delivered: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::host::ChannelHost;

    #[test]
    fn test_record_uses_default_frame_location() {
        let (host, mut rx) = ChannelHost::channel();
        let mut emitter = CommandEmitter::new(Arc::new(host), FrameLocation::from_indices(vec![1]));

        assert!(emitter.record("click", vec![Locator::new("id=go", "id")], "", false, None));
        assert!(emitter.record(
            "click",
            vec![Locator::new("id=go", "id")],
            "",
            true,
            Some(FrameLocation::root())
        ));

        let HostMessage::Command(first) = rx.try_recv().unwrap() else {
            panic!("expected a command");
        };
        assert_eq!(first.frame_location.to_string(), "root:1");
        let HostMessage::Command(second) = rx.try_recv().unwrap() else {
            panic!("expected a command");
        };
        assert_eq!(second.frame_location.to_string(), "root");
        assert!(second.insert_before_last_command);
        assert_eq!(emitter.emitted(), 2);
    }

    #[test]
    fn test_indicator_target_is_dropped() {
        let (host, mut rx) = ChannelHost::channel();
        let mut emitter = CommandEmitter::new(Arc::new(host), FrameLocation::root());

        let target = vec![Locator::new(RECORDING_INDICATOR_LOCATOR, "css:finder")];
        assert!(!emitter.record("click", target, "", false, None));
        assert!(rx.try_recv().is_err());
        assert!(!emitter.is_closed());
    }

    #[test]
    fn test_untargeted_command_is_dropped() {
        let (host, mut rx) = ChannelHost::channel();
        let mut emitter = CommandEmitter::new(Arc::new(host), FrameLocation::root());

        assert!(!emitter.record("click", Vec::new(), "", false, None));
        assert!(rx.try_recv().is_err());
        assert_eq!(emitter.emitted(), 0);
        assert!(!emitter.is_closed());
    }

    #[test]
    fn test_transport_failure_closes() {
        let (host, rx) = ChannelHost::channel();
        drop(rx);
        let mut emitter = CommandEmitter::new(Arc::new(host), FrameLocation::root());

        assert!(!emitter.record("click", vec![Locator::new("id=go", "id")], "", false, None));
        assert!(emitter.is_closed());
        assert_eq!(emitter.emitted(), 0);
    }
}
