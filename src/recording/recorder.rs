use std::sync::Arc;

use super::emitter::CommandEmitter;
use super::handlers::{self, content, HandlerContext, HandlerRegistry};
use super::host::Host;
use super::mutations;
use super::state::RecordingState;
use super::timers::TimerQueue;
use crate::config::RecorderConfig;
use crate::dom::{Document, DomEvent, MutationRecord, PageUpdate, Phase};
use crate::locator::LocatorBuilder;
use crate::models::FrameLocation;

/// Interprets the events of one frame and turns them into commands.
///
/// The recorder is synchronous. Deferred work runs on the page clock: before an
/// event is handled every timer due at its timestamp fires, and
/// [`Recorder::advance`] fires timers without an event.
pub struct Recorder {
    config: RecorderConfig,
    document: Document,
    locators: Arc<dyn LocatorBuilder>,
    registry: HandlerRegistry,
    emitter: CommandEmitter,
    timers: TimerQueue,
    state: Option<RecordingState>,
    now_ms: u64,
}

/// Build the handler context from disjoint borrows of the recorder's fields
macro_rules! context {
    ($self:ident, $state:ident, $now:expr) => {
        HandlerContext {
            state: $state,
            document: &$self.document,
            locators: $self.locators.as_ref(),
            timers: &mut $self.timers,
            emitter: &mut $self.emitter,
            config: &$self.config,
            now_ms: $now,
        }
    };
}

impl Recorder {
    pub fn new(
        document: Document,
        locators: Arc<dyn LocatorBuilder>,
        host: Arc<dyn Host>,
        config: RecorderConfig,
    ) -> Self {
        Self {
            config,
            document,
            locators,
            registry: HandlerRegistry::standard(),
            emitter: CommandEmitter::new(host, FrameLocation::root()),
            timers: TimerQueue::new(),
            state: None,
            now_ms: 0,
        }
    }

    /// Start recording with fresh state. No-op when already attached.
    pub fn attach(&mut self) {
        if self.state.is_some() {
            return;
        }
        self.emitter.reopen();
        self.state = Some(RecordingState::new(&self.config));
        tracing::info!("Recorder attached in frame {}", self.emitter.frame_location());
    }

    /// Stop recording and discard all state and pending timers
    pub fn detach(&mut self) {
        if self.state.take().is_some() {
            tracing::info!("Recorder detached from frame {}", self.emitter.frame_location());
        }
        self.timers.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&RecordingState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut RecordingState> {
        self.state.as_mut()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn frame_location(&self) -> &FrameLocation {
        self.emitter.frame_location()
    }

    pub fn set_frame_location(&mut self, location: FrameLocation) {
        self.emitter.set_frame_location(location);
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn emitted(&self) -> usize {
        self.emitter.emitted()
    }

    /// Run every handler registered for the event, capture phase first
    pub fn dispatch(&mut self, event: &DomEvent) {
        if self.state.is_none() {
            return;
        }
        self.advance(event.timestamp_ms);

        let Some(state) = self.state.as_mut() else {
            return;
        };
        let mut ctx = context!(self, state, event.timestamp_ms);
        for phase in Phase::DISPATCH_ORDER {
            if phase == Phase::Bubble && !event.kind.bubbles() {
                continue;
            }
            for registration in self.registry.handlers_for(event.kind, phase) {
                tracing::trace!("{} handles {}", registration.name, event.kind.as_str());
                (registration.handler)(&mut ctx, event);
            }
        }
        self.detach_if_closed();
    }

    /// Fire every timer due at or before `now_ms`
    pub fn advance(&mut self, now_ms: u64) {
        while let Some((handle, at_ms, task)) = self.timers.pop_due(now_ms) {
            let Some(state) = self.state.as_mut() else {
                break;
            };
            let mut ctx = context!(self, state, at_ms);
            handlers::run_task(&mut ctx, handle, task);
        }
        self.now_ms = self.now_ms.max(now_ms);
        self.detach_if_closed();
    }

    pub fn observe_mutations(&mut self, records: &[MutationRecord]) {
        let now_ms = self.now_ms;
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let mut ctx = context!(self, state, now_ms);
        mutations::observe(&mut ctx, records);
        self.detach_if_closed();
    }

    /// Host answer to a context-menu request
    pub fn apply_context_command(&mut self, command: &str) {
        let now_ms = self.now_ms;
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let mut ctx = context!(self, state, now_ms);
        content::apply_context_command(&mut ctx, command);
        self.detach_if_closed();
    }

    /// Apply one page step: mirror changes go to the document, events and
    /// mutations go through the handlers
    pub fn apply(&mut self, update: PageUpdate) {
        match update {
            PageUpdate::Snapshot(snapshot) => self.document.apply_snapshot(snapshot),
            PageUpdate::Remove(node) => {
                let removed = self.document.remove(node);
                if let Some(state) = self.state.as_mut() {
                    state.forget_nodes(&removed);
                }
            }
            PageUpdate::Title(title) => self.document.set_title(title),
            PageUpdate::ReadyState(ready) => self.document.set_ready_state(ready),
            PageUpdate::ScrollY(y) => self.document.set_scroll_y(y),
            PageUpdate::Focus(node) => self.document.set_active_element(node),
            PageUpdate::Selection(text) => self.document.set_window_selection(text),
            PageUpdate::Event(event) => self.dispatch(&event),
            PageUpdate::Mutations(records) => self.observe_mutations(&records),
            PageUpdate::Advance(now_ms) => self.advance(now_ms),
        }
    }

    fn detach_if_closed(&mut self) {
        if self.emitter.is_closed() && self.state.is_some() {
            tracing::warn!("Host unreachable, stopping recording");
            self.detach();
        }
    }
}
