//! Event handlers of the recording state machine.
//!
//! Each handler is a plain function registered for an `(EventKind, Phase)`
//! pair. Handlers never see each other; they coordinate only through the
//! [`RecordingState`] carried in the [`HandlerContext`] they are given, so a
//! mutation made by an earlier handler is visible to a later one in the same
//! event turn.

pub mod content;
pub mod hover;
pub mod input;
pub mod pointer;
pub mod select;

use std::collections::HashMap;

use super::emitter::CommandEmitter;
use super::state::RecordingState;
use super::timers::{TimerHandle, TimerQueue, TimerTask};
use crate::config::RecorderConfig;
use crate::dom::{Document, DomEvent, EventKind, NodeId, Phase};
use crate::locator::LocatorBuilder;
use crate::models::Locator;

/// Everything a handler may read or change during one event turn
pub struct HandlerContext<'a> {
    pub state: &'a mut RecordingState,
    pub document: &'a Document,
    pub locators: &'a dyn LocatorBuilder,
    pub timers: &'a mut TimerQueue,
    pub emitter: &'a mut CommandEmitter,
    pub config: &'a RecorderConfig,
    /// Page clock for this turn
    pub now_ms: u64,
}

impl HandlerContext<'_> {
    pub fn candidates(&self, node: NodeId) -> Vec<Locator> {
        self.locators.build_all(self.document, node)
    }

    /// Emit a command targeting `node`
    pub fn record(&mut self, command: &str, node: NodeId, value: impl Into<String>) {
        let target = self.candidates(node);
        self.emitter.record(command, target, value, false, None);
    }

    pub fn record_with_target(&mut self, command: &str, target: Vec<Locator>, value: impl Into<String>) {
        self.emitter.record(command, target, value, false, None);
    }

    pub fn schedule(&mut self, delay_ms: u64, task: TimerTask) -> TimerHandle {
        self.timers.schedule(self.now_ms + delay_ms, task)
    }

    /// Cancel `previous` (if still pending) and schedule `task` anew
    pub fn rearm(&mut self, previous: Option<TimerHandle>, delay_ms: u64, task: TimerTask) -> TimerHandle {
        if let Some(handle) = previous {
            self.timers.cancel(handle);
        }
        self.schedule(delay_ms, task)
    }

    /// Ignore clicks for the suppression window
    pub fn skip_click(&mut self) {
        self.state.prevent_click = true;
        let previous = self.state.timers.click_suppression.take();
        let handle = self.rearm(
            previous,
            self.config.click_suppression_ms,
            TimerTask::ReleaseClickSuppression,
        );
        self.state.timers.click_suppression = Some(handle);
    }
}

pub type HandlerFn = fn(&mut HandlerContext<'_>, &DomEvent);

#[derive(Clone)]
pub struct Registration {
    pub name: &'static str,
    pub handler: HandlerFn,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration").field("name", &self.name).finish()
    }
}

/// Handlers keyed by event kind and phase, kept in registration order
#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<(EventKind, Phase), Vec<Registration>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, kind: EventKind, phase: Phase, handler: HandlerFn) {
        self.handlers
            .entry((kind, phase))
            .or_default()
            .push(Registration { name, handler });
    }

    pub fn handlers_for(&self, kind: EventKind, phase: Phase) -> &[Registration] {
        self.handlers
            .get(&(kind, phase))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The full recording handler set
    pub fn standard() -> Self {
        use EventKind::*;
        use Phase::*;

        let mut r = Self::new();
        r.register("type", Change, Bubble, input::commit_on_change);
        r.register("type", Input, Bubble, input::track_type_target);
        r.register("clickAt", Click, Capture, pointer::click);
        r.register("doubleClickAt", DblClick, Capture, pointer::double_click);
        r.register("sendKeys", KeyDown, Capture, input::send_keys);
        r.register("mouseMove", MouseMove, Bubble, pointer::mouse_move);
        r.register("dragAndDrop", MouseDown, Capture, pointer::mouse_down);
        r.register("dragAndDrop", MouseUp, Capture, pointer::mouse_up);
        r.register("dragAndDropToObject", DragStart, Capture, pointer::drag_start);
        r.register("dragAndDropToObject", Drop, Capture, pointer::drop_on_target);
        r.register("runScript", Scroll, Capture, hover::scroll);
        r.register("mouseOver", MouseOver, Capture, hover::mouse_over);
        r.register("mouseOut", MouseOut, Capture, hover::mouse_out);
        r.register("checkPageLoaded", ReadyStateChange, Capture, hover::ready_state_change);
        r.register("contextMenu", ContextMenu, Capture, content::context_menu);
        r.register("editContent", Focus, Capture, content::edit_focus);
        r.register("editContent", Blur, Capture, content::edit_blur);
        r.register("select", Focus, Capture, select::snapshot_on_focus);
        r.register("select", Change, Bubble, select::commit_on_change);
        r.register("focusTracking", Focus, Target, input::focus_field);
        r.register("focusTracking", Blur, Target, input::blur_field);
        r
    }
}

/// Run a timer task that came due
pub fn run_task(ctx: &mut HandlerContext<'_>, handle: TimerHandle, task: TimerTask) {
    match task {
        TimerTask::EmitClick { target, at } => {
            ctx.state.timers.clicks.retain(|h| *h != handle);
            pointer::emit_click(ctx, target, at);
        }
        TimerTask::ExpireEnterTarget { target } => {
            if ctx.state.enter_value.as_deref() != ctx.document.value(target) {
                ctx.state.enter_target = None;
            }
        }
        TimerTask::RefreshTempValue => {
            if let Some(focused) = ctx.state.focus_target {
                ctx.state.temp_value = ctx.document.value(focused).map(str::to_string);
            }
        }
        TimerTask::ReleaseClickSuppression => {
            ctx.state.prevent_click = false;
            ctx.state.timers.click_suppression = None;
        }
        TimerTask::LatchDragSource { source } => {
            ctx.state.drag_source = Some(source);
            ctx.state.timers.drag_source = None;
        }
        TimerTask::ClearScrollDetector => {
            ctx.state.scroll_detector = None;
            ctx.state.timers.scroll_detector = None;
        }
        TimerTask::ClearHoverLatch => {
            ctx.state.hover_latch = None;
            ctx.state.timers.hover_latch = None;
        }
        TimerTask::PageSettled => {
            ctx.state.page_settled = true;
            ctx.state.timers.page_settled = None;
        }
    }
}

/// Input types that take typed text
pub const TEXT_INPUT_TYPES: &[&str] = &[
    "text",
    "password",
    "file",
    "datetime",
    "datetime-local",
    "date",
    "month",
    "time",
    "week",
    "number",
    "range",
    "email",
    "url",
    "search",
    "tel",
    "color",
];

pub fn is_text_input(document: &Document, node: NodeId) -> bool {
    document.tag_name(node) == Some("input")
        && document
            .input_type(node)
            .is_some_and(|t| TEXT_INPUT_TYPES.contains(&t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut HandlerContext<'_>, _: &DomEvent) {}

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = HandlerRegistry::new();
        registry.register("first", EventKind::Change, Phase::Bubble, noop);
        registry.register("second", EventKind::Change, Phase::Bubble, noop);
        registry.register("other", EventKind::Change, Phase::Capture, noop);

        let names: Vec<&str> = registry
            .handlers_for(EventKind::Change, Phase::Bubble)
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(registry.handlers_for(EventKind::Drop, Phase::Bubble).is_empty());
    }

    #[test]
    fn test_standard_change_handlers_run_type_before_select() {
        let registry = HandlerRegistry::standard();
        let names: Vec<&str> = registry
            .handlers_for(EventKind::Change, Phase::Bubble)
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["type", "select"]);

        let focus: Vec<&str> = registry
            .handlers_for(EventKind::Focus, Phase::Capture)
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(focus, vec!["editContent", "select"]);
    }

    #[test]
    fn test_text_input_types() {
        let mut doc = Document::new("Page");
        let text = doc.create_element(doc.body(), "input");
        let checkbox = doc.create_element(doc.body(), "input");
        doc.set_attribute(checkbox, "type", "checkbox");
        let area = doc.create_element(doc.body(), "textarea");

        assert!(is_text_input(&doc, text));
        assert!(!is_text_input(&doc, checkbox));
        assert!(!is_text_input(&doc, area));
    }
}
