use std::collections::HashMap;

use super::queue::MouseoverQueue;
use super::timers::TimerHandle;
use crate::config::RecorderConfig;
use crate::dom::NodeId;
use crate::models::Locator;

/// Single-entry reentrancy guard around `type` synthesis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeLock {
    held: bool,
}

impl TypeLock {
    /// Take the lock if it is free
    pub fn acquire(&mut self) -> bool {
        if self.held {
            return false;
        }
        self.held = true;
        true
    }

    /// Take the lock whether or not it is free
    pub fn hold(&mut self) {
        self.held = true;
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// An element together with the locators it had when it was latched; the
/// node may be gone from the mirror by the time the command is recorded
#[derive(Debug, Clone, PartialEq)]
pub struct LatchedTarget {
    pub target: NodeId,
    pub candidates: Vec<Locator>,
}

/// innerHTML of a contentEditable element when it gained focus
#[derive(Debug, Clone, PartialEq)]
pub struct EditSnapshot {
    pub target: NodeId,
    pub html: String,
}

/// Handles of the re-armable timers, so a new arm can cancel the previous one
#[derive(Debug, Clone, Default)]
pub struct PendingTimers {
    pub clicks: Vec<TimerHandle>,
    pub click_suppression: Option<TimerHandle>,
    pub drag_source: Option<TimerHandle>,
    pub scroll_detector: Option<TimerHandle>,
    pub hover_latch: Option<TimerHandle>,
    pub page_settled: Option<TimerHandle>,
}

/// Per-attachment recording state shared by every handler
#[derive(Debug, Clone)]
pub struct RecordingState {
    // text fields
    pub focus_target: Option<NodeId>,
    pub focus_value: Option<String>,
    pub temp_value: Option<String>,
    pub type_target: Option<NodeId>,
    pub type_lock: TypeLock,
    pub enter_target: Option<NodeId>,
    pub enter_value: Option<String>,
    /// Field that last received arrow-key navigation
    pub tab_check: Option<NodeId>,

    // suppression
    pub prevent_type: bool,
    pub prevent_click: bool,
    pub prevent_click_twice: bool,

    // pointer gestures
    pub pointer_queue: MouseoverQueue,
    pub drag_source: Option<LatchedTarget>,
    /// Selectedness of multi-select options before the current change
    pub option_snapshots: HashMap<NodeId, bool>,

    // page
    pub page_settled: bool,
    pub scroll_detector: Option<NodeId>,
    /// Element count when the pointer last entered an element
    pub now_node: usize,
    /// Clickable element under the pointer, waiting for inserted nodes to turn into `mouseOver`
    pub hover_latch: Option<LatchedTarget>,
    pub mouse_out_target: Option<NodeId>,
    pub edit_snapshot: Option<EditSnapshot>,
    pub context_target: Option<NodeId>,

    pub timers: PendingTimers,
}

impl RecordingState {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            focus_target: None,
            focus_value: None,
            temp_value: None,
            type_target: None,
            type_lock: TypeLock::default(),
            enter_target: None,
            enter_value: None,
            tab_check: None,
            prevent_type: false,
            prevent_click: false,
            prevent_click_twice: false,
            pointer_queue: MouseoverQueue::new(config),
            drag_source: None,
            option_snapshots: HashMap::new(),
            page_settled: true,
            scroll_detector: None,
            now_node: 0,
            hover_latch: None,
            mouse_out_target: None,
            edit_snapshot: None,
            context_target: None,
            timers: PendingTimers::default(),
        }
    }

    /// Drop every reference to nodes that left the page. Latched targets keep
    /// their locators and survive.
    pub fn forget_nodes(&mut self, removed: &[NodeId]) {
        let gone = |slot: &Option<NodeId>| slot.is_some_and(|n| removed.contains(&n));

        if gone(&self.focus_target) {
            self.focus_target = None;
            self.focus_value = None;
            self.temp_value = None;
        }
        if gone(&self.enter_target) {
            self.enter_target = None;
            self.enter_value = None;
        }
        for slot in [
            &mut self.type_target,
            &mut self.tab_check,
            &mut self.scroll_detector,
            &mut self.mouse_out_target,
            &mut self.context_target,
        ] {
            if slot.is_some_and(|n| removed.contains(&n)) {
                *slot = None;
            }
        }
        if self
            .edit_snapshot
            .as_ref()
            .is_some_and(|s| removed.contains(&s.target))
        {
            self.edit_snapshot = None;
        }
        self.option_snapshots.retain(|node, _| !removed.contains(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_lock() {
        let mut lock = TypeLock::default();
        assert!(lock.acquire());
        assert!(!lock.acquire());
        lock.release();
        assert!(!lock.is_held());
        lock.hold();
        lock.hold();
        assert!(!lock.acquire());
    }

    #[test]
    fn test_forget_nodes() {
        let mut state = RecordingState::new(&RecorderConfig::default());
        let (field, option, other) = (NodeId(10), NodeId(11), NodeId(12));
        state.focus_target = Some(field);
        state.focus_value = Some("ada".to_string());
        state.type_target = Some(field);
        state.context_target = Some(other);
        state.option_snapshots.insert(option, true);
        state.option_snapshots.insert(other, false);
        state.drag_source = Some(LatchedTarget {
            target: field,
            candidates: vec![Locator::new("id=f", "id")],
        });

        state.forget_nodes(&[field, option]);

        assert!(state.focus_target.is_none());
        assert!(state.focus_value.is_none());
        assert!(state.type_target.is_none());
        assert_eq!(state.context_target, Some(other));
        assert_eq!(state.option_snapshots.len(), 1);
        assert!(state.option_snapshots.contains_key(&other));
        assert!(state.drag_source.is_some());
    }

    #[test]
    fn test_fresh_state() {
        let state = RecordingState::new(&RecorderConfig::default());
        assert!(state.page_settled);
        assert!(!state.type_lock.is_held());
        assert!(state.pointer_queue.is_empty());
        assert!(state.focus_target.is_none());
    }
}
