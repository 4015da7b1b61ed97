use serde::{Deserialize, Serialize};

use super::document::NodeId;

pub const KEY_CODE_TAB: u32 = 9;
pub const KEY_CODE_ENTER: u32 = 13;
pub const KEY_CODE_UP: u32 = 38;
pub const KEY_CODE_DOWN: u32 = 40;

/// DOM event types the recorder listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Change,
    Input,
    Click,
    DblClick,
    KeyDown,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOver,
    MouseOut,
    DragStart,
    Drop,
    Scroll,
    ReadyStateChange,
    ContextMenu,
    Focus,
    Blur,
}

impl EventKind {
    /// Whether the event reaches document-level bubble listeners
    pub fn bubbles(self) -> bool {
        !matches!(
            self,
            EventKind::Focus | EventKind::Blur | EventKind::Scroll | EventKind::ReadyStateChange
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Change => "change",
            EventKind::Input => "input",
            EventKind::Click => "click",
            EventKind::DblClick => "dblclick",
            EventKind::KeyDown => "keydown",
            EventKind::MouseDown => "mousedown",
            EventKind::MouseUp => "mouseup",
            EventKind::MouseMove => "mousemove",
            EventKind::MouseOver => "mouseover",
            EventKind::MouseOut => "mouseout",
            EventKind::DragStart => "dragstart",
            EventKind::Drop => "drop",
            EventKind::Scroll => "scroll",
            EventKind::ReadyStateChange => "readystatechange",
            EventKind::ContextMenu => "contextmenu",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
        }
    }
}

/// Propagation phase a listener is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Document-level listener that sees the event on the way down
    Capture,
    /// Listener attached to the target element itself
    Target,
    /// Document-level listener that sees the event on the way up
    Bubble,
}

impl Phase {
    pub const DISPATCH_ORDER: [Phase; 3] = [Phase::Capture, Phase::Target, Phase::Bubble];
}

/// A native UI event observed in the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: NodeId,
    /// Page clock, milliseconds
    pub timestamp_ms: u64,
    #[serde(default)]
    pub button: i16,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub key_code: Option<u32>,
    #[serde(default)]
    pub client_x: f64,
    #[serde(default)]
    pub client_y: f64,
    #[serde(default = "default_trusted")]
    pub is_trusted: bool,
}

fn default_trusted() -> bool {
    true
}

impl DomEvent {
    pub fn new(kind: EventKind, target: NodeId, timestamp_ms: u64) -> Self {
        Self {
            kind,
            target,
            timestamp_ms,
            button: 0,
            alt_key: false,
            key_code: None,
            client_x: 0.0,
            client_y: 0.0,
            is_trusted: true,
        }
    }

    pub fn key(target: NodeId, key_code: u32, timestamp_ms: u64) -> Self {
        Self {
            key_code: Some(key_code),
            ..Self::new(EventKind::KeyDown, target, timestamp_ms)
        }
    }

    pub fn at(mut self, client_x: f64, client_y: f64) -> Self {
        self.client_x = client_x;
        self.client_y = client_y;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }

    pub fn untrusted(mut self) -> Self {
        self.is_trusted = false;
        self
    }
}

/// A node that left the document, as reported by a structural observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedNode {
    pub node_name: String,
    #[serde(default)]
    pub element_id: Option<String>,
}

impl RemovedNode {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            element_id: None,
        }
    }

    pub fn is_iframe(&self) -> bool {
        self.node_name.eq_ignore_ascii_case("iframe")
    }
}

/// One childList mutation batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    #[serde(default)]
    pub added: Vec<NodeId>,
    #[serde(default)]
    pub removed: Vec<RemovedNode>,
}
