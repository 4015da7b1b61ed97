//! Page model: a mirror of one frame's DOM plus the events observed in it.

pub mod document;
pub mod event;
pub mod update;

pub use document::{normalize_spaces, Document, DomRect, Node, NodeId, NodeSnapshot, ReadyState};
pub use event::{DomEvent, EventKind, MutationRecord, Phase, RemovedNode};
pub use update::PageUpdate;
