use serde::{Deserialize, Serialize};

use super::document::{NodeId, NodeSnapshot, ReadyState};
use super::event::{DomEvent, MutationRecord};

/// One step of what happened in the page, in the order it happened
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PageUpdate {
    Snapshot(NodeSnapshot),
    Remove(NodeId),
    Title(String),
    ReadyState(ReadyState),
    ScrollY(f64),
    Focus(Option<NodeId>),
    Selection(String),
    Event(DomEvent),
    Mutations(Vec<MutationRecord>),
    /// Page clock moved without an event
    Advance(u64),
}
