use crate::config::RecorderConfig;
use crate::dom::{EventKind, NodeId};

/// One pointer event kept while a gesture is in progress
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub kind: EventKind,
    pub timestamp_ms: u64,
    pub target: NodeId,
    /// Pointer position relative to the target's bounding box
    pub local: (f64, f64),
    pub button: i16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSummary {
    pub is_drag: bool,
    /// The gesture carried entries between press and release
    pub is_multi_step: bool,
    pub duration_ms: u64,
    pub first_point: (f64, f64),
    pub last_point: (f64, f64),
}

/// Rolling buffer of the pointer events of the current gesture
#[derive(Debug, Clone)]
pub struct MouseoverQueue {
    entries: Vec<QueueEntry>,
    jitter_distance_px: f64,
    jitter_interval_ms: u64,
    drag_threshold_ms: u64,
}

impl MouseoverQueue {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            entries: Vec::new(),
            jitter_distance_px: config.jitter_distance_px,
            jitter_interval_ms: config.jitter_interval_ms,
            drag_threshold_ms: config.drag_threshold_ms,
        }
    }

    /// Returns whether the entry was kept
    pub fn push(&mut self, entry: QueueEntry) -> bool {
        match self.entries.last() {
            None if entry.kind != EventKind::MouseDown => return false,
            Some(last) if last.kind == entry.kind && last.target == entry.target => {
                let dx = (last.local.0 - entry.local.0).abs();
                let dy = (last.local.1 - entry.local.1).abs();
                let dt = entry.timestamp_ms.saturating_sub(last.timestamp_ms);
                if dx < self.jitter_distance_px
                    && dy < self.jitter_distance_px
                    && dt < self.jitter_interval_ms
                {
                    return false;
                }
            }
            _ => {}
        }
        self.entries.push(entry);
        true
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&QueueEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&QueueEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn classify(&self) -> Option<GestureSummary> {
        let first = self.entries.first()?;
        let last = self.entries.last()?;
        let duration_ms = last.timestamp_ms.saturating_sub(first.timestamp_ms);
        Some(GestureSummary {
            is_drag: self.entries.len() > 1 && duration_ms > self.drag_threshold_ms,
            is_multi_step: self.entries.len() > 2,
            duration_ms,
            first_point: first.local,
            last_point: last.local,
        })
    }
}
