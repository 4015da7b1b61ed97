use crate::dom::NodeId;
use crate::models::Locator;
use crate::recording::state::LatchedTarget;

/// Handle to a scheduled one-shot task; cancelling it is always safe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Deferred continuations the recorder schedules on the page clock
#[derive(Debug, Clone, PartialEq)]
pub enum TimerTask {
    /// Commit a single click unless a double click arrived meanwhile
    EmitClick {
        target: Vec<Locator>,
        /// Element-local point for `clickAt`; a plain `click` when absent
        at: Option<(f64, f64)>,
    },
    /// Drop the pending Enter target if its field moved away from the Enter-time value
    ExpireEnterTarget { target: NodeId },
    /// Re-read the focused field after an arrow key changed it
    RefreshTempValue,
    ReleaseClickSuppression,
    LatchDragSource { source: LatchedTarget },
    ClearScrollDetector,
    ClearHoverLatch,
    PageSettled,
}

#[derive(Debug, Clone)]
struct Scheduled {
    at_ms: u64,
    handle: TimerHandle,
    task: TimerTask,
}

/// Virtual-time timer queue.
///
/// Tasks fire in deadline order; tasks sharing a deadline fire in the order
/// they were scheduled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<Scheduled>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at_ms: u64, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Scheduled {
            at_ms,
            handle,
            task,
        });
        handle
    }

    /// Returns false if the task already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Remove and return the earliest task due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerHandle, u64, TimerTask)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.at_ms <= now_ms)
            .min_by_key(|(_, e)| (e.at_ms, e.handle.0))
            .map(|(i, _)| i)?;
        let entry = self.entries.remove(idx);
        Some((entry.handle, entry.at_ms, entry.task))
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.at_ms).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_then_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(300, TimerTask::PageSettled);
        timers.schedule(100, TimerTask::ClearHoverLatch);
        timers.schedule(100, TimerTask::ClearScrollDetector);

        let fired: Vec<TimerTask> = std::iter::from_fn(|| timers.pop_due(1000).map(|(_, _, t)| t)).collect();
        assert_eq!(
            fired,
            vec![
                TimerTask::ClearHoverLatch,
                TimerTask::ClearScrollDetector,
                TimerTask::PageSettled
            ]
        );
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut timers = TimerQueue::new();
        timers.schedule(200, TimerTask::RefreshTempValue);
        assert!(timers.pop_due(199).is_none());
        assert_eq!(timers.next_deadline(), Some(200));
        assert!(timers.pop_due(200).is_some());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule(50, TimerTask::ReleaseClickSuppression);
        assert!(timers.is_pending(handle));
        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert!(timers.pop_due(1000).is_none());
    }
}
