//! Frame location: a stable path identifier for the frame a page lives in.
//!
//! The path is built by walking from the current window up through its
//! parents, recording at each level the window's index among its parent's
//! child frames. At the top level the host may have injected its own
//! recording-indicator frame, which must not shift the indices of real frames,
//! so the host is asked once per walk where that frame sits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::FrameError;
pub use crate::models::FrameLocation;

pub type WindowId = usize;

/// Read-only view of the window/frame hierarchy around the current frame
pub trait WindowTree: Send + Sync {
    fn current(&self) -> WindowId;
    fn top(&self) -> WindowId;
    fn parent(&self, window: WindowId) -> Option<WindowId>;
    /// Child frames of `window` in document order
    fn frames(&self, window: WindowId) -> Vec<WindowId>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowEntry {
    pub parent: Option<WindowId>,
    #[serde(default)]
    pub frames: Vec<WindowId>,
}

/// Window hierarchy as reported by the page agent. Window 0 is the top window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameTree {
    windows: Vec<WindowEntry>,
    current: WindowId,
}

impl FrameTree {
    /// A tree holding only the top window, which is also current
    pub fn new() -> Self {
        Self {
            windows: vec![WindowEntry::default()],
            current: 0,
        }
    }

    /// Append a child frame under `parent`
    pub fn add_frame(&mut self, parent: WindowId) -> WindowId {
        let id = self.windows.len();
        self.windows.push(WindowEntry {
            parent: Some(parent),
            frames: Vec::new(),
        });
        if let Some(entry) = self.windows.get_mut(parent) {
            entry.frames.push(id);
        }
        id
    }

    pub fn set_current(&mut self, window: WindowId) {
        self.current = window;
    }
}

impl Default for FrameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowTree for FrameTree {
    fn current(&self) -> WindowId {
        self.current
    }

    fn top(&self) -> WindowId {
        0
    }

    fn parent(&self, window: WindowId) -> Option<WindowId> {
        self.windows.get(window).and_then(|w| w.parent)
    }

    fn frames(&self, window: WindowId) -> Vec<WindowId> {
        self.windows
            .get(window)
            .map(|w| w.frames.clone())
            .unwrap_or_default()
    }
}

/// Host answer to a frame-count request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCount {
    /// Slot taken by the recording-indicator frame among the top window's frames
    pub indicator_index: Option<usize>,
}

/// Host-side coordinator for cross-frame bookkeeping
#[async_trait]
pub trait FrameCoordinator: Send + Sync {
    async fn request_frame_count(&self) -> Result<FrameCount, FrameError>;

    async fn report_frame_location(&self, location: &FrameLocation) -> Result<(), FrameError>;
}

/// Index of a frame once the indicator frame's slot is discounted
pub fn calculate_frame_index(indicator_index: Option<usize>, target_index: usize) -> usize {
    match indicator_index {
        Some(indicator) if indicator < target_index => target_index - 1,
        _ => target_index,
    }
}

pub struct FrameLocator {
    tree: Arc<dyn WindowTree>,
    coordinator: Arc<dyn FrameCoordinator>,
    request_timeout: Duration,
    resolved: Option<FrameLocation>,
}

impl FrameLocator {
    pub fn new(
        tree: Arc<dyn WindowTree>,
        coordinator: Arc<dyn FrameCoordinator>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            tree,
            coordinator,
            request_timeout,
            resolved: None,
        }
    }

    pub fn resolved(&self) -> Option<&FrameLocation> {
        self.resolved.as_ref()
    }

    /// Resolve the frame location, reusing an earlier result
    pub async fn resolve(&mut self) -> FrameLocation {
        if let Some(location) = &self.resolved {
            return location.clone();
        }

        let location = self.walk().await;
        if let Err(e) = self.coordinator.report_frame_location(&location).await {
            tracing::warn!("Failed to report frame location {}: {}", location, e);
        }
        tracing::debug!("Resolved frame location {}", location);
        self.resolved = Some(location.clone());
        location
    }

    /// Forget the cached location and resolve again
    pub async fn recalculate(&mut self) -> FrameLocation {
        self.resolved = None;
        self.resolve().await
    }

    async fn walk(&self) -> FrameLocation {
        let top = self.tree.top();
        let mut current = self.tree.current();
        let mut indices = Vec::new();
        let mut indicator_index = None;
        let mut frame_count_requested = false;

        while current != top {
            let Some(parent) = self.tree.parent(current) else {
                break;
            };
            let frames = self.tree.frames(parent);
            if frames.is_empty() {
                break;
            }

            if parent == top && !frame_count_requested {
                frame_count_requested = true;
                indicator_index = self.indicator_index().await;
            }

            let Some(idx) = frames.iter().position(|f| *f == current) else {
                tracing::warn!("Window {} is not listed among its parent's frames", current);
                break;
            };
            indices.push(calculate_frame_index(indicator_index, idx));
            current = parent;
        }

        indices.reverse();
        FrameLocation::from_indices(indices)
    }

    async fn indicator_index(&self) -> Option<usize> {
        match tokio::time::timeout(self.request_timeout, self.coordinator.request_frame_count()).await
        {
            Ok(Ok(count)) => count.indicator_index,
            Ok(Err(e)) => {
                tracing::warn!("Frame count request failed, continuing without it: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "{}",
                    FrameError::Timeout(self.request_timeout.as_millis() as u64)
                );
                None
            }
        }
    }
}
