use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    /// Upper bound for a frame-count request before frame resolution proceeds without it
    pub frame_count_timeout_ms: u64,
    /// Nesting limit for test routines calling each other during playback
    pub max_call_depth: usize,
    pub recorder: RecorderConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            host: env::var("HOST").unwrap_or(defaults.host),
            frame_count_timeout_ms: env::var("FRAME_COUNT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.frame_count_timeout_ms),
            max_call_depth: env::var("MAX_CALL_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_call_depth),
            recorder: RecorderConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8765,
            host: "127.0.0.1".to_string(),
            frame_count_timeout_ms: 1000,
            max_call_depth: 64,
            recorder: RecorderConfig::default(),
        }
    }
}

/// Timing and distance thresholds used while interpreting page events.
///
/// All durations are milliseconds on the page clock (event timestamps).
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Delay before a single click is committed, so a double click can cancel it
    pub click_delay_ms: u64,
    /// Minimum press-to-release time for a pointer gesture to count as a drag
    pub drag_threshold_ms: u64,
    /// Window after Enter, drags and multi-select changes during which clicks are ignored
    pub click_suppression_ms: u64,
    /// Delay before a pending Enter target is dropped if the field value moved
    pub enter_check_ms: u64,
    /// Delay before the last-known field value is refreshed after an arrow key
    pub arrow_refresh_ms: u64,
    /// Delay before a dragstart source becomes eligible for a drop
    pub drag_source_latch_ms: u64,
    /// Lifetime of a scroll observation waiting for inserted nodes
    pub scroll_window_ms: u64,
    /// Lifetime of a hover latch waiting for inserted nodes
    pub hover_window_ms: u64,
    /// Quiet period after the last ready-state change before the page is settled
    pub settle_delay_ms: u64,
    /// How long the page stays unsettled after a synthesized scroll command
    pub scroll_unsettle_ms: u64,
    /// Pointer entries of the same kind and target closer than this are coalesced
    pub jitter_distance_px: f64,
    /// Pointer entries of the same kind and target sooner than this are coalesced
    pub jitter_interval_ms: u64,
    /// Bound for every upward DOM walk
    pub max_ancestor_depth: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            click_delay_ms: 200,
            drag_threshold_ms: 200,
            click_suppression_ms: 500,
            enter_check_ms: 50,
            arrow_refresh_ms: 250,
            drag_source_latch_ms: 200,
            scroll_window_ms: 500,
            hover_window_ms: 500,
            settle_delay_ms: 1500,
            scroll_unsettle_ms: 550,
            jitter_distance_px: 5.0,
            jitter_interval_ms: 50,
            max_ancestor_depth: 512,
        }
    }
}
