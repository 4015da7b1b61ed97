//! Structural observers: frame removal and node insertion.

use super::handlers::HandlerContext;
use super::host::HostMessage;
use super::timers::TimerTask;
use crate::dom::MutationRecord;
use crate::locator::RECORDING_INDICATOR_TAG;
use crate::models::Locator;

pub fn observe(ctx: &mut HandlerContext<'_>, records: &[MutationRecord]) {
    frames_removed(ctx, records);
    nodes_inserted(ctx, records);
}

fn frames_removed(ctx: &mut HandlerContext<'_>, records: &[MutationRecord]) {
    let removed_frames = records
        .iter()
        .flat_map(|r| r.removed.iter())
        .filter(|n| n.is_iframe() && n.element_id.as_deref() != Some(RECORDING_INDICATOR_TAG));
    for node in removed_frames {
        tracing::debug!("Frame {:?} removed", node.element_id);
        ctx.emitter.notify(HostMessage::FrameRemoved);
    }
}

fn nodes_inserted(ctx: &mut HandlerContext<'_>, records: &[MutationRecord]) {
    if !ctx.state.page_settled || ctx.document.element_count() <= ctx.state.now_node {
        return;
    }
    if records.iter().all(|r| r.added.is_empty()) {
        return;
    }

    if ctx.state.scroll_detector.is_some() {
        let script = format!("window.scrollTo(0,{})", ctx.document.scroll_y());
        ctx.record_with_target("runScript", vec![Locator::literal(script)], "");

        ctx.state.page_settled = false;
        let previous = ctx.state.timers.page_settled.take();
        let handle = ctx.rearm(previous, ctx.config.scroll_unsettle_ms, TimerTask::PageSettled);
        ctx.state.timers.page_settled = Some(handle);

        clear_scroll_detector(ctx);
        clear_hover_latch(ctx);
    }

    if let Some(latch) = ctx.state.hover_latch.take() {
        ctx.record_with_target("mouseOver", latch.candidates, "");
        ctx.state.mouse_out_target = Some(latch.target);
        clear_hover_latch(ctx);
    }
}

fn clear_scroll_detector(ctx: &mut HandlerContext<'_>) {
    ctx.state.scroll_detector = None;
    if let Some(handle) = ctx.state.timers.scroll_detector.take() {
        ctx.timers.cancel(handle);
    }
}

fn clear_hover_latch(ctx: &mut HandlerContext<'_>) {
    ctx.state.hover_latch = None;
    if let Some(handle) = ctx.state.timers.hover_latch.take() {
        ctx.timers.cancel(handle);
    }
}
