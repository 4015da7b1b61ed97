//! Pointer gestures: click arbitration, pointer drags and object drags.

use super::HandlerContext;
use crate::dom::{DomEvent, EventKind};
use crate::models::Locator;
use crate::recording::queue::QueueEntry;
use crate::recording::state::LatchedTarget;
use crate::recording::timers::TimerTask;

fn queue_entry(ctx: &HandlerContext<'_>, event: &DomEvent) -> QueueEntry {
    QueueEntry {
        kind: event.kind,
        timestamp_ms: event.timestamp_ms,
        target: event.target,
        local: ctx
            .document
            .bounds(event.target)
            .local_point(event.client_x, event.client_y),
        button: event.button,
    }
}

/// Offer the event to the gesture queue
pub(crate) fn enqueue(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    let entry = queue_entry(ctx, event);
    ctx.state.pointer_queue.push(entry);
}

fn xy(point: (f64, f64)) -> String {
    format!("{},{}", point.0, point.1)
}

pub fn click(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    if event.button != 0 || ctx.state.prevent_click || !event.is_trusted {
        return;
    }
    ctx.state.prevent_click_twice = false;
    let at = event.alt_key.then(|| {
        ctx.document
            .bounds(event.target)
            .local_point(event.client_x, event.client_y)
    });
    // locators are taken now; the click may remove its own target
    let target = ctx.candidates(event.target);
    let handle = ctx.schedule(ctx.config.click_delay_ms, TimerTask::EmitClick { target, at });
    ctx.state.timers.clicks.push(handle);
}

/// Deferred half of [`click`]
pub(crate) fn emit_click(ctx: &mut HandlerContext<'_>, target: Vec<Locator>, at: Option<(f64, f64)>) {
    if ctx.state.prevent_click_twice {
        return;
    }
    match at {
        Some(local) => ctx.record_with_target("clickAt", target, xy(local)),
        None => ctx.record_with_target("click", target, ""),
    }
}

pub fn double_click(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    ctx.state.prevent_click_twice = true;
    for handle in std::mem::take(&mut ctx.state.timers.clicks) {
        ctx.timers.cancel(handle);
    }
    if event.alt_key {
        let local = ctx
            .document
            .bounds(event.target)
            .local_point(event.client_x, event.client_y);
        ctx.record("doubleClickAt", event.target, xy(local));
    } else {
        ctx.record("doubleClick", event.target, "");
    }
}

pub fn mouse_move(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    enqueue(ctx, event);
}

pub fn mouse_down(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    ctx.state.pointer_queue.reset();
    enqueue(ctx, event);

    if ctx.document.tag_name(event.target) == Some("option") {
        if let Some(select) = super::select::enclosing_multi_select(ctx.document, event.target) {
            for option in ctx.document.options(select) {
                let selected = ctx.document.is_selected(option);
                ctx.state.option_snapshots.insert(option, selected);
            }
        }
    }
}

pub fn mouse_up(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    enqueue(ctx, event);

    let is_drag = ctx
        .state
        .pointer_queue
        .classify()
        .is_some_and(|g| g.is_drag);
    if is_drag {
        ctx.skip_click();
        let entries = ctx.state.pointer_queue.entries().to_vec();
        if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
            if last.button == 0 && ctx.document.selection_text().is_empty() {
                if event.alt_key {
                    for entry in &entries {
                        let command = match entry.kind {
                            EventKind::MouseDown => "mouseDownAt",
                            EventKind::MouseMove => "mouseMoveAt",
                            EventKind::MouseUp => "mouseUpAt",
                            _ => continue,
                        };
                        ctx.record(command, entry.target, xy(entry.local));
                    }
                } else if first.target != last.target {
                    let down = ctx.candidates(first.target);
                    let up = ctx.candidates(last.target);
                    if down.is_empty() || up.is_empty() {
                        tracing::debug!("Drag endpoint left the page; drag not recorded");
                    } else {
                        ctx.record_with_target("mouseDown", down, "");
                        ctx.record_with_target("mouseUp", up, "");
                    }
                }
            }
        }
    }

    ctx.state.pointer_queue.reset();
}

pub fn drag_start(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    let previous = ctx.state.timers.drag_source.take();
    let handle = ctx.rearm(
        previous,
        ctx.config.drag_source_latch_ms,
        TimerTask::LatchDragSource {
            source: LatchedTarget {
                target: event.target,
                candidates: ctx.candidates(event.target),
            },
        },
    );
    ctx.state.timers.drag_source = Some(handle);
}

pub fn drop_on_target(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    if let Some(pending) = ctx.state.timers.drag_source.take() {
        ctx.timers.cancel(pending);
    }
    if let Some(source) = ctx.state.drag_source.take() {
        if event.button == 0 && source.target != event.target {
            let destination = ctx.locators.build(ctx.document, event.target);
            ctx.record_with_target("dragAndDropToObject", source.candidates, destination);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_render_without_trailing_zeroes() {
        assert_eq!(xy((10.0, 5.0)), "10,5");
        assert_eq!(xy((10.5, -2.25)), "10.5,-2.25");
    }
}
