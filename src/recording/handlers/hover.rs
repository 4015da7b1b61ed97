//! Page-level signals: load settling, scrolling and hover menus.

use super::pointer::enqueue;
use super::HandlerContext;
use crate::dom::{Document, DomEvent, NodeId, ReadyState};
use crate::recording::state::LatchedTarget;
use crate::recording::timers::TimerTask;

const CLICKABLE_INPUT_TYPES: &[&str] = &["submit", "button", "image", "radio", "checkbox", "reset"];

/// Nearest element at or above `node` a user would click, if any
pub fn find_clickable_element(document: &Document, node: NodeId, max_depth: usize) -> Option<NodeId> {
    document.find_ancestor(node, max_depth, |d, id| {
        let Some(tag) = d.tag_name(id) else {
            return false;
        };
        d.has_attribute(id, "onclick")
            || d.has_attribute(id, "href")
            || tag == "button"
            || (tag == "input"
                && d
                    .input_type(id)
                    .is_some_and(|t| CLICKABLE_INPUT_TYPES.contains(&t.as_str())))
    })
}

pub fn scroll(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    if !ctx.state.page_settled {
        return;
    }
    ctx.state.scroll_detector = Some(event.target);
    let previous = ctx.state.timers.scroll_detector.take();
    let handle = ctx.rearm(previous, ctx.config.scroll_window_ms, TimerTask::ClearScrollDetector);
    ctx.state.timers.scroll_detector = Some(handle);
}

pub fn mouse_over(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    ctx.state.now_node = ctx.document.element_count();
    if !ctx.state.page_settled {
        return;
    }

    if find_clickable_element(ctx.document, event.target, ctx.config.max_ancestor_depth).is_some() {
        ctx.state.hover_latch = Some(LatchedTarget {
            target: event.target,
            candidates: ctx.candidates(event.target),
        });
        let previous = ctx.state.timers.hover_latch.take();
        let handle = ctx.rearm(previous, ctx.config.hover_window_ms, TimerTask::ClearHoverLatch);
        ctx.state.timers.hover_latch = Some(handle);
    }
    enqueue(ctx, event);
}

pub fn mouse_out(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    enqueue(ctx, event);
    if ctx.state.mouse_out_target.take() == Some(event.target) {
        ctx.record("mouseOut", event.target, "");
    }
}

pub fn ready_state_change(ctx: &mut HandlerContext<'_>, _event: &DomEvent) {
    ctx.state.page_settled = false;
    if ctx.document.ready_state() == ReadyState::Loading {
        return;
    }
    let previous = ctx.state.timers.page_settled.take();
    let handle = ctx.rearm(previous, ctx.config.settle_delay_ms, TimerTask::PageSettled);
    ctx.state.timers.page_settled = Some(handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clickable_ancestor() {
        let mut doc = Document::new("Page");
        let link = doc.create_element(doc.body(), "a");
        doc.set_attribute(link, "href", "/home");
        let span = doc.create_element(link, "span");
        let plain = doc.create_element(doc.body(), "div");
        let radio = doc.create_element(doc.body(), "input");
        doc.set_attribute(radio, "type", "radio");
        let text = doc.create_element(doc.body(), "input");

        assert_eq!(find_clickable_element(&doc, span, 16), Some(link));
        assert_eq!(find_clickable_element(&doc, plain, 16), None);
        assert_eq!(find_clickable_element(&doc, radio, 16), Some(radio));
        assert_eq!(find_clickable_element(&doc, text, 16), None);
    }
}
