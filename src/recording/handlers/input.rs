//! Typed text: `type` commits on change plus the Enter, arrow and Tab key protocols.

use super::{is_text_input, HandlerContext};
use crate::dom::event::{KEY_CODE_DOWN, KEY_CODE_ENTER, KEY_CODE_TAB, KEY_CODE_UP};
use crate::dom::{DomEvent, NodeId};
use crate::models::{KEY_DOWN, KEY_ENTER, KEY_TAB, KEY_UP};
use crate::recording::timers::TimerTask;

/// Enclosing form, or body, of a field. `None` means no boundary within the walk bound.
fn form_boundary(ctx: &HandlerContext<'_>, node: NodeId) -> Option<NodeId> {
    let parent = ctx.document.parent_element(node)?;
    ctx.document
        .find_ancestor(parent, ctx.config.max_ancestor_depth, |d, id| {
            matches!(d.tag_name(id), Some("form") | Some("body"))
        })
}

/// Emit the `type` command for a field, plus a pending Enter on a non-empty input
fn commit_type(ctx: &mut HandlerContext<'_>, node: NodeId) {
    if ctx.state.type_target == Some(node) {
        ctx.state.type_target = None;
    }
    let value = ctx.document.value(node).unwrap_or_default().to_string();
    if is_text_input(ctx.document, node) {
        ctx.record("type", node, value.clone());
        if value.is_empty() {
            return;
        }
        if let Some(enter_target) = ctx.state.enter_target {
            if form_boundary(ctx, node).is_none() {
                tracing::debug!("No form boundary above {:?}; Enter not recorded", node);
                return;
            }
            ctx.record("sendKeys", enter_target, KEY_ENTER);
            ctx.state.enter_target = None;
        }
    } else if ctx.document.tag_name(node) == Some("textarea") {
        ctx.record("type", node, value);
    }
}

pub fn commit_on_change(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    if ctx.document.tag_name(event.target).is_some()
        && !ctx.state.prevent_type
        && ctx.state.type_lock.acquire()
    {
        commit_type(ctx, event.target);
    } else {
        tracing::debug!("Skipping type commit on {:?}", event.target);
    }
    ctx.state.type_lock.release();
}

pub fn track_type_target(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    ctx.state.type_target = Some(event.target);
}

pub fn send_keys(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    let target = event.target;
    let Some(key) = event.key_code else {
        return;
    };
    if !is_text_input(ctx.document, target) {
        return;
    }
    let value = ctx.document.value(target).unwrap_or_default().to_string();

    if key == KEY_CODE_ENTER {
        enter_key(ctx, target, &value);
    }

    if (key == KEY_CODE_UP || key == KEY_CODE_DOWN) && !value.is_empty() {
        let focused_value = ctx
            .state
            .focus_target
            .and_then(|f| ctx.document.value(f))
            .map(str::to_string);
        if let Some(focused_value) = focused_value {
            if ctx.state.temp_value.as_deref() != Some(focused_value.as_str()) {
                ctx.state.temp_value = Some(focused_value.clone());
                ctx.record("type", target, focused_value);
            }
        }

        ctx.schedule(ctx.config.arrow_refresh_ms, TimerTask::RefreshTempValue);
        let keys = if key == KEY_CODE_UP { KEY_UP } else { KEY_DOWN };
        ctx.record("sendKeys", target, keys);
        ctx.state.tab_check = Some(target);
    }

    if key == KEY_CODE_TAB && ctx.state.tab_check == Some(target) {
        ctx.record("sendKeys", target, KEY_TAB);
        ctx.state.prevent_type = true;
    }
}

fn enter_key(ctx: &mut HandlerContext<'_>, target: NodeId, value: &str) {
    if ctx.document.parent_element(target).is_none() {
        tracing::debug!("Enter on detached field {:?}", target);
        return;
    }
    let repeated =
        ctx.state.temp_value.as_deref() == Some(value) && ctx.state.tab_check == Some(target);
    let unchanged = !repeated && ctx.state.focus_value.as_deref() == Some(value);
    // unchanged field: no change event will follow
    if unchanged && form_boundary(ctx, target).is_none() {
        tracing::debug!("No form boundary above {:?}; Enter not recorded", target);
        return;
    }

    ctx.state.enter_target = Some(target);
    ctx.state.enter_value = Some(value.to_string());
    if repeated {
        // repeated Enter after arrow navigation; the following change must not type again
        ctx.record("sendKeys", target, KEY_ENTER);
        ctx.state.enter_target = None;
        ctx.state.prevent_type = true;
    } else if unchanged {
        ctx.record("sendKeys", target, KEY_ENTER);
        ctx.state.enter_target = None;
    }

    if let Some(type_target) = ctx.state.type_target {
        if ctx.document.tag_name(type_target).is_some() && !ctx.state.prevent_type {
            // held until the next change handler releases it
            ctx.state.type_lock.hold();
            commit_type(ctx, type_target);
        }
    }

    ctx.skip_click();
    ctx.schedule(ctx.config.enter_check_ms, TimerTask::ExpireEnterTarget { target });
}

/// Focus on a text field (target phase)
pub fn focus_field(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    if !is_text_input(ctx.document, event.target) {
        return;
    }
    let value = ctx.document.value(event.target).map(str::to_string);
    ctx.state.focus_target = Some(event.target);
    ctx.state.temp_value = value.clone();
    ctx.state.focus_value = value;
    ctx.state.prevent_type = false;
}

/// Blur of a text field (target phase)
pub fn blur_field(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    if !is_text_input(ctx.document, event.target) {
        return;
    }
    ctx.state.focus_target = None;
    ctx.state.focus_value = None;
    ctx.state.temp_value = None;
}
