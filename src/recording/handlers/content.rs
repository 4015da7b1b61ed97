//! contentEditable commits and context-menu assertions.

use super::HandlerContext;
use crate::dom::{normalize_spaces, DomEvent};
use crate::models::Locator;
use crate::recording::host::HostMessage;
use crate::recording::state::EditSnapshot;

pub fn edit_focus(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    if !ctx.document.is_content_editable(event.target) {
        return;
    }
    ctx.state.edit_snapshot = Some(EditSnapshot {
        target: event.target,
        html: ctx.document.inner_html(event.target).unwrap_or_default().to_string(),
    });
}

pub fn edit_blur(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    let Some(snapshot) = ctx.state.edit_snapshot.as_ref() else {
        return;
    };
    if snapshot.target != event.target {
        return;
    }
    let before = snapshot.html.clone();
    ctx.state.edit_snapshot = None;

    let html = ctx.document.inner_html(event.target).unwrap_or_default().to_string();
    if html != before {
        ctx.record("editContent", event.target, html);
    }
}

/// Ask the host which command the user picked; the answer arrives through
/// [`apply_context_command`]
pub fn context_menu(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    ctx.state.context_target = Some(event.target);
    ctx.emitter.send(HostMessage::ContextMenuRequested);
}

const STATE_PREDICATES: &[&str] = &["Present", "Checked", "Editable", "Selected", "Visible"];

/// Record the command the host chose for the last context menu
pub fn apply_context_command(ctx: &mut HandlerContext<'_>, command: &str) {
    let Some(target) = ctx.state.context_target.take() else {
        tracing::debug!("Context command {} without an open context menu", command);
        return;
    };

    if command.contains("Text") || command.contains("Label") {
        let text = ctx.document.visible_text(target);
        ctx.record(command, target, text);
    } else if command.contains("Title") {
        let title = normalize_spaces(ctx.document.title());
        ctx.record_with_target(command, vec![Locator::literal(title)], "");
    } else if STATE_PREDICATES.iter().any(|p| command.contains(p)) || command == "mouseOver" {
        ctx.record(command, target, "");
    } else if command.contains("Value") {
        let value = ctx.document.value(target).unwrap_or_default().to_string();
        ctx.record(command, target, value);
    } else {
        tracing::debug!("Context command {} has no recording", command);
    }
}
