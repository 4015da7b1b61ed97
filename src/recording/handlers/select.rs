use super::HandlerContext;
use crate::dom::{Document, DomEvent, NodeId};
use crate::locator::option_locator;

/// The multi-select an option belongs to, looking through one optgroup level
pub(crate) fn enclosing_multi_select(document: &Document, option: NodeId) -> Option<NodeId> {
    let parent = document.parent_element(option)?;
    let select = match document.tag_name(parent) {
        Some("optgroup") => document.parent_element(parent)?,
        _ => parent,
    };
    (document.tag_name(select) == Some("select") && document.is_multiple(select)).then_some(select)
}

fn option_value(document: &Document, option: NodeId) -> String {
    option_locator(document.text(option).unwrap_or_default())
}

/// Focus on a multi-select keeps snapshots taken by an earlier mousedown
pub fn snapshot_on_focus(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    let select = event.target;
    if ctx.document.tag_name(select) != Some("select") || !ctx.document.is_multiple(select) {
        return;
    }
    for option in ctx.document.options(select) {
        let selected = ctx.document.is_selected(option);
        ctx.state.option_snapshots.entry(option).or_insert(selected);
    }
}

pub fn commit_on_change(ctx: &mut HandlerContext<'_>, event: &DomEvent) {
    let select = event.target;
    if ctx.document.tag_name(select) != Some("select") {
        return;
    }

    if !ctx.document.is_multiple(select) {
        let Some(option) = ctx.document.selected_option(select) else {
            tracing::debug!("Change on select {:?} without a selected option", select);
            return;
        };
        let value = option_value(ctx.document, option);
        ctx.record("select", select, value);
        return;
    }

    for option in ctx.document.options(select) {
        let was_selected = ctx.state.option_snapshots.get(&option).copied().unwrap_or(false);
        let selected = ctx.document.is_selected(option);
        if was_selected == selected {
            continue;
        }
        let value = option_value(ctx.document, option);
        let command = if selected { "addSelection" } else { "removeSelection" };
        ctx.record(command, select, value);
        ctx.skip_click();
        ctx.state.option_snapshots.insert(option, selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosing_multi_select() {
        let mut doc = Document::new("Page");
        let select = doc.create_element(doc.body(), "select");
        let direct = doc.create_element(select, "option");
        let group = doc.create_element(select, "optgroup");
        let grouped = doc.create_element(group, "option");

        assert_eq!(enclosing_multi_select(&doc, direct), None);
        doc.set_multiple(select, true);
        assert_eq!(enclosing_multi_select(&doc, direct), Some(select));
        assert_eq!(enclosing_multi_select(&doc, grouped), Some(select));
    }
}
