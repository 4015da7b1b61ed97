use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Stable identifier of a mirrored DOM node, assigned by the page agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

/// Bounding rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Position of a viewport point relative to this rect's origin
    pub fn local_point(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (client_x - self.x, client_y - self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    #[default]
    Complete,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub children: Vec<NodeId>,
    /// Lower-case tag name; empty for nodes that are not elements
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Current form value (inputs, textareas, selects)
    #[serde(default)]
    pub value: String,
    /// Rendered text content
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub inner_html: String,
    #[serde(default)]
    pub content_editable: bool,
    /// Option selectedness
    #[serde(default)]
    pub selected: bool,
    /// Select `multiple` flag
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub bounds: DomRect,
    /// Text selection inside an input or textarea, as char offsets
    #[serde(default)]
    pub selection_range: Option<(usize, usize)>,
}

/// Node state pushed by the page agent; inserts or replaces the node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    #[serde(flatten)]
    pub node: Node,
    /// Position among the parent's children; appended when absent
    #[serde(default)]
    pub index: Option<usize>,
}

/// In-memory mirror of one frame's document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    document_element: NodeId,
    body: NodeId,
    title: String,
    ready_state: ReadyState,
    scroll_y: f64,
    active_element: Option<NodeId>,
    window_selection: String,
    next_id: u64,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        let html = NodeId(1);
        let body = NodeId(2);
        let mut nodes = HashMap::new();
        nodes.insert(
            html,
            Node {
                id: html,
                tag: "html".to_string(),
                children: vec![body],
                ..Default::default()
            },
        );
        nodes.insert(
            body,
            Node {
                id: body,
                parent: Some(html),
                tag: "body".to_string(),
                ..Default::default()
            },
        );

        Self {
            nodes,
            document_element: html,
            body,
            title: title.into(),
            ready_state: ReadyState::Complete,
            scroll_y: 0.0,
            active_element: None,
            window_selection: String::new(),
            next_id: 3,
        }
    }

    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Append a new element under `parent`
    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                parent: Some(parent),
                tag: tag.to_ascii_lowercase(),
                ..Default::default()
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Insert or replace a node from a page-agent snapshot
    pub fn apply_snapshot(&mut self, snapshot: NodeSnapshot) {
        let NodeSnapshot { mut node, index } = snapshot;
        let id = node.id;
        node.tag = node.tag.to_ascii_lowercase();

        let old_parent = self.nodes.get(&id).and_then(|n| n.parent);
        if let Some(existing) = self.nodes.get(&id) {
            node.children = existing.children.clone();
        }
        if old_parent != node.parent || index.is_some() {
            if let Some(p) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
                p.children.retain(|c| *c != id);
            }
            if let Some(p) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
                match index {
                    Some(i) if i <= p.children.len() => p.children.insert(i, id),
                    _ => p.children.push(id),
                }
            }
        }

        self.next_id = self.next_id.max(id.0 + 1);
        self.nodes.insert(id, node);
    }

    /// Remove a node and its subtree, returning the ids of every removed node
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.remove(&id) else {
            return Vec::new();
        };
        if let Some(p) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        let mut removed = vec![id];
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(gone) = self.nodes.remove(&child) {
                removed.push(child);
                pending.extend(gone.children);
            }
        }
        if self.active_element.is_some_and(|a| !self.nodes.contains_key(&a)) {
            self.active_element = None;
        }
        removed
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Parent only if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.tag_name(*p).is_some())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.nodes
            .get(&id)
            .map(|n| n.tag.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&id)
            .and_then(|n| n.attributes.get(name))
            .map(|v| v.as_str())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.value.as_str())
    }

    /// The element's `type` property as a browser would report it
    pub fn input_type(&self, id: NodeId) -> Option<String> {
        let tag = self.tag_name(id)?;
        let declared = self.attribute(id, "type").map(|t| t.to_ascii_lowercase());
        match tag {
            "input" => Some(declared.unwrap_or_else(|| "text".to_string())),
            "button" => Some(declared.unwrap_or_else(|| "submit".to_string())),
            "textarea" => Some("textarea".to_string()),
            "select" => Some(if self.is_multiple(id) {
                "select-multiple".to_string()
            } else {
                "select-one".to_string()
            }),
            _ => None,
        }
    }

    pub fn is_content_editable(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.content_editable)
    }

    pub fn is_multiple(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.multiple)
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.selected)
    }

    pub fn inner_html(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.inner_html.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.text.as_str())
    }

    /// Rendered text with whitespace runs collapsed and trimmed
    pub fn visible_text(&self, id: NodeId) -> String {
        self.text(id)
            .map(|t| {
                t.split(char::is_whitespace)
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    pub fn bounds(&self, id: NodeId) -> DomRect {
        self.nodes.get(&id).map(|n| n.bounds).unwrap_or_default()
    }

    /// Option elements of a select, in document order (optgroups included)
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(select).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            match self.tag_name(id) {
                Some("option") => out.push(id),
                Some("optgroup") => stack.extend(self.children(id).iter().rev().copied()),
                _ => {}
            }
        }
        out
    }

    /// First selected option of a select
    pub fn selected_option(&self, select: NodeId) -> Option<NodeId> {
        self.options(select).into_iter().find(|o| self.is_selected(*o))
    }

    /// Walk from `start` (inclusive) toward the root, at most `max_depth` steps
    pub fn find_ancestor<F>(&self, start: NodeId, max_depth: usize, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&Document, NodeId) -> bool,
    {
        let mut current = Some(start);
        let mut steps = 0;
        while let Some(id) = current {
            if steps > max_depth || !self.contains(id) {
                return None;
            }
            if pred(self, id) {
                return Some(id);
            }
            current = self.parent(id);
            steps += 1;
        }
        None
    }

    /// Number of elements in the document
    pub fn element_count(&self) -> usize {
        self.nodes.values().filter(|n| !n.tag.is_empty()).count()
    }

    /// Currently selected text, from the focused field or the window selection
    pub fn selection_text(&self) -> String {
        if let Some(active) = self.active_element {
            if matches!(self.tag_name(active), Some("input") | Some("textarea")) {
                let node = &self.nodes[&active];
                let (start, end) = node.selection_range.unwrap_or((0, 0));
                let text: String = node
                    .value
                    .chars()
                    .skip(start)
                    .take(end.saturating_sub(start))
                    .collect();
                return text.trim().to_string();
            }
        }
        self.window_selection.trim().to_string()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll_y = y;
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    pub fn set_active_element(&mut self, id: Option<NodeId>) {
        self.active_element = id;
    }

    pub fn set_window_selection(&mut self, text: impl Into<String>) {
        self.window_selection = text.into();
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.value = value.to_string();
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.text = text.to_string();
        }
    }

    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.inner_html = html.to_string();
        }
    }

    pub fn set_content_editable(&mut self, id: NodeId, editable: bool) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.content_editable = editable;
        }
    }

    pub fn set_selected(&mut self, id: NodeId, selected: bool) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.selected = selected;
        }
    }

    pub fn set_multiple(&mut self, id: NodeId, multiple: bool) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.multiple = multiple;
        }
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: DomRect) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.bounds = bounds;
        }
    }

    pub fn set_selection_range(&mut self, id: NodeId, range: Option<(usize, usize)>) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.selection_range = range;
        }
    }
}

/// Turn each non-breaking space into a space and collapse runs of spaces and
/// tabs. Newlines and leading or trailing space are kept.
pub fn normalize_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        match c {
            ' ' | '\t' => {
                if !in_run {
                    out.push(' ');
                }
                in_run = true;
            }
            '\u{a0}' => {
                out.push(' ');
                in_run = false;
            }
            _ => {
                out.push(c);
                in_run = false;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove_subtree() {
        let mut doc = Document::new("Page");
        let form = doc.create_element(doc.body(), "FORM");
        let input = doc.create_element(form, "input");
        assert_eq!(doc.tag_name(form), Some("form"));
        assert_eq!(doc.parent_element(input), Some(form));
        let before = doc.element_count();

        let removed = doc.remove(form);
        assert_eq!(removed, vec![form, input]);
        assert!(doc.remove(form).is_empty());
        assert!(!doc.contains(input));
        assert_eq!(doc.element_count(), before - 2);
        assert!(doc.children(doc.body()).is_empty());
    }

    #[test]
    fn test_input_type_defaults() {
        let mut doc = Document::new("Page");
        let plain = doc.create_element(doc.body(), "input");
        let pw = doc.create_element(doc.body(), "input");
        doc.set_attribute(pw, "type", "PASSWORD");
        let select = doc.create_element(doc.body(), "select");
        doc.set_multiple(select, true);

        assert_eq!(doc.input_type(plain).as_deref(), Some("text"));
        assert_eq!(doc.input_type(pw).as_deref(), Some("password"));
        assert_eq!(doc.input_type(select).as_deref(), Some("select-multiple"));
        assert_eq!(doc.input_type(doc.body()), None);
    }

    #[test]
    fn test_options_include_optgroups_in_order() {
        let mut doc = Document::new("Page");
        let select = doc.create_element(doc.body(), "select");
        let a = doc.create_element(select, "option");
        let group = doc.create_element(select, "optgroup");
        let b = doc.create_element(group, "option");
        let c = doc.create_element(select, "option");
        doc.set_selected(b, true);

        assert_eq!(doc.options(select), vec![a, b, c]);
        assert_eq!(doc.selected_option(select), Some(b));
    }

    #[test]
    fn test_find_ancestor_is_bounded() {
        let mut doc = Document::new("Page");
        let mut current = doc.body();
        for _ in 0..10 {
            current = doc.create_element(current, "div");
        }
        let found = doc.find_ancestor(current, 3, |d, id| d.tag_name(id) == Some("body"));
        assert_eq!(found, None);
        let found = doc.find_ancestor(current, 20, |d, id| d.tag_name(id) == Some("body"));
        assert_eq!(found, Some(doc.body()));
    }

    #[test]
    fn test_selection_text_prefers_focused_field() {
        let mut doc = Document::new("Page");
        let input = doc.create_element(doc.body(), "input");
        doc.set_value(input, "hello world");
        doc.set_selection_range(input, Some((6, 11)));
        doc.set_window_selection("elsewhere");

        assert_eq!(doc.selection_text(), "elsewhere");
        doc.set_active_element(Some(input));
        assert_eq!(doc.selection_text(), "world");
    }

    #[test]
    fn test_apply_snapshot_reparents() {
        let mut doc = Document::new("Page");
        let div = doc.create_element(doc.body(), "div");
        let snapshot = NodeSnapshot {
            node: Node {
                id: NodeId(40),
                parent: Some(div),
                tag: "BUTTON".to_string(),
                ..Default::default()
            },
            index: None,
        };
        doc.apply_snapshot(snapshot);
        assert_eq!(doc.children(div), &[NodeId(40)]);
        assert_eq!(doc.tag_name(NodeId(40)), Some("button"));

        let moved = NodeSnapshot {
            node: Node {
                id: NodeId(40),
                parent: Some(doc.body()),
                tag: "button".to_string(),
                ..Default::default()
            },
            index: Some(0),
        };
        doc.apply_snapshot(moved);
        assert!(doc.children(div).is_empty());
        assert_eq!(doc.children(doc.body())[0], NodeId(40));

        // new ids never collide with agent-assigned ones
        let fresh = doc.create_element(doc.body(), "span");
        assert!(fresh.0 > 40);
    }

    #[test]
    fn test_normalize_spaces() {
        assert_eq!(normalize_spaces("Order\u{a0}summary \t total"), "Order summary total");
        assert_eq!(normalize_spaces(" a\u{a0}\u{a0}b "), " a  b ");
        assert_eq!(normalize_spaces("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_visible_text_collapses_all_whitespace() {
        let mut doc = Document::new("Page");
        let heading = doc.create_element(doc.body(), "h1");
        doc.set_text(heading, " Total:\n\u{a0}42 ");
        assert_eq!(doc.visible_text(heading), "Total: 42");
    }
}
