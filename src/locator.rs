//! Locator capability: turning a DOM node into candidate selector strings.
//!
//! The recorder treats locator computation as an external capability behind
//! [`LocatorBuilder`]. [`BasicLocatorBuilder`] is the strategy set the sidecar
//! ships with: id, name, link text, a CSS path and a positional XPath, ordered
//! from most to least stable.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::dom::{Document, NodeId};
use crate::models::Locator;

/// Tag of the element the recorder injects to show that recording is on
pub const RECORDING_INDICATOR_TAG: &str = "recorder-indicator";

/// Locator reserved for the recording indicator; commands targeting it are never emitted
pub const RECORDING_INDICATOR_LOCATOR: &str = "css=recorder-indicator";

pub trait LocatorBuilder: Send + Sync {
    /// Ranked candidates, best first. Empty when the node is not an element.
    fn build_all(&self, document: &Document, node: NodeId) -> Vec<Locator>;

    /// The single best candidate
    fn build(&self, document: &Document, node: NodeId) -> String {
        self.build_all(document, node)
            .into_iter()
            .next()
            .map(|l| l.value)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BasicLocatorBuilder {
    /// Bound on how far up CSS and XPath paths are built
    pub max_depth: usize,
}

impl BasicLocatorBuilder {
    pub fn new() -> Self {
        Self { max_depth: 64 }
    }

    fn inside_indicator(&self, document: &Document, node: NodeId) -> bool {
        document
            .find_ancestor(node, self.max_depth, |d, id| {
                d.tag_name(id) == Some(RECORDING_INDICATOR_TAG)
            })
            .is_some()
    }

    fn css_path(&self, document: &Document, node: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = node;
        for _ in 0..self.max_depth {
            let tag = document.tag_name(current)?;
            if let Some(id) = document.attribute(current, "id").filter(|v| !v.is_empty()) {
                segments.push(format!("#{}", id));
                break;
            }
            if tag == "body" || tag == "html" {
                segments.push(tag.to_string());
                break;
            }
            let parent = document.parent(current)?;
            let position = element_position(document, parent, current, |_| true);
            segments.push(format!("{}:nth-child({})", tag, position));
            current = parent;
        }
        segments.reverse();
        Some(segments.join(" > "))
    }

    fn xpath(&self, document: &Document, node: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = Some(node);
        let mut depth = 0;
        while let Some(id) = current {
            let Some(tag) = document.tag_name(id) else { break };
            if depth > self.max_depth {
                return None;
            }
            let segment = match document.parent(id) {
                Some(parent) => {
                    let same_tag = |other: &str| other == tag;
                    let count = document
                        .children(parent)
                        .iter()
                        .filter(|c| document.tag_name(**c).is_some_and(same_tag))
                        .count();
                    if count > 1 {
                        let position = element_position(document, parent, id, same_tag);
                        format!("{}[{}]", tag, position)
                    } else {
                        tag.to_string()
                    }
                }
                None => tag.to_string(),
            };
            segments.push(segment);
            current = document.parent(id);
            depth += 1;
        }
        if segments.is_empty() {
            return None;
        }
        segments.reverse();
        Some(format!("/{}", segments.join("/")))
    }
}

/// 1-based position of `node` among the element children of `parent` accepted by `filter`
fn element_position<F>(document: &Document, parent: NodeId, node: NodeId, filter: F) -> usize
where
    F: Fn(&str) -> bool,
{
    document
        .children(parent)
        .iter()
        .filter(|c| document.tag_name(**c).is_some_and(&filter))
        .position(|c| *c == node)
        .map(|p| p + 1)
        .unwrap_or(1)
}

impl LocatorBuilder for BasicLocatorBuilder {
    fn build_all(&self, document: &Document, node: NodeId) -> Vec<Locator> {
        let Some(tag) = document.tag_name(node) else {
            return Vec::new();
        };
        if self.inside_indicator(document, node) {
            return vec![Locator::new(RECORDING_INDICATOR_LOCATOR, "css:finder")];
        }

        let mut candidates = Vec::new();
        if let Some(id) = document.attribute(node, "id").filter(|v| !v.is_empty()) {
            candidates.push(Locator::new(format!("id={}", id), "id"));
        }
        if let Some(name) = document.attribute(node, "name").filter(|v| !v.is_empty()) {
            candidates.push(Locator::new(format!("name={}", name), "name"));
        }
        if tag == "a" {
            let text = document.visible_text(node);
            if !text.is_empty() {
                candidates.push(Locator::new(format!("linkText={}", text), "linkText"));
            }
        }
        if let Some(css) = self.css_path(document, node) {
            candidates.push(Locator::new(format!("css={}", css), "css:finder"));
        }
        if let Some(xpath) = self.xpath(document, node) {
            candidates.push(Locator::new(format!("xpath={}", xpath), "xpath:position"));
        }
        candidates
    }
}

fn regex_metachars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[()\[\]\\^$*+?.|{}]").expect("valid metachar pattern"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Option locator for a select option, derived from its visible label.
///
/// Labels with non-breaking spaces cannot be matched literally after the browser
/// normalizes them, so they become a `label=regexp:` pattern in which every
/// whitespace run containing a non-breaking space matches `\s` (or `\s+` when
/// the run is longer than one character).
pub fn option_locator(label: &str) -> String {
    let label = label.trim_matches(' ');
    if !label.contains('\u{a0}') {
        return format!("label={}", label);
    }

    let escaped = regex_metachars().replace_all(label, |caps: &Captures| format!("\\{}", &caps[0]));
    let pattern = whitespace_runs().replace_all(&escaped, |caps: &Captures| {
        let run = &caps[0];
        if run.contains('\u{a0}') {
            if run.chars().count() > 1 {
                r"\s+".to_string()
            } else {
                r"\s".to_string()
            }
        } else {
            run.to_string()
        }
    });
    format!("label=regexp:{}", pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_option_locator() {
        assert_eq!(option_locator("  Banana "), "label=Banana");
        assert_eq!(option_locator("Price (USD)"), "label=Price (USD)");
    }

    #[test]
    fn test_nbsp_option_locator_escapes_and_generalizes() {
        assert_eq!(option_locator("a\u{a0}b"), r"label=regexp:a\sb");
        assert_eq!(option_locator("a\u{a0}\u{a0}b"), r"label=regexp:a\s+b");
        assert_eq!(option_locator("a \u{a0}b"), r"label=regexp:a\s+b");
        assert_eq!(
            option_locator("1.5\u{a0}kg (x*2) [a|b] {c} ^$?+"),
            r"label=regexp:1\.5\skg \(x\*2\) \[a\|b\] \{c\} \^\$\?\+"
        );
    }

    #[test]
    fn test_candidates_are_ranked() {
        let mut doc = Document::new("Page");
        let form = doc.create_element(doc.body(), "form");
        doc.set_attribute(form, "id", "login");
        let _first = doc.create_element(form, "input");
        let input = doc.create_element(form, "input");
        doc.set_attribute(input, "name", "user");

        let builder = BasicLocatorBuilder::new();
        let all = builder.build_all(&doc, input);
        let values: Vec<&str> = all.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(
            values,
            vec![
                "name=user",
                "css=#login > input:nth-child(2)",
                "xpath=/html/body/form/input[2]"
            ]
        );
        assert_eq!(builder.build(&doc, input), "name=user");
    }

    #[test]
    fn test_link_text_and_id() {
        let mut doc = Document::new("Page");
        let link = doc.create_element(doc.body(), "a");
        doc.set_attribute(link, "id", "home");
        doc.set_text(link, " Go\n home ");

        let all = BasicLocatorBuilder::new().build_all(&doc, link);
        assert_eq!(all[0], Locator::new("id=home", "id"));
        assert_eq!(all[1], Locator::new("linkText=Go home", "linkText"));
        assert_eq!(all[2].value, "css=#home");
    }

    #[test]
    fn test_indicator_is_reserved() {
        let mut doc = Document::new("Page");
        let indicator = doc.create_element(doc.body(), RECORDING_INDICATOR_TAG);
        let inner = doc.create_element(indicator, "div");

        let builder = BasicLocatorBuilder::new();
        assert_eq!(builder.build(&doc, inner), RECORDING_INDICATOR_LOCATOR);
    }

    #[test]
    fn test_missing_node_has_no_candidates() {
        let doc = Document::new("Page");
        assert!(BasicLocatorBuilder::new().build_all(&doc, NodeId(999)).is_empty());
    }
}
