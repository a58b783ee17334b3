//! Per-attribute and per-element rewrites applied around the HTML sanitizer.
//!
//! Each hook is a plain function of its inputs; the orchestrator decides where
//! in the pipeline it runs.

use crate::dom::dom_tree::{self, ElementNode, Handle};
use crate::scope::ScopeId;
use crate::style::declarations::sanitize_style_attribute;
use crate::style::walker::sanitize_stylesheet;
use log::trace;
use std::borrow::Cow;
use std::collections::HashSet;

/// `rel` forced onto every link: no referrer, no `window.opener`.
pub const LINK_REL: &str = "noopener noreferrer";

/// `target` forced onto every link: a new top-level browsing context.
pub const LINK_TARGET: &str = "_blank";

/// Rewrites attribute values into one scope's namespace.
///
/// Runs for every attribute the HTML sanitizer has already allowed.
#[derive(Debug, Clone)]
pub struct AttributeRewriter {
    scope: ScopeId,
    forbidden: HashSet<String>,
}

impl AttributeRewriter {
    pub fn new(scope: ScopeId, forbidden_attributes: &[String]) -> Self {
        AttributeRewriter {
            scope,
            forbidden: forbidden_attributes.iter().cloned().collect(),
        }
    }

    /// Returns the value to keep, or `None` to drop the attribute.
    pub fn rewrite<'v>(&self, element: &str, attribute: &str, value: &'v str) -> Option<Cow<'v, str>> {
        if self.forbidden.contains(attribute) || attribute.starts_with("data-") {
            trace!("dropping {}[{}]", element, attribute);
            return None;
        }
        match attribute {
            "style" => {
                let filtered = sanitize_style_attribute(value);
                (!filtered.is_empty()).then_some(Cow::Owned(filtered))
            }
            "id" | "for" => Some(Cow::Owned(self.scope.prefixed(value))),
            "class" => {
                let classes = value
                    .split_whitespace()
                    .map(|class| self.scope.prefixed(class))
                    .collect::<Vec<_>>();
                (!classes.is_empty()).then(|| Cow::Owned(classes.join(" ")))
            }
            _ => Some(Cow::Borrowed(value)),
        }
    }
}

/// Forces links to open in a new, reference-less browsing context.
pub fn harden_link(element: &mut ElementNode) {
    if element.tag == "a" || element.tag == "area" {
        element.set_attribute("rel", LINK_REL);
        element.set_attribute("target", LINK_TARGET);
    }
}

/// Replaces a `<style>` element's text with its sanitized stylesheet.
pub fn rewrite_style_element(style: &Handle, scope: &ScopeId) {
    if !style.borrow().is_element("style") {
        return;
    }
    let css = dom_tree::text_content(style);
    dom_tree::set_text_content(style, sanitize_stylesheet(&css, scope));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::dom_tree::{Node, NodeKind};
    use pretty_assertions::assert_eq;

    fn rewriter() -> AttributeRewriter {
        AttributeRewriter::new(ScopeId::new("defanged", 9), &["tabindex".to_string()])
    }

    #[test]
    fn ids_and_labels_are_prefixed() {
        let r = rewriter();
        assert_eq!(r.rewrite("div", "id", "main").as_deref(), Some("defanged9-main"));
        assert_eq!(r.rewrite("label", "for", "email").as_deref(), Some("defanged9-email"));
    }

    #[test]
    fn every_class_token_is_prefixed() {
        let r = rewriter();
        assert_eq!(
            r.rewrite("p", "class", "  note   big ").as_deref(),
            Some("defanged9-note defanged9-big")
        );
        assert_eq!(r.rewrite("p", "class", "   "), None);
    }

    #[test]
    fn style_is_filtered() {
        let r = rewriter();
        assert_eq!(
            r.rewrite("div", "style", "color: red; cursor: pointer").as_deref(),
            Some("color:red;")
        );
        assert_eq!(r.rewrite("div", "style", "cursor: pointer"), None);
    }

    #[test]
    fn other_attributes_pass_through() {
        let r = rewriter();
        assert_eq!(r.rewrite("img", "alt", "logo").as_deref(), Some("logo"));
    }

    #[test]
    fn forbidden_and_data_attributes_are_dropped() {
        let r = rewriter();
        assert_eq!(r.rewrite("input", "tabindex", "1"), None);
        assert_eq!(r.rewrite("div", "data-track", "x"), None);
    }

    #[test]
    fn links_are_hardened() {
        let mut a = ElementNode::html("a");
        a.set_attribute("target", "_top");
        a.set_attribute("rel", "opener");
        harden_link(&mut a);
        assert_eq!(a.get_attribute("rel"), Some(LINK_REL));
        assert_eq!(a.get_attribute("target"), Some(LINK_TARGET));

        let mut p = ElementNode::html("p");
        harden_link(&mut p);
        assert!(p.attributes.is_empty());
    }

    #[test]
    fn style_element_text_is_replaced() {
        let style = Node::new(NodeKind::Element(ElementNode::html("style")));
        dom_tree::set_text_content(&style, "body .x { color: red; cursor: none }".to_string());
        rewrite_style_element(&style, &ScopeId::new("defanged", 9));
        assert_eq!(
            dom_tree::text_content(&style),
            "#defanged9 .defanged9-x{color:red;}"
        );
    }
}
