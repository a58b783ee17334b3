//! The sanitization pipeline: HTML sanitizer, scope rewrites, and assembly of
//! the isolated fragment.

use crate::config::SanitizerConfig;
use crate::dom::dom_tree::{self, ElementNode, Handle, Node, NodeKind};
use crate::dom::serialize;
use crate::error::ConfigError;
use crate::hooks::{self, AttributeRewriter};
use crate::parser::dom_indices::DomIndices;
use crate::parser::html::create_dom_tree;
use crate::scope::{ScopeCounter, ScopeId};
use ammonia::Builder;
use log::debug;
use std::rc::Rc;
use std::sync::Arc;

/// Presentational elements common in email on top of ammonia's defaults.
const EMAIL_TAGS: &[&str] = &[
    "style", "font", "label", "big", "tfoot", "section", "main", "address",
];

const EMAIL_ATTRIBUTES: &[&str] = &[
    "style",
    "id",
    "class",
    "dir",
    "align",
    "valign",
    "bgcolor",
    "width",
    "height",
    "border",
    "cellpadding",
    "cellspacing",
];

/// Elements whose text must not leak into the body once the tag is gone.
const DROPPED_CONTENT_TAGS: &[&str] = &["title"];

/// Turns untrusted email HTML into a fragment that can be mounted directly in
/// the host page.
#[derive(Debug)]
pub struct Sanitizer {
    config: SanitizerConfig,
    counter: Arc<ScopeCounter>,
}

impl Sanitizer {
    /// Builds a sanitizer drawing scope ids from the process-wide counter, so
    /// no two sanitizers in one process ever hand out the same id.
    pub fn new(config: SanitizerConfig) -> Result<Self, ConfigError> {
        Self::with_counter(config, ScopeCounter::process_wide())
    }

    /// Builds a sanitizer drawing scope ids from a shared counter.
    pub fn with_counter(
        config: SanitizerConfig,
        counter: Arc<ScopeCounter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Sanitizer { config, counter })
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Sanitizes one HTML document.
    ///
    /// Never fails: hostile or malformed input degrades to an empty or
    /// partially styled fragment.
    pub fn sanitize(&self, raw_html: &str) -> SanitizedFragment {
        let scope = self.counter.allocate(&self.config.scope_prefix);
        debug!("sanitizing {} bytes as {}", raw_html.len(), scope);

        let cleaned = self.html_sanitizer(&scope).clean(raw_html).to_string();

        // Take ownership of the sanitizer's output as a tree of our own.
        let document = create_dom_tree(&cleaned);
        let indices = DomIndices::build(&document);

        let styles = indices.by_tag("style");
        for style in styles {
            hooks::rewrite_style_element(style, &scope);
        }

        let container = self.container(&scope);
        for style in styles {
            dom_tree::append_child(&container, Rc::clone(style));
        }
        if let Some(body) = indices.by_tag("body").first() {
            let children = body.borrow().children.clone();
            for child in children {
                dom_tree::append_child(&container, child);
            }
        }

        for element in dom_tree::descendant_elements(&container) {
            if let Some(elem) = element.borrow_mut().as_element_mut() {
                hooks::harden_link(elem);
            }
        }

        debug!("{}: kept {} stylesheet(s)", scope, styles.len());
        SanitizedFragment {
            scope,
            root: container,
        }
    }

    /// Configures ammonia for one call; the attribute filter is bound to
    /// `scope`.
    fn html_sanitizer(&self, scope: &ScopeId) -> Builder<'_> {
        let rewriter = AttributeRewriter::new(scope.clone(), &self.config.forbidden_attributes);
        let mut builder = Builder::default();
        builder
            .add_tags(EMAIL_TAGS)
            .rm_clean_content_tags(&["style"])
            .add_generic_attributes(EMAIL_ATTRIBUTES)
            .add_tag_attributes("label", &["for"])
            .add_tag_attributes("font", &["color", "face", "size"])
            .rm_tags(&self.config.forbidden_tags)
            .add_clean_content_tags(&self.config.forbidden_tags)
            .add_clean_content_tags(DROPPED_CONTENT_TAGS)
            .rm_generic_attributes(&self.config.forbidden_attributes)
            .strip_comments(true)
            .attribute_filter(move |element, attribute, value| {
                rewriter.rewrite(element, attribute, value)
            });
        builder
    }

    fn container(&self, scope: &ScopeId) -> Handle {
        let mut element = ElementNode::html("div");
        element.set_attribute("id", scope.as_str());
        element.set_attribute("style", &self.config.container_style);
        Node::new(NodeKind::Element(element))
    }
}

/// The isolated result of one `Sanitizer::sanitize` call: a `<div>` carrying
/// the scope id, holding the sanitized stylesheets followed by the body
/// content. Owned by the caller.
#[derive(Debug)]
pub struct SanitizedFragment {
    scope: ScopeId,
    root: Handle,
}

impl SanitizedFragment {
    pub fn scope_id(&self) -> &ScopeId {
        &self.scope
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }

    pub fn into_root(self) -> Handle {
        self.root
    }

    pub fn to_html(&self) -> String {
        serialize::to_html(&self.root)
    }
}
