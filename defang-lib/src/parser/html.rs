//! This module parses HTML into the owned DOM tree defined in
//! `crate::dom::dom_tree`.
//!
//! It uses html5ever as the HTML parser. The sink implements the full set of
//! tree mutations the HTML tree builder relies on (insert-before, detach,
//! reparent) so that foster parenting and misnested formatting elements end up
//! where a browser would put them.

use crate::dom::dom_tree::{self, ElementNode, Handle, Node, NodeKind};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, NodeOrText, QuirksMode, TreeSink},
    LocalName, Namespace, QualName,
};
use log::trace;
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

/// Parses `html_content` as a whole document.
///
/// The result always has the `html`/`head`/`body` skeleton the HTML parsing
/// algorithm synthesizes, whatever the input looked like.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let tree_sink = DefangTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content)
}

/// A TreeSink building the owned DOM tree.
pub struct DefangTreeSink {
    document: dom_tree::Document,
    quirks_mode: RefCell<QuirksMode>,
}

impl DefangTreeSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }

    fn append_text(&self, parent: &Handle, text: &str) {
        if let Some(last) = parent.borrow().children.last() {
            if let NodeKind::Text(existing) = &mut last.borrow_mut().kind {
                existing.push_str(text);
                return;
            }
        }
        dom_tree::append_child(parent, Node::new(NodeKind::Text(text.to_string())));
    }
}

impl Default for DefangTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct DefangElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for DefangElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for DefangTreeSink {
    type Handle = Handle;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = DefangElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        trace!("html parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        Rc::clone(&self.document.root)
    }

    /// The tree builder only asks for names of elements; anything else gets
    /// an empty name that matches no tag.
    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match target.borrow().as_element() {
            Some(elem) => DefangElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            },
            None => DefangElemName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            },
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: html5ever::interface::ElementFlags,
    ) -> Self::Handle {
        let mut element = ElementNode::new(name.local.to_string(), name);
        element.attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Node::new(NodeKind::Element(element))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Node::new(NodeKind::Comment(text.to_string()))
    }

    /// Processing instructions only occur in XML; keep them as comments.
    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        Node::new(NodeKind::Comment(format!("?{} {}", target, data)))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => dom_tree::append_child(parent, node),
            NodeOrText::AppendText(text) => self.append_text(parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if dom_tree::parent_of(element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        Rc::clone(target)
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => dom_tree::insert_before(sibling, node),
            NodeOrText::AppendText(text) => {
                if let Some(prev) = dom_tree::previous_sibling(sibling) {
                    if let NodeKind::Text(existing) = &mut prev.borrow_mut().kind {
                        existing.push_str(&text);
                        return;
                    }
                }
                dom_tree::insert_before(sibling, Node::new(NodeKind::Text(text.to_string())));
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        let mut target_node = target.borrow_mut();

        if let Some(elem_node) = target_node.as_element_mut() {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if elem_node.get_attribute(&key).is_none() {
                    elem_node.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        dom_tree::detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = std::mem::take(&mut node.borrow_mut().children);
        for child in children {
            child.borrow_mut().parent = None;
            dom_tree::append_child(new_parent, child);
        }
    }
}
