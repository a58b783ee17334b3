use html5ever::{LocalName, Namespace, QualName};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;

    pub type Handle = Rc<RefCell<Node>>;

    const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

    #[derive(Debug)]
    pub enum NodeKind {
        DocumentRoot,
        Element(ElementNode),
        Text(String),
        Comment(String),
    }

    /// A node in the owned tree. Parents are weak so that a detached
    /// subtree is freed as soon as the last strong handle goes away.
    #[derive(Debug)]
    pub struct Node {
        pub kind: NodeKind,
        pub parent: Option<Weak<RefCell<Node>>>,
        pub children: Vec<Handle>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        pub attributes: Vec<(String, String)>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: Handle,
        pub doctype: RefCell<Option<Doctype>>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl Node {
        pub fn new(kind: NodeKind) -> Handle {
            Rc::new(RefCell::new(Node {
                kind,
                parent: None,
                children: Vec::new(),
            }))
        }

        pub fn as_element(&self) -> Option<&ElementNode> {
            match &self.kind {
                NodeKind::Element(elem) => Some(elem),
                _ => None,
            }
        }

        pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
            match &mut self.kind {
                NodeKind::Element(elem) => Some(elem),
                _ => None,
            }
        }

        /// True if this node is an element with the given (lowercase) tag.
        pub fn is_element(&self, tag: &str) -> bool {
            self.as_element().is_some_and(|elem| elem.tag == tag)
        }
    }

    impl ElementNode {
        pub fn new(tag: String, qual_name: QualName) -> Self {
            ElementNode {
                tag,
                qual_name,
                attributes: Vec::new(),
            }
        }

        /// Creates an element in the HTML namespace.
        pub fn html(tag: &str) -> Self {
            let qual_name = QualName::new(
                None,
                Namespace::from(HTML_NAMESPACE),
                LocalName::from(tag),
            );
            ElementNode::new(tag.to_string(), qual_name)
        }

        pub fn get_attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }

        /// Replaces the value of an existing attribute, or appends it.
        pub fn set_attribute(&mut self, name: &str, value: &str) {
            match self.attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => self
                    .attributes
                    .push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Node::new(NodeKind::DocumentRoot),
            doctype: RefCell::new(None),
        }
    }

    pub fn parent_of(node: &Handle) -> Option<Handle> {
        node.borrow().parent.as_ref().and_then(Weak::upgrade)
    }

    /// Removes `node` from its parent's child list. No-op for a root.
    pub fn detach(node: &Handle) {
        let Some(parent) = parent_of(node) else {
            return;
        };
        parent
            .borrow_mut()
            .children
            .retain(|child| !Rc::ptr_eq(child, node));
        node.borrow_mut().parent = None;
    }

    /// Moves `child` to the end of `parent`'s child list.
    pub fn append_child(parent: &Handle, child: Handle) {
        detach(&child);
        child.borrow_mut().parent = Some(Rc::downgrade(parent));
        parent.borrow_mut().children.push(child);
    }

    /// Moves `child` immediately before `sibling`. Does nothing if
    /// `sibling` has no parent.
    pub fn insert_before(sibling: &Handle, child: Handle) {
        let Some(parent) = parent_of(sibling) else {
            return;
        };
        detach(&child);
        child.borrow_mut().parent = Some(Rc::downgrade(&parent));
        let mut parent_borrow = parent.borrow_mut();
        let index = parent_borrow
            .children
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling))
            .unwrap_or(parent_borrow.children.len());
        parent_borrow.children.insert(index, child);
    }

    /// Returns the sibling just before `node`, if any.
    pub fn previous_sibling(node: &Handle) -> Option<Handle> {
        let parent = parent_of(node)?;
        let parent_borrow = parent.borrow();
        let index = parent_borrow
            .children
            .iter()
            .position(|c| Rc::ptr_eq(c, node))?;
        index
            .checked_sub(1)
            .map(|i| Rc::clone(&parent_borrow.children[i]))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(node: &Handle) -> String {
        let mut out = String::new();
        collect_text(node, &mut out);
        out
    }

    fn collect_text(node: &Handle, out: &mut String) {
        let node_ref = node.borrow();
        match &node_ref.kind {
            NodeKind::Text(text) => out.push_str(text),
            _ => {
                for child in &node_ref.children {
                    collect_text(child, out);
                }
            }
        }
    }

    /// Replaces every child of `node` with a single text node.
    pub fn set_text_content(node: &Handle, text: String) {
        let old_children = std::mem::take(&mut node.borrow_mut().children);
        for child in old_children {
            child.borrow_mut().parent = None;
        }
        append_child(node, Node::new(NodeKind::Text(text)));
    }

    /// Every descendant element of `node`, in document (pre-)order.
    pub fn descendant_elements(node: &Handle) -> Vec<Handle> {
        let mut found = Vec::new();
        collect_elements(node, &mut found);
        found
    }

    fn collect_elements(node: &Handle, found: &mut Vec<Handle>) {
        for child in &node.borrow().children {
            if child.borrow().as_element().is_some() {
                found.push(Rc::clone(child));
            }
            collect_elements(child, found);
        }
    }
}

/// HTML serialization of the owned tree.
pub mod serialize {
    use super::dom_tree::{Handle, NodeKind};

    /// A list of void (self-closing) elements in HTML.
    const VOID_ELEMENTS: &[&str] = &[
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ];

    /// Elements whose text children are emitted without entity escaping.
    const RAW_TEXT_ELEMENTS: &[&str] = &[
        "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
    ];

    /// Serializes `node` and its subtree. A document root serializes as
    /// the concatenation of its children.
    pub fn to_html(node: &Handle) -> String {
        let mut out = String::new();
        write_node(node, false, &mut out);
        out
    }

    fn write_node(node: &Handle, raw_text: bool, out: &mut String) {
        let node_ref = node.borrow();
        match &node_ref.kind {
            NodeKind::DocumentRoot => {
                for child in &node_ref.children {
                    write_node(child, false, out);
                }
            }
            NodeKind::Element(elem) => {
                out.push('<');
                out.push_str(&elem.tag);
                for (k, v) in &elem.attributes {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    escape_attribute(v, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                    return;
                }
                let children_raw = RAW_TEXT_ELEMENTS.contains(&elem.tag.as_str());
                for child in &node_ref.children {
                    write_node(child, children_raw, out);
                }
                out.push_str("</");
                out.push_str(&elem.tag);
                out.push('>');
            }
            NodeKind::Text(text) if raw_text => {
                // `</` would let the content close its own container.
                out.push_str(&text.replace("</", "<\\/"));
            }
            NodeKind::Text(text) => escape_text(text, out),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }

    fn escape_text(text: &str, out: &mut String) {
        for ch in text.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '\u{a0}' => out.push_str("&nbsp;"),
                _ => out.push(ch),
            }
        }
    }

    fn escape_attribute(value: &str, out: &mut String) {
        for ch in value.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '"' => out.push_str("&quot;"),
                '\u{a0}' => out.push_str("&nbsp;"),
                _ => out.push(ch),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::dom_tree::{self, ElementNode, Node, NodeKind};
    use super::serialize::to_html;

    fn element(tag: &str) -> dom_tree::Handle {
        Node::new(NodeKind::Element(ElementNode::html(tag)))
    }

    #[test]
    fn append_moves_node_between_parents() {
        let a = element("div");
        let b = element("div");
        let child = element("span");
        dom_tree::append_child(&a, child.clone());
        dom_tree::append_child(&b, child.clone());
        assert!(a.borrow().children.is_empty());
        assert_eq!(b.borrow().children.len(), 1);
    }

    #[test]
    fn insert_before_keeps_order() {
        let parent = element("ul");
        let first = element("li");
        let last = element("li");
        dom_tree::append_child(&parent, last.clone());
        dom_tree::insert_before(&last, first.clone());
        let prev = dom_tree::previous_sibling(&last);
        assert!(prev.is_some_and(|p| std::rc::Rc::ptr_eq(&p, &first)));
    }

    #[test]
    fn serializes_escaped_text_and_attributes() {
        let p = element("p");
        if let Some(elem) = p.borrow_mut().as_element_mut() {
            elem.set_attribute("title", "a \"b\" & c");
        }
        dom_tree::append_child(&p, Node::new(NodeKind::Text("1 < 2".into())));
        assert_eq!(
            to_html(&p),
            "<p title=\"a &quot;b&quot; &amp; c\">1 &lt; 2</p>"
        );
    }

    #[test]
    fn raw_text_cannot_close_its_container() {
        let style = element("style");
        dom_tree::set_text_content(&style, "a{content:\"</style>\"}".into());
        assert_eq!(
            to_html(&style),
            "<style>a{content:\"<\\/style>\"}</style>"
        );
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let br = element("br");
        assert_eq!(to_html(&br), "<br>");
    }
}
