use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::dom_tree::{Document, Handle};

/// Tag index for locating elements in a parsed document.
#[derive(Debug, Default)]
pub struct DomIndices {
    /// Maps a lowercase tag name (e.g., "style") to all nodes with that tag,
    /// in document order.
    pub tag_map: HashMap<String, Vec<Handle>>,
}

impl DomIndices {
    /// Build the index for the entire document.
    pub fn build(document: &Document) -> Self {
        let mut indices = DomIndices::default();
        Self::traverse(&document.root, &mut indices);
        indices
    }

    /// All elements with the given tag, in document order.
    pub fn by_tag(&self, tag: &str) -> &[Handle] {
        self.tag_map.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    fn traverse(node: &Handle, indices: &mut DomIndices) {
        let node_ref = node.borrow();
        if let Some(elem) = node_ref.as_element() {
            indices
                .tag_map
                .entry(elem.tag.to_ascii_lowercase())
                .or_default()
                .push(Rc::clone(node));
        }
        for child in &node_ref.children {
            Self::traverse(child, indices);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::html::create_dom_tree;

    #[test]
    fn indexes_styles_in_document_order() {
        let document = create_dom_tree(
            "<style>a{}</style><p>x</p><div><style>b{}</style></div>",
        );
        let indices = DomIndices::build(&document);
        let styles = indices.by_tag("style");
        assert_eq!(styles.len(), 2);
        assert_eq!(crate::dom::dom_tree::text_content(&styles[0]), "a{}");
        assert_eq!(crate::dom::dom_tree::text_content(&styles[1]), "b{}");
        assert_eq!(indices.by_tag("body").len(), 1);
        assert!(indices.by_tag("video").is_empty());
    }
}
