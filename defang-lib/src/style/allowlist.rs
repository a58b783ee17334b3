//! The set of CSS properties an email may keep.
//!
//! Entries ending in `-` are family prefixes: `"border-"` admits every
//! `border-*` longhand without listing them. A name is allowed if it is a
//! member, or if its text up to and including the first hyphen is a member.

use std::collections::HashSet;
use std::sync::LazyLock;

const ALLOWED_PROPERTIES: &[&str] = &[
    // box model
    "background",
    "background-",
    "border",
    "border-",
    "outline",
    "outline-",
    "margin",
    "margin-",
    "padding",
    "padding-",
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "box-sizing",
    "position",
    "top",
    "right",
    "bottom",
    "left",
    "display",
    "visibility",
    "overflow",
    "overflow-",
    "float",
    "clear",
    "clip",
    "clip-path",
    "z-index",
    "zoom",
    "object-fit",
    "object-position",
    // typography
    "font",
    "font-",
    "color",
    "opacity",
    "direction",
    "unicode-bidi",
    "letter-spacing",
    "word-spacing",
    "word-break",
    "word-wrap",
    "overflow-wrap",
    "line-height",
    "line-break",
    "hyphens",
    "text-",
    "vertical-align",
    "white-space",
    // tables
    "table-layout",
    "border-collapse",
    "border-spacing",
    "caption-side",
    "empty-cells",
    // lists and generated content
    "list-style",
    "list-",
    "content",
    "quotes",
    // printing
    "page-",
    "break-",
    "orphans",
    "widows",
    // effects
    "box-shadow",
    "animation",
    "animation-",
    "transition",
    "transition-",
    "transform",
    "transform-",
    // flexbox
    "flex",
    "flex-",
    "align-",
    "justify-content",
    "order",
    // multi-column
    "columns",
    "column-",
];

static ALLOWED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ALLOWED_PROPERTIES.iter().copied().collect());

/// Returns true if `property` may be kept.
///
/// `property` is expected lowercase and without a vendor prefix.
pub fn is_allowed(property: &str) -> bool {
    if ALLOWED.contains(property) {
        return true;
    }
    match property.find('-') {
        Some(idx) => ALLOWED.contains(&property[..=idx]),
        None => false,
    }
}
