//! Reduces a declaration block to the allowed, normalized subset.

use crate::style::allowlist;
use crate::style::owned_css;
use lightningcss::stylesheet::{ParserOptions, StyleAttribute};
use log::{trace, warn};

/// One `name: value [!important]` entry read from a parsed declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Declaration {
            name: name.into(),
            value: value.into(),
            important,
        }
    }
}

/// Folds engine-specific spellings onto the canonical property name.
///
/// Some engines expose a longhand as `<name>-value` pseudo-properties, and
/// `background-repeat` as separate `-x`/`-y` halves.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    let name = name.strip_suffix("-value").unwrap_or(&name);
    match name {
        "background-repeat-x" | "background-repeat-y" => "background-repeat".to_string(),
        _ => name.to_string(),
    }
}

/// The allow-list key: the name with a leading `-vendor-` segment removed.
fn lookup_key(name: &str) -> &str {
    let Some(rest) = name.strip_prefix('-') else {
        return name;
    };
    let vendor_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if vendor_len == 0 {
        return name;
    }
    match rest[vendor_len..].strip_prefix('-') {
        Some(unprefixed) => unprefixed,
        None => name,
    }
}

/// Returns the value to emit for `position`, or `None` to drop it.
fn position_value(value: &str) -> Option<&str> {
    match value.trim().to_ascii_lowercase().as_str() {
        "fixed" => Some("absolute"),
        "absolute" => Some("absolute"),
        "relative" => Some("relative"),
        "static" => Some("static"),
        _ => None,
    }
}

/// Produces `name:value;` text for every allowed declaration, in input order.
pub fn filter_declarations<'a, I>(declarations: I) -> String
where
    I: IntoIterator<Item = &'a Declaration>,
{
    let mut out = String::new();
    for decl in declarations {
        let name = normalize_name(&decl.name);
        let mut value = decl.value.trim();
        if value.is_empty() {
            continue;
        }
        if !allowlist::is_allowed(lookup_key(&name)) {
            trace!("dropping disallowed property {}", name);
            continue;
        }
        if name == "position" {
            match position_value(value) {
                Some(rewritten) => value = rewritten,
                None => {
                    trace!("dropping position value {}", value);
                    continue;
                }
            }
        }
        out.push_str(&name);
        out.push(':');
        out.push_str(value);
        if decl.important {
            out.push_str("!important");
        }
        out.push(';');
    }
    out
}

/// Parses an inline `style` attribute and returns its filtered text.
///
/// Invalid declarations are skipped by the parser; an unparseable attribute
/// yields an empty string.
pub fn sanitize_style_attribute(value: &str) -> String {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    match StyleAttribute::parse(value, options) {
        Ok(attribute) => {
            let declarations = owned_css::declarations_from_block(&attribute.declarations);
            filter_declarations(&declarations)
        }
        Err(err) => {
            warn!("unparseable style attribute: {}", err);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(name: &str, value: &str) -> Declaration {
        Declaration::new(name, value, false)
    }

    #[test]
    fn keeps_allowed_in_order() {
        let decls = [
            decl("color", "red"),
            decl("cursor", "pointer"),
            decl("margin-top", "4px"),
        ];
        assert_eq!(filter_declarations(&decls), "color:red;margin-top:4px;");
    }

    #[test]
    fn preserves_importance() {
        let decls = [Declaration::new("color", "blue", true)];
        assert_eq!(filter_declarations(&decls), "color:blue!important;");
    }

    #[test]
    fn fixed_position_becomes_absolute() {
        let decls = [decl("position", "fixed")];
        assert_eq!(filter_declarations(&decls), "position:absolute;");
    }

    #[test]
    fn unknown_position_values_are_dropped() {
        for value in ["sticky", "-webkit-sticky", "inherit", "fixed!"] {
            let decls = [decl("position", value)];
            assert_eq!(filter_declarations(&decls), "", "position: {value}");
        }
        let decls = [decl("position", "relative")];
        assert_eq!(filter_declarations(&decls), "position:relative;");
    }

    #[test]
    fn empty_values_are_skipped() {
        let decls = [decl("color", ""), decl("width", "  ")];
        assert_eq!(filter_declarations(&decls), "");
    }

    #[test]
    fn engine_artifacts_are_folded() {
        assert_eq!(normalize_name("padding-left-value"), "padding-left");
        assert_eq!(normalize_name("background-repeat-x"), "background-repeat");
        assert_eq!(normalize_name("background-repeat-y-value"), "background-repeat");
        assert_eq!(normalize_name("Color"), "color");
    }

    #[test]
    fn vendor_prefix_is_ignored_for_lookup() {
        assert_eq!(lookup_key("-webkit-transform"), "transform");
        assert_eq!(lookup_key("-moz-binding"), "binding");
        assert_eq!(lookup_key("--custom"), "--custom");
        assert_eq!(lookup_key("color"), "color");

        let decls = [
            decl("-webkit-transform", "rotate(1deg)"),
            decl("-moz-binding", "url(x.xml#y)"),
        ];
        assert_eq!(
            filter_declarations(&decls),
            "-webkit-transform:rotate(1deg);"
        );
    }

    #[test]
    fn style_attribute_is_parsed_and_filtered() {
        let out = sanitize_style_attribute("color: red; cursor: pointer; position: fixed");
        assert_eq!(out, "color:red;position:absolute;");
    }

    #[test]
    fn garbage_style_attribute_degrades_to_empty() {
        assert_eq!(sanitize_style_attribute("cursor: pointer; }{"), "");
    }
}
