//! Walks a stylesheet's rule tree and reassembles sanitized CSS text.

use crate::scope::ScopeId;
use crate::style::declarations::filter_declarations;
use crate::style::owned_css::{self, RuleNode};
use crate::style::selector::scope_selector;
use lightningcss::printer::PrinterOptions;
use lightningcss::traits::ToCss;
use lightningcss::values::ident::Ident;
use log::trace;

/// Appends sanitized CSS for every rule in `rules`, recursively.
///
/// A missing rule list contributes nothing; whatever was already appended to
/// `out` is kept.
pub fn append_rules(rules: Option<&[RuleNode]>, scope: &ScopeId, out: &mut String) {
    let Some(rules) = rules else {
        trace!("rule list unavailable, keeping {} bytes", out.len());
        return;
    };
    for rule in rules {
        append_rule(rule, scope, out);
    }
}

fn append_rule(rule: &RuleNode, scope: &ScopeId, out: &mut String) {
    match rule {
        RuleNode::Style(style) => {
            let selector = style.selector.as_deref().unwrap_or_default();
            let Some(scoped) = scope_selector(selector, scope) else {
                trace!("dropping rule escaping the scope root: {}", selector);
                return;
            };
            out.push_str(&scoped);
            out.push('{');
            out.push_str(&filter_declarations(&style.declarations));
            out.push('}');
        }
        RuleNode::Media(media) => {
            out.push_str("@media ");
            out.push_str(&media.media);
            out.push('{');
            append_rules(media.rules.as_deref(), scope, out);
            out.push('}');
        }
        RuleNode::Keyframes(keyframes) => {
            let Some(name) = keyframes_name(&keyframes.name, scope) else {
                trace!("dropping keyframes with unprintable name {:?}", keyframes.name);
                return;
            };
            out.push_str("@keyframes ");
            out.push_str(&name);
            out.push('{');
            append_rules(keyframes.rules.as_deref(), scope, out);
            out.push('}');
        }
        RuleNode::Keyframe(keyframe) => {
            out.push_str(&keyframe.selector);
            out.push('{');
            out.push_str(&filter_declarations(&keyframe.declarations));
            out.push('}');
        }
        RuleNode::Other => trace!("dropping unsupported rule"),
    }
}

/// The scoped keyframes name, escaped as a CSS identifier. The raw name may
/// come from a string or an escaped identifier and contain any character.
fn keyframes_name(name: &str, scope: &ScopeId) -> Option<String> {
    Ident(scope.prefixed(name).into())
        .to_css_string(PrinterOptions::default())
        .ok()
}

/// Parses one stylesheet's text and returns its sanitized form.
pub fn sanitize_stylesheet(css_text: &str, scope: &ScopeId) -> String {
    let sheet = owned_css::parse_stylesheet(css_text);
    let mut out = String::new();
    append_rules(sheet.rules.as_deref(), scope, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::declarations::Declaration;
    use crate::style::owned_css::{OwnedKeyframe, OwnedMediaRule, OwnedStyleRule};
    use pretty_assertions::assert_eq;

    fn scope() -> ScopeId {
        ScopeId::new("defanged", 4)
    }

    #[test]
    fn media_wrapped_rule_is_scoped_and_filtered() {
        let css = "@media screen { .foo { color: red; cursor: pointer; } }";
        assert_eq!(
            sanitize_stylesheet(css, &scope()),
            "@media screen{#defanged4 .defanged4-foo{color:red;}}"
        );
    }

    #[test]
    fn keyframes_name_is_scoped() {
        let css = "@keyframes spin { from { opacity: 0; } to { opacity: 1; } }";
        assert_eq!(
            sanitize_stylesheet(css, &scope()),
            "@keyframes defanged4-spin{from{opacity:0;}to{opacity:1;}}"
        );
    }

    fn assert_single_scoped_keyframes(out: &str, expected_name: &str) {
        let reparsed = owned_css::parse_stylesheet(out).rules.unwrap_or_default();
        let [RuleNode::Keyframes(keyframes)] = reparsed.as_slice() else {
            panic!("expected one keyframes rule in {out}, got {reparsed:?}");
        };
        assert_eq!(keyframes.name, expected_name);
        assert!(!out.contains("}*{"), "global rule leaked: {out}");
    }

    #[test]
    fn quoted_keyframes_name_cannot_close_the_block() {
        let css = "@keyframes \"x{}*{opacity:0}@keyframes y\" { from { opacity: 0 } }";
        let out = sanitize_stylesheet(css, &scope());
        assert!(out.starts_with("@keyframes defanged4-x\\{"), "{out}");
        assert_single_scoped_keyframes(&out, "defanged4-x{}*{opacity:0}@keyframes y");
    }

    #[test]
    fn escaped_keyframes_ident_stays_escaped() {
        let css = r"@keyframes a\{\}\*\{opacity\:0\}\@media\ x { from { opacity: 0 } }";
        let out = sanitize_stylesheet(css, &scope());
        assert_single_scoped_keyframes(&out, "defanged4-a{}*{opacity:0}@media x");
    }

    #[test]
    fn unsupported_rules_are_dropped() {
        let css = "@import url(evil.css); @page { margin: 1cm } p { color: red }";
        assert_eq!(
            sanitize_stylesheet(css, &scope()),
            "#defanged4 p{color:red;}"
        );
    }

    #[test]
    fn rules_reaching_siblings_of_the_root_are_dropped() {
        let css = "body + div { color: red } body ~ * { opacity: 0 } p { color: red }";
        assert_eq!(
            sanitize_stylesheet(css, &scope()),
            "#defanged4 p{color:red;}"
        );
    }

    #[test]
    fn missing_rule_list_keeps_accumulated_output() {
        let mut out = String::from("#defanged4 p{color:red;}");
        append_rules(None, &scope(), &mut out);
        assert_eq!(out, "#defanged4 p{color:red;}");
    }

    #[test]
    fn missing_nested_rule_list_yields_empty_block() {
        let rules = [RuleNode::Media(OwnedMediaRule {
            media: "print".to_string(),
            rules: None,
        })];
        let mut out = String::new();
        append_rules(Some(&rules[..]), &scope(), &mut out);
        assert_eq!(out, "@media print{}");
    }

    #[test]
    fn undefined_selector_is_treated_as_empty() {
        let rules = [RuleNode::Style(OwnedStyleRule {
            selector: None,
            declarations: vec![Declaration::new("color", "red", false)],
        })];
        let mut out = String::new();
        append_rules(Some(&rules[..]), &scope(), &mut out);
        assert_eq!(out, "#defanged4{color:red;}");
    }

    #[test]
    fn keyframe_selectors_pass_through() {
        let rules = [RuleNode::Keyframe(OwnedKeyframe {
            selector: "50%".to_string(),
            declarations: vec![
                Declaration::new("opacity", "0.5", false),
                Declaration::new("cursor", "wait", false),
            ],
        })];
        let mut out = String::new();
        append_rules(Some(&rules[..]), &scope(), &mut out);
        assert_eq!(out, "50%{opacity:0.5;}");
    }

    #[test]
    fn fixed_positioning_cannot_escape() {
        let css = ".overlay { position: fixed; top: 0; left: 0; z-index: 9999 }";
        assert_eq!(
            sanitize_stylesheet(css, &scope()),
            "#defanged4 .defanged4-overlay{position:absolute;top:0;left:0;z-index:9999;}"
        );
    }
}
