//! An owned rule tree read from a lightningcss stylesheet.
//!
//! Only the rule kinds the walker knows how to sanitize are converted; every
//! other at-rule becomes `RuleNode::Other` and contributes nothing.

use crate::style::declarations::Declaration;
use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::Property;
use lightningcss::rules::keyframes::{Keyframe, KeyframesName, KeyframesRule};
use lightningcss::rules::media::MediaRule;
use lightningcss::rules::{style::StyleRule, CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;
use lightningcss::vendor_prefix::VendorPrefix;
use log::warn;

/// A parsed stylesheet. `rules` is `None` when the parser could not produce
/// a rule list at all.
#[derive(Debug, Clone, Default)]
pub struct OwnedStylesheet {
    pub rules: Option<Vec<RuleNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    Style(OwnedStyleRule),
    Media(OwnedMediaRule),
    Keyframes(OwnedKeyframesRule),
    Keyframe(OwnedKeyframe),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedStyleRule {
    /// Selector list text, e.g. "div, .red > #header".
    pub selector: Option<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedMediaRule {
    pub media: String,
    pub rules: Option<Vec<RuleNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedKeyframesRule {
    pub name: String,
    pub rules: Option<Vec<RuleNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedKeyframe {
    /// Keyframe selector text, e.g. "from", "50%", "0%, 100%".
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

/// Parse a raw CSS string (LightningCSS) and convert it to an owned rule tree.
///
/// Invalid rules are skipped by the parser; a sheet that cannot be parsed at
/// all yields a stylesheet without a rule list.
pub fn parse_stylesheet(css_text: &str) -> OwnedStylesheet {
    let parser_opts = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    match StyleSheet::parse(css_text, parser_opts) {
        Ok(sheet) => OwnedStylesheet {
            rules: Some(convert_rules(&sheet.rules)),
        },
        Err(err) => {
            warn!("unparseable stylesheet: {}", err);
            OwnedStylesheet { rules: None }
        }
    }
}

fn convert_rules(rules: &CssRuleList<'_>) -> Vec<RuleNode> {
    rules.0.iter().map(convert_rule).collect()
}

fn convert_rule(rule: &CssRule<'_>) -> RuleNode {
    match rule {
        CssRule::Style(style_rule) => RuleNode::Style(convert_style_rule(style_rule)),
        CssRule::Media(media_rule) => RuleNode::Media(convert_media_rule(media_rule)),
        CssRule::Keyframes(keyframes_rule) => {
            RuleNode::Keyframes(convert_keyframes_rule(keyframes_rule))
        }
        _ => RuleNode::Other,
    }
}

/// Helper to copy a single StyleRule's selectors + declarations.
fn convert_style_rule(style_rule: &StyleRule<'_>) -> OwnedStyleRule {
    let selectors: Vec<String> = style_rule
        .selectors
        .0
        .iter()
        .filter_map(|selector| selector.to_css_string(PrinterOptions::default()).ok())
        .collect();

    OwnedStyleRule {
        selector: (!selectors.is_empty()).then(|| selectors.join(",")),
        declarations: declarations_from_block(&style_rule.declarations),
    }
}

fn convert_media_rule(media_rule: &MediaRule<'_>) -> OwnedMediaRule {
    OwnedMediaRule {
        media: media_rule
            .query
            .to_css_string(PrinterOptions::default())
            .unwrap_or_default(),
        rules: Some(convert_rules(&media_rule.rules)),
    }
}

fn convert_keyframes_rule(keyframes_rule: &KeyframesRule<'_>) -> OwnedKeyframesRule {
    let name = match &keyframes_rule.name {
        KeyframesName::Ident(ident) => {
            let name: &str = &ident.0;
            name.to_owned()
        }
        KeyframesName::Custom(custom) => {
            let name: &str = custom;
            name.to_owned()
        }
    };
    OwnedKeyframesRule {
        name,
        rules: Some(
            keyframes_rule
                .keyframes
                .iter()
                .map(|keyframe| RuleNode::Keyframe(convert_keyframe(keyframe)))
                .collect(),
        ),
    }
}

fn convert_keyframe(keyframe: &Keyframe<'_>) -> OwnedKeyframe {
    let selectors: Vec<String> = keyframe
        .selectors
        .iter()
        .filter_map(|selector| selector.to_css_string(PrinterOptions::default()).ok())
        .collect();
    OwnedKeyframe {
        selector: selectors.join(","),
        declarations: declarations_from_block(&keyframe.declarations),
    }
}

/// Reads a DeclarationBlock into owned declarations: normal ones first, then
/// the `!important` ones, each in source order.
///
/// lightningcss keeps the two groups in separate lists and does not record
/// how they interleaved, so source order across groups cannot be rebuilt.
/// The cascade is unaffected: an important declaration wins over a normal
/// one regardless of position, and order only matters within a group.
pub fn declarations_from_block(block: &DeclarationBlock<'_>) -> Vec<Declaration> {
    let normal = block.declarations.iter().map(|p| (p, false));
    let important = block.important_declarations.iter().map(|p| (p, true));
    normal
        .chain(important)
        .filter_map(|(property, important)| convert_property(property, important))
        .collect()
}

fn convert_property(property: &Property<'_>, important: bool) -> Option<Declaration> {
    let property_id = property.property_id();
    let value = property
        .value_to_css_string(PrinterOptions::default())
        .ok()?;
    let name = format!(
        "{}{}",
        prefix_text(property_id.prefix()),
        property_id.name()
    );
    Some(Declaration::new(name, value, important))
}

fn prefix_text(prefix: VendorPrefix) -> &'static str {
    if prefix.contains(VendorPrefix::WebKit) {
        "-webkit-"
    } else if prefix.contains(VendorPrefix::Moz) {
        "-moz-"
    } else if prefix.contains(VendorPrefix::Ms) {
        "-ms-"
    } else if prefix.contains(VendorPrefix::O) {
        "-o-"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules(css: &str) -> Vec<RuleNode> {
        parse_stylesheet(css).rules.unwrap_or_default()
    }

    #[test]
    fn converts_style_rule() {
        let parsed = rules(".red { color: red; }");
        assert_eq!(
            parsed,
            vec![RuleNode::Style(OwnedStyleRule {
                selector: Some(".red".to_string()),
                declarations: vec![Declaration::new("color", "red", false)],
            })]
        );
    }

    #[test]
    fn converts_nested_media_rule() {
        let parsed = rules("@media screen { p { margin: 0 } }");
        let [RuleNode::Media(media)] = parsed.as_slice() else {
            panic!("expected one media rule, got {parsed:?}");
        };
        assert_eq!(media.media, "screen");
        assert_eq!(media.rules.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn converts_keyframes() {
        let parsed = rules("@keyframes spin { from { opacity: 0 } to { opacity: 1 } }");
        let [RuleNode::Keyframes(keyframes)] = parsed.as_slice() else {
            panic!("expected one keyframes rule, got {parsed:?}");
        };
        assert_eq!(keyframes.name, "spin");
        let frames = keyframes.rules.clone().unwrap_or_default();
        assert_eq!(
            frames,
            vec![
                RuleNode::Keyframe(OwnedKeyframe {
                    selector: "from".to_string(),
                    declarations: vec![Declaration::new("opacity", "0", false)],
                }),
                RuleNode::Keyframe(OwnedKeyframe {
                    selector: "to".to_string(),
                    declarations: vec![Declaration::new("opacity", "1", false)],
                }),
            ]
        );
    }

    #[test]
    fn unsupported_at_rules_become_other() {
        let parsed = rules("@page { margin: 1cm } @font-face { font-family: x; src: url(x.woff) }");
        assert!(parsed.iter().all(|rule| *rule == RuleNode::Other));
    }

    #[test]
    fn important_declarations_follow_normal_ones() {
        let parsed = rules("p { color: red !important; margin: 0 }");
        let [RuleNode::Style(style)] = parsed.as_slice() else {
            panic!("expected one style rule, got {parsed:?}");
        };
        assert_eq!(
            style.declarations,
            vec![
                Declaration::new("margin", "0", false),
                Declaration::new("color", "red", true),
            ]
        );
    }
}
