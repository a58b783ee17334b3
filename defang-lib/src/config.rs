//! Sanitizer configuration.

use crate::error::ConfigError;
use crate::scope::DEFAULT_SCOPE_PREFIX;
use crate::style::declarations::sanitize_style_attribute;
use serde::Deserialize;

/// Elements removed together with their content, whatever the content is.
const DEFAULT_FORBIDDEN_TAGS: &[&str] = &[
    "audio", "video", "source", "track", "object", "embed", "applet", "param", "iframe", "frame",
    "frameset", "template", "marquee", "blink", "bgsound", "decorator", "element", "shadow",
    "content", "portal",
];

/// Attributes controlling form submission, focus and tabbing.
const DEFAULT_FORBIDDEN_ATTRIBUTES: &[&str] = &[
    "action",
    "method",
    "enctype",
    "formaction",
    "formmethod",
    "formenctype",
    "formtarget",
    "form",
    "tabindex",
    "accesskey",
    "autofocus",
];

/// Establishes a stacking context so scoped `z-index` values stay below the
/// host page's own chrome.
const DEFAULT_CONTAINER_STYLE: &str = "position:relative;z-index:0;";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizerConfig {
    /// Scope ids are this prefix followed by a serial number.
    pub scope_prefix: String,
    pub forbidden_tags: Vec<String>,
    pub forbidden_attributes: Vec<String>,
    pub allow_data_attributes: bool,
    /// Inline style of the container element.
    pub container_style: String,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        SanitizerConfig {
            scope_prefix: DEFAULT_SCOPE_PREFIX.to_string(),
            forbidden_tags: DEFAULT_FORBIDDEN_TAGS.iter().map(|s| s.to_string()).collect(),
            forbidden_attributes: DEFAULT_FORBIDDEN_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allow_data_attributes: false,
            container_style: DEFAULT_CONTAINER_STYLE.to_string(),
        }
    }
}

impl SanitizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_css_identifier(&self.scope_prefix) {
            return Err(ConfigError::InvalidScopePrefix(self.scope_prefix.clone()));
        }
        check_names("tag", &self.forbidden_tags)?;
        check_names("attribute", &self.forbidden_attributes)?;
        if self.allow_data_attributes {
            return Err(ConfigError::DataAttributesUnsupported);
        }
        if sanitize_style_attribute(&self.container_style).is_empty() {
            return Err(ConfigError::InvalidContainerStyle(
                self.container_style.clone(),
            ));
        }
        Ok(())
    }
}

fn is_css_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn check_names(kind: &'static str, names: &[String]) -> Result<(), ConfigError> {
    let invalid = names.iter().find(|name| {
        name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    });
    match invalid {
        Some(name) => Err(ConfigError::InvalidName {
            kind,
            name: name.clone(),
        }),
        None => Ok(()),
    }
}
