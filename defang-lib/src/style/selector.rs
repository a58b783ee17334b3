//! Selector scoping.
//!
//! Every branch of a selector list is confined to the scope root
//! (`#<scope> <branch>`), and every id, class and `for` reference inside it is
//! renamed to `<scope>-<name>`, matching the rewritten attributes of the
//! sanitized markup. Runs once per rule; the output is not meant to be scoped
//! again.

use crate::scope::ScopeId;
use std::iter::Peekable;
use std::str::Chars;

/// Attributes whose values are rewritten into the scope namespace.
const SCOPED_ATTRIBUTES: &[&str] = &["id", "class", "for"];

/// Attribute operators whose value is rewritten. `$=` and `*=` keep matching
/// the prefixed values unchanged; `|=` is left alone and so fails closed.
const SCOPED_OPERATORS: &[&str] = &["=", "~=", "^="];

/// Rewrites a selector list so it only matches inside the scope root.
///
/// Branches that would reach outside the root are dropped; `None` means no
/// branch survived and the rule must go.
pub fn scope_selector(selector: &str, scope: &ScopeId) -> Option<String> {
    let branches = split_top_level(selector)
        .into_iter()
        .filter_map(|branch| scope_branch(branch, scope))
        .collect::<Vec<_>>();
    (!branches.is_empty()).then(|| branches.join(","))
}

fn scope_branch(branch: &str, scope: &ScopeId) -> Option<String> {
    let rest = strip_root_elements(branch);
    // A sibling combinator right after the root would select the host
    // page's elements next to the container.
    if rest.starts_with(['+', '~']) {
        return None;
    }
    let renamed = rename_references(rest, scope);
    Some(format!("#{} {}", scope, renamed).trim_end().to_string())
}

/// Splits on commas that are not nested in parentheses, brackets or strings.
fn split_top_level(selector: &str) -> Vec<&str> {
    let mut branches = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in selector.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            _ if quote.is_some() => {
                if quote == Some(ch) {
                    quote = None;
                }
            }
            '"' | '\'' => quote = Some(ch),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                branches.push(&selector[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    branches.push(&selector[start..]);
    branches
}

/// Drops leading `html`/`body` type selectors: the scope root stands in for
/// them, and the document's own root elements do not exist in the fragment.
fn strip_root_elements(branch: &str) -> &str {
    let mut rest = branch.trim();
    loop {
        let len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        let token = &rest[..len];
        if token.eq_ignore_ascii_case("html") || token.eq_ignore_ascii_case("body") {
            rest = rest[len..].trim_start();
        } else {
            return rest;
        }
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '-' || ch == '\\' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch.is_ascii_digit()
}

/// Renames `#id`, `.class` and `[id|class|for op value]` references.
fn rename_references(branch: &str, scope: &ScopeId) -> String {
    let mut out = String::with_capacity(branch.len() + 16);
    let mut chars = branch.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' | '\'' => {
                out.push(ch);
                copy_string(&mut chars, ch, &mut out);
            }
            '#' if chars.peek().is_some_and(|&c| is_name_char(c)) => {
                out.push('#');
                out.push_str(scope.as_str());
                out.push('-');
            }
            '.' if chars.peek().is_some_and(|&c| is_name_start(c)) => {
                out.push('.');
                out.push_str(scope.as_str());
                out.push('-');
            }
            '[' => {
                let content = read_attribute_selector(&mut chars);
                out.push('[');
                out.push_str(&rewrite_attribute_selector(&content, scope));
                out.push(']');
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Copies the rest of a string literal, closing quote included.
fn copy_string(chars: &mut Peekable<Chars<'_>>, quote: char, out: &mut String) {
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else if ch == quote {
            return;
        }
    }
}

/// Reads up to the closing `]`, which is consumed but not returned.
fn read_attribute_selector(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut content = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            ']' => break,
            '"' | '\'' => {
                content.push(ch);
                copy_string(chars, ch, &mut content);
            }
            '\\' => {
                content.push(ch);
                if let Some(next) = chars.next() {
                    content.push(next);
                }
            }
            _ => content.push(ch),
        }
    }
    content
}

/// Rewrites the inside of one `[...]` attribute selector.
fn rewrite_attribute_selector(content: &str, scope: &ScopeId) -> String {
    let Some(eq) = content.find('=') else {
        return content.to_string();
    };
    let (name_end, operator) = match content[..eq].chars().last() {
        Some(op @ ('~' | '^' | '$' | '*' | '|')) => (eq - op.len_utf8(), &content[eq - 1..=eq]),
        _ => (eq, "="),
    };

    let name = content[..name_end].trim();
    let local_name = name.rsplit('|').next().unwrap_or(name);
    let scoped = SCOPED_ATTRIBUTES
        .iter()
        .any(|attr| local_name.eq_ignore_ascii_case(attr));
    if !scoped || !SCOPED_OPERATORS.contains(&operator) {
        return content.to_string();
    }

    let after_op = &content[eq + 1..];
    let value_start = eq + 1 + (after_op.len() - after_op.trim_start().len());
    let value_part = &content[value_start..];

    let (quote, value, rest) = match value_part.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let body = &value_part[1..];
            let close = find_closing_quote(body, q).unwrap_or(body.len());
            let rest_start = (close + 1).min(body.len());
            (Some(q), &body[..close], &body[rest_start..])
        }
        _ => {
            let end = value_part
                .find(char::is_whitespace)
                .unwrap_or(value_part.len());
            (None, &value_part[..end], &value_part[end..])
        }
    };

    let renamed = if local_name.eq_ignore_ascii_case("class") && operator == "=" {
        value
            .split_whitespace()
            .map(|token| scope.prefixed(token))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        scope.prefixed(value)
    };

    let mut out = String::with_capacity(content.len() + 16);
    out.push_str(&content[..value_start]);
    if let Some(q) = quote {
        out.push(q);
        out.push_str(&renamed);
        out.push(q);
    } else {
        out.push_str(&renamed);
    }
    out.push_str(rest);
    out
}

fn find_closing_quote(body: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in body.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return Some(idx);
        }
    }
    None
}
