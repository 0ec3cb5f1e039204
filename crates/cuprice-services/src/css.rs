//! Custom CSS scoping
//!
//! Sellers can attach raw CSS to their pricing page. Before it is injected,
//! every selector is prefixed with the doubled container class so the rules
//! only reach the widget and out-rank its own styles, and every declaration
//! inside a style rule is marked `!important`.
//!
//! At-rules (`@media`, `@supports`, ...) are kept as written and their
//! nested rules are scoped. Keyframe selectors and at-rule bodies such as
//! `@font-face` are left untouched.

use crate::constants::SCOPE_CLASS;

/// Kind of the block a `{` opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    /// Style rule: declarations get `!important`
    Rule,
    /// Grouping at-rule whose children are style rules
    AtRule,
    /// `@keyframes`: children are keyframe selectors
    Keyframes,
    /// Anything whose body must not be rewritten
    Verbatim,
}

fn scope_prefix() -> String {
    format!(".{0}.{0}", SCOPE_CLASS)
}

/// Prefix each selector of a comma-separated list
fn scope_selector_list(prelude: &str, prefix: &str) -> String {
    prelude
        .split(',')
        .map(|selector| {
            let selector = selector.trim();
            if selector.is_empty()
                || selector.contains(SCOPE_CLASS)
                || selector.starts_with('&')
                || selector.starts_with(':')
            {
                selector.to_string()
            } else {
                format!("{} {}", prefix, selector)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Mark one declaration `!important` unless it already is
fn mark_important(declaration: &str) -> String {
    let body = declaration.trim_end();
    let trailing = &declaration[body.len()..];

    if body.trim().is_empty() || !body.contains(':') || body.contains("!important") {
        return declaration.to_string();
    }

    format!("{} !important{}", body, trailing)
}

/// Split `text` into its leading whitespace and the rest
fn split_leading_whitespace(text: &str) -> (&str, &str) {
    let rest = text.trim_start();
    (&text[..text.len() - rest.len()], rest)
}

/// Scope seller CSS to the widget container
///
/// Blank input yields an empty string.
pub fn scope_custom_css(css: &str) -> String {
    if css.trim().is_empty() {
        return String::new();
    }

    let prefix = scope_prefix();
    let mut out = String::with_capacity(css.len() * 2);
    let mut pending = String::new();
    let mut stack: Vec<Block> = Vec::new();

    let mut chars = css.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '/' if css[index..].starts_with("/*") => {
                let end = css[index + 2..]
                    .find("*/")
                    .map_or(css.len(), |offset| index + 2 + offset + 2);
                out.push_str(&pending);
                pending.clear();
                out.push_str(&css[index..end]);
                while chars.peek().is_some_and(|(i, _)| *i < end) {
                    chars.next();
                }
            }
            '{' => {
                let parent = stack.last().copied();
                let (leading, prelude) = split_leading_whitespace(&pending);
                let selector = prelude.trim_end();
                let spacing = &prelude[selector.len()..];

                let block = if selector.starts_with('@') {
                    let name = selector[1..]
                        .split(|c: char| c.is_whitespace() || c == '(')
                        .next()
                        .unwrap_or("")
                        .to_ascii_lowercase();
                    match name.as_str() {
                        "media" | "supports" | "container" | "layer" | "document" => Block::AtRule,
                        n if n.ends_with("keyframes") => Block::Keyframes,
                        _ => Block::Verbatim,
                    }
                } else {
                    match parent {
                        Some(Block::Keyframes) | Some(Block::Verbatim) => Block::Verbatim,
                        _ => Block::Rule,
                    }
                };

                out.push_str(leading);
                if block == Block::Rule && parent != Some(Block::Rule) {
                    out.push_str(&scope_selector_list(selector, &prefix));
                    out.push_str(if spacing.is_empty() { " " } else { spacing });
                } else {
                    out.push_str(prelude);
                }
                out.push('{');

                stack.push(block);
                pending.clear();
            }
            ';' | '}' => {
                if stack.last() == Some(&Block::Rule) {
                    out.push_str(&mark_important(&pending));
                } else {
                    out.push_str(&pending);
                }
                out.push(ch);
                if ch == '}' {
                    stack.pop();
                }
                pending.clear();
            }
            _ => pending.push(ch),
        }
    }

    out.push_str(&pending);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = ".cuprice-pricing-container.cuprice-pricing-container";

    #[test]
    fn test_blank_css_is_empty() {
        assert_eq!(scope_custom_css(""), "");
        assert_eq!(scope_custom_css("   \n"), "");
    }

    #[test]
    fn test_single_rule() {
        let scoped = scope_custom_css(".card { color: red; padding: 4px }");
        assert_eq!(
            scoped,
            format!("{} .card {{ color: red !important; padding: 4px !important }}", PREFIX)
        );
    }

    #[test]
    fn test_multiline_rule() {
        let css = "h1 {\n  font-size: 2rem;\n  color: blue !important;\n}\n";
        let scoped = scope_custom_css(css);
        assert!(scoped.starts_with(&format!("{} h1 {{", PREFIX)));
        assert!(scoped.contains("font-size: 2rem !important;"));
        assert!(scoped.contains("color: blue !important;"));
        assert!(!scoped.contains("!important !important"));
    }

    #[test]
    fn test_selector_lists_are_scoped_individually() {
        let scoped = scope_custom_css("h1, .title{margin:0}");
        assert!(scoped.starts_with(&format!("{} h1, {} .title {{", PREFIX, PREFIX)));
    }

    #[test]
    fn test_already_scoped_and_pseudo_selectors_kept() {
        let scoped = scope_custom_css(".cuprice-pricing-container .x { top: 0 }");
        assert!(scoped.starts_with(".cuprice-pricing-container .x {"));

        let scoped = scope_custom_css(":root { --x: 1px }");
        assert!(scoped.starts_with(":root {"));
    }

    #[test]
    fn test_media_query_children_scoped() {
        let scoped = scope_custom_css("@media (max-width: 600px) { .card { width: 100%; } }");
        assert!(scoped.starts_with("@media (max-width: 600px) {"));
        assert!(scoped.contains(&format!("{} .card {{", PREFIX)));
        assert!(scoped.contains("width: 100% !important;"));
    }

    #[test]
    fn test_keyframes_untouched() {
        let css = "@keyframes pulse { from { opacity: 0; } to { opacity: 1; } }";
        assert_eq!(scope_custom_css(css), css);
    }

    #[test]
    fn test_comments_preserved() {
        let scoped = scope_custom_css("/* brand */ .btn { color: red; }");
        assert!(scoped.starts_with("/* brand */"));
        assert!(scoped.contains(&format!("{} .btn {{", PREFIX)));
    }

    #[test]
    fn test_nested_rule_not_double_prefixed() {
        let scoped = scope_custom_css(".card { color: red; &:hover { color: blue; } }");
        assert!(scoped.contains("&:hover {"));
        assert!(scoped.contains("color: blue !important;"));
    }
}
