//! `.webp` / `.no-webp` background variants for stylesheets.
//!
//! A style rule whose `background` or `background-image` points at a PNG or
//! JPEG keeps its other declarations; the raster background moves into a
//! `.no-webp` rule and a `.webp` rule gets the same declaration with the
//! url pointing at the `.webp` sibling. Selectors starting with `html` get
//! the class appended instead of prefixed.
//!
//! ```text
//! .hero { color: red; background: url(a.jpg); }
//! ```
//! becomes
//! ```text
//! .hero { color: red; }
//! .no-webp .hero { background: url(a.jpg); }
//! .webp .hero { background: url(a.webp); }
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Matches a `url(...)` ending in a raster extension, keeping the parts
/// around the extension.
static RASTER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(url\(\s*['"]?[^'")]*?)\.(?:png|jpe?g)((?:\?[^'")]*)?['"]?\s*\))"#).unwrap()
});

/// Conditional group rules whose bodies hold style rules.
const GROUP_RULES: &[&str] = &["@media", "@supports", "@layer", "@container", "@document"];

/// Class names (with leading dot) set on `<html>` by the feature check.
#[derive(Debug, Clone)]
pub struct WebpClasses {
    pub webp: String,
    pub no_webp: String,
}

/// Rewrite every raster background rule in `css`.
pub fn inject(css: &str, classes: &WebpClasses) -> String {
    let mut out = String::with_capacity(css.len() + css.len() / 2);
    rewrite_block(css, classes, &mut out);
    out
}

fn rewrite_block(css: &str, classes: &WebpClasses, out: &mut String) {
    let mut rest = css;
    while !rest.trim().is_empty() {
        match next_item(rest) {
            Item::Statement(text, tail) => {
                out.push_str(text);
                rest = tail;
            }
            Item::Block {
                prelude,
                body,
                tail,
            } => {
                let (comments, prelude_text) = split_leading_comments(prelude);
                out.push_str(comments);
                let head = prelude_text.trim();

                if head.starts_with('@') {
                    let end = head
                        .find(|c: char| !(c == '@' || c == '-' || c.is_ascii_alphanumeric()))
                        .unwrap_or(head.len());
                    let keyword = &head[..end];
                    if GROUP_RULES.iter().any(|r| keyword.eq_ignore_ascii_case(r)) {
                        out.push_str(prelude_text);
                        out.push('{');
                        rewrite_block(body, classes, out);
                        out.push_str("}\n");
                    } else {
                        push_verbatim(out, prelude_text, body);
                    }
                } else {
                    rewrite_rule(prelude_text, body, classes, out);
                }
                rest = tail;
            }
            Item::Trailing(text) => {
                out.push_str(text);
                break;
            }
        }
    }
    out.push_str(trailing_whitespace(rest));
}

fn push_verbatim(out: &mut String, prelude: &str, body: &str) {
    out.push_str(prelude);
    out.push('{');
    out.push_str(body);
    out.push('}');
}

fn rewrite_rule(prelude: &str, body: &str, classes: &WebpClasses, out: &mut String) {
    let declarations = split_top_level(body, b';');
    let (raster, other): (Vec<&str>, Vec<&str>) = declarations
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .partition(|d| is_raster_background(d));

    if raster.is_empty() {
        push_verbatim(out, prelude, body);
        return;
    }

    let selectors: Vec<&str> = split_top_level(prelude, b',')
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let leading = &prelude[..prelude.len() - prelude.trim_start().len()];
    out.push_str(leading);

    if !other.is_empty() {
        push_rule(out, &selectors.join(", "), other.iter().map(|d| d.to_string()));
    }
    push_rule(
        out,
        &scoped(&selectors, &classes.no_webp),
        raster.iter().map(|d| d.to_string()),
    );
    push_rule(
        out,
        &scoped(&selectors, &classes.webp),
        raster
            .iter()
            .map(|d| RASTER_URL.replace_all(d, "${1}.webp${2}").into_owned()),
    );
}

fn push_rule(out: &mut String, selector: &str, declarations: impl Iterator<Item = String>) {
    out.push_str(selector);
    out.push_str(" {\n");
    for declaration in declarations {
        out.push_str("  ");
        out.push_str(&declaration);
        out.push_str(";\n");
    }
    out.push_str("}\n");
}

fn is_raster_background(declaration: &str) -> bool {
    let Some((name, value)) = declaration.split_once(':') else {
        return false;
    };
    let name = name.trim();
    (name.eq_ignore_ascii_case("background") || name.eq_ignore_ascii_case("background-image"))
        && RASTER_URL.is_match(value)
}

/// Scope each selector under `class`.
fn scoped(selectors: &[&str], class: &str) -> String {
    selectors
        .iter()
        .map(|selector| match selector.strip_prefix("html") {
            Some(rest)
                if !rest
                    .starts_with(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
            {
                format!("html{class}{rest}")
            }
            _ => format!("{class} {selector}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Scanner
// ============================================================================

enum Item<'a> {
    /// `@import ...;` and friends, including the terminator.
    Statement(&'a str, &'a str),
    Block {
        prelude: &'a str,
        body: &'a str,
        tail: &'a str,
    },
    /// Unterminated input, emitted as is.
    Trailing(&'a str),
}

/// Split off the next statement or block at nesting depth zero.
fn next_item(css: &str) -> Item<'_> {
    let Some((index, byte)) = find_top_level(css, |b| b == b'{' || b == b';') else {
        return Item::Trailing(css);
    };
    if byte == b';' {
        return Item::Statement(&css[..=index], &css[index + 1..]);
    }

    let body_start = index + 1;
    match matching_brace(&css[body_start..]) {
        Some(len) => Item::Block {
            prelude: &css[..index],
            body: &css[body_start..body_start + len],
            tail: &css[body_start + len + 1..],
        },
        None => Item::Trailing(css),
    }
}

/// Walk `css` outside strings and comments, tracking parentheses.
///
/// The visitor receives `(index, byte, paren_depth, brace_depth)`; returning
/// `true` stops the walk at that index.
fn scan(css: &str, mut visit: impl FnMut(usize, u8, usize, usize) -> bool) -> Option<usize> {
    let bytes = css.as_bytes();
    let (mut parens, mut braces) = (0usize, 0usize);
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = css[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b => {
                if visit(i, b, parens, braces) {
                    return Some(i);
                }
                match b {
                    b'(' => parens += 1,
                    b')' => parens = parens.saturating_sub(1),
                    b'{' => braces += 1,
                    b'}' => braces = braces.saturating_sub(1),
                    _ => {}
                }
            }
        }
        i += 1;
    }
    None
}

fn find_top_level(css: &str, wanted: impl Fn(u8) -> bool) -> Option<(usize, u8)> {
    scan(css, |_, b, parens, braces| parens == 0 && braces == 0 && wanted(b))
        .map(|i| (i, css.as_bytes()[i]))
}

/// Length of the body up to the `}` closing an already opened block.
fn matching_brace(css: &str) -> Option<usize> {
    scan(css, |_, b, _, braces| b == b'}' && braces == 0)
}

/// Split on `separator` outside strings, comments, parens and blocks.
fn split_top_level(text: &str, separator: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    scan(text, |i, b, parens, braces| {
        if b == separator && parens == 0 && braces == 0 {
            parts.push(&text[start..i]);
            start = i + 1;
        }
        false
    });
    parts.push(&text[start..]);
    parts
}

/// Separate leading whitespace and comments from a prelude.
fn split_leading_comments(prelude: &str) -> (&str, &str) {
    let mut i = 0;
    loop {
        let rest = &prelude[i..];
        let trimmed = rest.trim_start();
        i += rest.len() - trimmed.len();
        if trimmed.starts_with("/*") {
            match trimmed.find("*/") {
                Some(end) => i += end + 2,
                None => return (prelude, ""),
            }
        } else {
            break;
        }
    }
    // Keep the whitespace in front of the rule with the rule itself.
    let head = prelude[..i].trim_end();
    let cut = head.len();
    (&prelude[..cut], &prelude[cut..])
}

fn trailing_whitespace(rest: &str) -> &str {
    if rest.trim().is_empty() { rest } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> WebpClasses {
        WebpClasses {
            webp: ".webp".into(),
            no_webp: ".no-webp".into(),
        }
    }

    #[test]
    fn test_background_rule_is_split() {
        let css = ".hero {\n  color: red;\n  background: url(\"../img/hero.jpg\") no-repeat;\n}\n";
        let out = inject(css, &classes());

        assert!(out.contains(".hero {\n  color: red;\n}"));
        assert!(out.contains(".no-webp .hero {\n  background: url(\"../img/hero.jpg\") no-repeat;\n}"));
        assert!(out.contains(".webp .hero {\n  background: url(\"../img/hero.webp\") no-repeat;\n}"));
    }

    #[test]
    fn test_rule_without_other_declarations_is_replaced() {
        let out = inject(".a { background-image: url(b.PNG); }", &classes());
        assert!(out.starts_with(".no-webp .a {"));
        assert!(out.contains(".no-webp .a {\n  background-image: url(b.PNG);"));
        assert!(out.contains(".webp .a {\n  background-image: url(b.webp);"));
    }

    #[test]
    fn test_html_selector_gets_class_appended() {
        let out = inject("html.dark .a, .b { background: url(x.png) }", &classes());
        assert!(out.contains("html.webp.dark .a, .webp .b {"));
        assert!(out.contains("html.no-webp.dark .a, .no-webp .b {"));
        // `htmlfoo` is a different element name
        assert_eq!(scoped(&["htmlfoo"], ".webp"), ".webp htmlfoo");
    }

    #[test]
    fn test_query_string_is_kept() {
        let out = inject(".a { background: url('x.jpeg?v=2'); }", &classes());
        assert!(out.contains("url('x.webp?v=2')"));
    }

    #[test]
    fn test_other_rules_untouched() {
        let css = ".a { color: red; }\n.b { background: url(icon.svg); }\n";
        assert_eq!(inject(css, &classes()), css);
    }

    #[test]
    fn test_media_blocks_are_rewritten() {
        let css = "@media (min-width: 768px) {\n  .a { background: url(a.jpg); }\n}\n";
        let out = inject(css, &classes());
        assert!(out.starts_with("@media (min-width: 768px) {"));
        assert!(out.contains(".webp .a {\n  background: url(a.webp);"));
        assert!(out.trim_end().ends_with('}'));
    }

    #[test]
    fn test_font_face_and_imports_are_verbatim() {
        let css = "@charset \"utf-8\";\n@font-face { src: url(f.png); }\n";
        assert_eq!(inject(css, &classes()), css);
    }

    #[test]
    fn test_data_uri_with_semicolon() {
        let css = ".a { background: url(data:image/png;base64,AAAA); color: red; }";
        let out = inject(css, &classes());
        // not a file url, kept as one declaration
        assert_eq!(out, css);
        assert_eq!(split_top_level("a: url(x;y); b: c", b';').len(), 2);
    }

    #[test]
    fn test_comments_are_preserved() {
        let css = "/* hero */\n.a { background: url(a.png); }";
        let out = inject(css, &classes());
        assert!(out.starts_with("/* hero */"));
        assert!(out.contains(".webp .a"));
    }
}
