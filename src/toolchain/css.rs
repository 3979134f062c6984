//! Stylesheet post-processing with lightningcss.

use std::cmp::Ordering;
use std::sync::LazyLock;

use lightningcss::rules::{CssRule, media::MediaRule};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;
use regex::Regex;

use super::webp_css::{self, WebpClasses};
use super::{StyleProcessor, ToolError, ToolResult};
use crate::config::CssConfig;

static MIN_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:min-width\s*:\s*|width\s*>=\s*)([\d.]+)").unwrap());
static MAX_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:max-width\s*:\s*|width\s*<=\s*)([\d.]+)").unwrap());

pub struct LightningProcessor {
    targets: Targets,
    classes: WebpClasses,
}

impl LightningProcessor {
    pub fn new(config: &CssConfig) -> ToolResult<Self> {
        let browsers = Browsers::from_browserslist(&config.browsers)
            .map_err(|e| ToolError(format!("invalid browserslist query: {e}")))?;

        Ok(Self {
            targets: browsers.map(Targets::from).unwrap_or_default(),
            classes: WebpClasses {
                webp: config.webp_class.clone(),
                no_webp: config.no_webp_class.clone(),
            },
        })
    }

    fn parse(css: &str) -> ToolResult<StyleSheet<'_>> {
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| ToolError(e.to_string()))
    }
}

impl StyleProcessor for LightningProcessor {
    fn group_media(&self, css: &str) -> ToolResult<String> {
        let mut sheet = Self::parse(css)?;

        let mut kept = Vec::with_capacity(sheet.rules.0.len());
        let mut groups: Vec<(String, MediaRule<'_>)> = Vec::new();
        for rule in sheet.rules.0.drain(..) {
            let media = match rule {
                CssRule::Media(media) => media,
                other => {
                    kept.push(other);
                    continue;
                }
            };
            let key = media
                .query
                .to_css_string(PrinterOptions::default())
                .map_err(|e| ToolError(e.to_string()))?;
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, group)) => group.rules.0.extend(media.rules.0),
                None => groups.push((key, media)),
            }
        }

        groups.sort_by(|(a, _), (b, _)| media_order(a, b));
        kept.extend(groups.into_iter().map(|(_, media)| CssRule::Media(media)));
        sheet.rules.0 = kept;

        sheet
            .to_css(PrinterOptions::default())
            .map(|res| res.code)
            .map_err(|e| ToolError(e.to_string()))
    }

    /// lightningcss adds prefixes while it minifies the rule tree, so this
    /// step also merges adjacent rules and shortens declarations. The output
    /// stays pretty-printed; only the printer's minification is left to
    /// `minify`.
    fn prefix(&self, css: &str) -> ToolResult<String> {
        let mut sheet = Self::parse(css)?;
        sheet
            .minify(MinifyOptions {
                targets: self.targets.clone(),
                ..MinifyOptions::default()
            })
            .map_err(|e| ToolError(e.to_string()))?;

        sheet
            .to_css(PrinterOptions {
                targets: self.targets.clone(),
                ..PrinterOptions::default()
            })
            .map(|res| res.code)
            .map_err(|e| ToolError(e.to_string()))
    }

    fn inject_webp(&self, css: &str) -> ToolResult<String> {
        Ok(webp_css::inject(css, &self.classes))
    }

    fn minify(&self, css: &str) -> ToolResult<String> {
        let mut sheet = Self::parse(css)?;
        sheet
            .minify(MinifyOptions {
                targets: self.targets.clone(),
                ..MinifyOptions::default()
            })
            .map_err(|e| ToolError(e.to_string()))?;

        sheet
            .to_css(PrinterOptions {
                minify: true,
                targets: self.targets.clone(),
                ..PrinterOptions::default()
            })
            .map(|res| res.code)
            .map_err(|e| ToolError(e.to_string()))
    }
}

/// Mobile-first order: `min-width` ascending, then `max-width` descending,
/// then everything else in source order.
fn media_order(a: &str, b: &str) -> Ordering {
    media_rank(a)
        .partial_cmp(&media_rank(b))
        .unwrap_or(Ordering::Equal)
}

fn media_rank(query: &str) -> (u8, f64) {
    let width = |re: &Regex| {
        re.captures(query)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    };
    if let Some(w) = width(&MIN_WIDTH) {
        (0, w)
    } else if let Some(w) = width(&MAX_WIDTH) {
        (1, -w)
    } else {
        (2, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> LightningProcessor {
        LightningProcessor::new(&CssConfig::default()).unwrap()
    }

    #[test]
    fn test_group_media_merges_and_moves_last() {
        let css = "@media (min-width: 768px) { .a { color: red; } }\n\
                   .b { color: blue; }\n\
                   @media (min-width: 768px) { .c { color: green; } }\n\
                   .d { color: black; }";
        let out = processor().group_media(css).unwrap();

        assert_eq!(out.matches("@media").count(), 1);
        let media = out.find("@media").unwrap();
        assert!(out.find(".d").unwrap() < media);
        assert!(out.find(".a").unwrap() > media);
        assert!(out.find(".c").unwrap() > out.find(".a").unwrap());
    }

    #[test]
    fn test_group_media_order() {
        let css = "@media (max-width: 600px) { .x { color: red; } }\n\
                   @media (min-width: 1200px) { .y { color: red; } }\n\
                   @media (min-width: 480px) { .z { color: red; } }\n\
                   @media (max-width: 900px) { .w { color: red; } }";
        let out = processor().group_media(css).unwrap();

        let pos = |sel: &str| out.find(sel).unwrap();
        assert!(pos(".z") < pos(".y"));
        assert!(pos(".y") < pos(".w"));
        assert!(pos(".w") < pos(".x"));
    }

    #[test]
    fn test_media_rank() {
        assert_eq!(media_rank("(min-width: 768px)"), (0, 768.0));
        assert_eq!(media_rank("(width >= 768px)"), (0, 768.0));
        assert_eq!(media_rank("(max-width: 480px)"), (1, -480.0));
        assert_eq!(media_rank("print"), (2, 0.0));
    }

    #[test]
    fn test_prefix_adds_vendor_prefixes() {
        let out = processor().prefix(".a { user-select: none; }").unwrap();
        assert!(out.contains("-webkit-user-select"));
        assert!(out.contains("user-select: none"));
    }

    #[test]
    fn test_prefix_keeps_readable_output() {
        let css = ".a {\n  color: red;\n}\n\n.b {\n  display: flex;\n}\n";
        let out = processor().prefix(css).unwrap();
        assert!(out.contains(".a {\n"), "{out}");
        assert!(out.contains(".b {\n"), "{out}");
        assert!(out.contains("color: red"), "{out}");
        assert!(out.contains("display: flex"), "{out}");
    }

    #[test]
    fn test_minify_is_smaller() {
        let css = ".a {\n  color: #ff0000;\n  margin: 0px 0px 0px 0px;\n}\n";
        let out = processor().minify(css).unwrap();
        assert!(out.len() < css.len());
        assert!(!out.contains('\n'));
    }
}
