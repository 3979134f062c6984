//! `<picture>` wrapping for raster images in pages.

use std::sync::LazyLock;

use regex::Regex;

use super::MarkupRewriter;

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());
static PICTURE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<(/?)picture\b").unwrap());
static SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\ssrc\s*=\s*["']([^"']+)["']"#).unwrap());

const RASTER: &[&str] = &["jpg", "jpeg", "png"];

/// Wraps raster `<img>` tags outside any `<picture>`:
///
/// ```text
/// <img src="img/a.jpg">
/// ```
/// becomes
/// ```text
/// <picture><source srcset="img/a.webp" type="image/webp"><img src="img/a.jpg"></picture>
/// ```
pub struct PictureRewriter;

impl MarkupRewriter for PictureRewriter {
    fn inject_webp(&self, html: &str) -> String {
        let pictures: Vec<(usize, bool)> = PICTURE
            .captures_iter(html)
            .filter_map(|c| Some((c.get(0)?.start(), c[1].is_empty())))
            .collect();

        let mut out = String::with_capacity(html.len());
        let mut last = 0;
        for tag in IMG_TAG.find_iter(html) {
            if inside_picture(&pictures, tag.start()) {
                continue;
            }
            let Some(webp) = SRC
                .captures(tag.as_str())
                .and_then(|c| webp_source(&c[1]))
            else {
                continue;
            };

            out.push_str(&html[last..tag.start()]);
            out.push_str("<picture><source srcset=\"");
            out.push_str(&webp);
            out.push_str("\" type=\"image/webp\">");
            out.push_str(tag.as_str());
            out.push_str("</picture>");
            last = tag.end();
        }
        out.push_str(&html[last..]);
        out
    }
}

/// Whether the last `<picture>` boundary before `pos` opened one.
fn inside_picture(pictures: &[(usize, bool)], pos: usize) -> bool {
    pictures
        .iter()
        .take_while(|(start, _)| *start < pos)
        .last()
        .is_some_and(|(_, open)| *open)
}

/// `img/a.jpg?v=1` to `img/a.webp?v=1`, for raster sources only.
fn webp_source(src: &str) -> Option<String> {
    let split = src.find(['?', '#']).unwrap_or(src.len());
    let (path, suffix) = src.split_at(split);
    let (stem, ext) = path.rsplit_once('.')?;
    if ext.contains('/') || !RASTER.iter().any(|r| ext.eq_ignore_ascii_case(r)) {
        return None;
    }
    Some(format!("{stem}.webp{suffix}"))
}
