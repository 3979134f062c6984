//! Stack sprite from single-icon SVG files.
//!
//! Every icon becomes a nested `<svg id="name">`; only the one addressed
//! by the URL fragment is displayed, so `icons.svg#arrow` shows the arrow.

use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::escape;
use quick_xml::reader::Reader;

use super::{SpriteBuilder, ToolError, ToolResult};

const STACK_STYLE: &str = ":root>svg{display:none}:root>svg:target{display:block}";

/// Root attributes carried over to the nested icon element.
const KEPT_ATTRIBUTES: &[&str] = &["viewBox", "preserveAspectRatio", "fill", "stroke"];

pub struct StackSprite;

impl SpriteBuilder for StackSprite {
    fn stack(&self, icons: &[(String, Vec<u8>)]) -> ToolResult<String> {
        let mut out = String::from(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
        );
        out.push_str("<style>");
        out.push_str(STACK_STYLE);
        out.push_str("</style>");

        for (name, bytes) in icons {
            let svg = std::str::from_utf8(bytes)
                .map_err(|_| ToolError(format!("icon `{name}` is not UTF-8")))?;
            let icon = parse_icon(svg).map_err(|e| ToolError(format!("icon `{name}`: {e}")))?;

            out.push_str("<svg id=\"");
            out.push_str(&escape(name.as_str()));
            out.push('"');
            for (key, value) in &icon.attributes {
                out.push_str(&format!(" {key}=\"{}\"", escape(value.as_str())));
            }
            out.push('>');
            out.push_str(icon.inner);
            out.push_str("</svg>");
        }

        out.push_str("</svg>");
        Ok(out)
    }
}

struct Icon<'a> {
    attributes: Vec<(String, String)>,
    inner: &'a str,
}

fn parse_icon(svg: &str) -> Result<Icon<'_>, String> {
    let mut reader = Reader::from_str(svg);
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) if start.name().as_ref() == b"svg" => {
                let attributes = root_attributes(&start);
                let end = start.to_end().into_owned();
                let span = reader.read_to_end(end.name()).map_err(|e| e.to_string())?;
                let inner = svg
                    .get(span.start as usize..span.end as usize)
                    .ok_or("invalid content span")?;
                return Ok(Icon {
                    attributes,
                    inner: inner.trim(),
                });
            }
            Event::Empty(start) if start.name().as_ref() == b"svg" => {
                return Ok(Icon {
                    attributes: root_attributes(&start),
                    inner: "",
                });
            }
            Event::Eof => return Err("no <svg> root element".into()),
            _ => {}
        }
    }
}

/// Kept root attributes; a missing viewBox is derived from width/height.
fn root_attributes(start: &BytesStart<'_>) -> Vec<(String, String)> {
    let mut all = Vec::new();
    for attr in start.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        all.push((key, value));
    }

    let get = |name: &str| all.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone());
    let mut kept: Vec<_> = KEPT_ATTRIBUTES
        .iter()
        .filter_map(|name| get(name).map(|v| ((*name).to_string(), v)))
        .collect();

    if get("viewBox").is_none()
        && let (Some(w), Some(h)) = (get("width"), get("height"))
    {
        let number = |v: &str| v.trim_end_matches("px").to_string();
        kept.insert(
            0,
            ("viewBox".into(), format!("0 0 {} {}", number(&w), number(&h))),
        );
    }
    kept
}
