//! Image conversion and optimization with the `image` crate and quick-xml.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::{ImageEncoder, ToolError, ToolResult};
use crate::config::ImageConfig;

pub struct NativeImageEncoder {
    jpeg_quality: u8,
    webp_from: Vec<String>,
}

impl NativeImageEncoder {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            webp_from: config
                .webp_from
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
        }
    }
}

fn decode(bytes: &[u8]) -> ToolResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| ToolError(format!("cannot decode image: {e}")))
}

fn encode_error(e: impl std::fmt::Display) -> ToolError {
    ToolError(format!("cannot encode image: {e}"))
}

impl ImageEncoder for NativeImageEncoder {
    fn to_webp(&self, bytes: &[u8], ext: &str) -> ToolResult<Option<Vec<u8>>> {
        if !self.webp_from.iter().any(|e| e == ext) {
            return Ok(None);
        }

        let rgba = decode(bytes)?.to_rgba8();
        let mut out = Vec::new();
        WebPEncoder::new_lossless(&mut out)
            .encode(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(encode_error)?;
        Ok(Some(out))
    }

    fn optimize(&self, bytes: &[u8], ext: &str) -> ToolResult<Vec<u8>> {
        let optimized = match ext {
            "png" => {
                let mut out = Vec::new();
                decode(bytes)?
                    .write_with_encoder(PngEncoder::new_with_quality(
                        &mut out,
                        CompressionType::Best,
                        FilterType::Adaptive,
                    ))
                    .map_err(encode_error)?;
                out
            }
            "jpg" | "jpeg" => {
                let mut out = Vec::new();
                DynamicImage::ImageRgb8(decode(bytes)?.to_rgb8())
                    .write_with_encoder(JpegEncoder::new_with_quality(
                        &mut out,
                        self.jpeg_quality,
                    ))
                    .map_err(encode_error)?;
                out
            }
            "svg" => optimize_svg(bytes)?,
            _ => return Ok(bytes.to_vec()),
        };

        // Re-encoding an already optimized file can grow it.
        if optimized.len() < bytes.len() {
            Ok(optimized)
        } else {
            Ok(bytes.to_vec())
        }
    }
}

/// Elements whose whitespace-only text is rendered.
const TEXT_ELEMENTS: &[&[u8]] = &[b"text", b"tspan", b"textPath", b"style", b"title", b"desc"];

/// Lossless SVG minification: drops comments and the whitespace between
/// tags. Elements, attributes and text content are written back as read.
fn optimize_svg(bytes: &[u8]) -> ToolResult<Vec<u8>> {
    let mut reader = Reader::from_reader(bytes);
    let mut writer = Writer::new(Vec::with_capacity(bytes.len()));
    let mut in_text = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ToolError(format!("cannot parse svg: {e}")))?;
        match &event {
            Event::Eof => break,
            Event::Comment(_) => continue,
            Event::Text(text) if in_text == 0 && text.iter().all(u8::is_ascii_whitespace) => {
                continue;
            }
            Event::Start(start) if TEXT_ELEMENTS.contains(&start.local_name().as_ref()) => {
                in_text += 1;
            }
            Event::End(end) if TEXT_ELEMENTS.contains(&end.local_name().as_ref()) => {
                in_text = in_text.saturating_sub(1);
            }
            _ => {}
        }
        writer
            .write_event(event)
            .map_err(|e| ToolError(format!("cannot write svg: {e}")))?;
    }

    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encoder() -> NativeImageEncoder {
        NativeImageEncoder::new(&ImageConfig::default())
    }

    fn sample(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, format)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_png_to_webp() {
        let webp = encoder().to_webp(&sample(ImageFormat::Png), "png").unwrap().unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");

        let decoded = image::load_from_memory(&webp).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn test_jpeg_to_webp() {
        let webp = encoder().to_webp(&sample(ImageFormat::Jpeg), "jpg").unwrap();
        assert!(webp.is_some());
    }

    #[test]
    fn test_other_formats_are_not_converted() {
        assert!(encoder().to_webp(b"GIF89a", "gif").unwrap().is_none());
        assert!(encoder().to_webp(b"<svg/>", "svg").unwrap().is_none());
    }

    #[test]
    fn test_optimize_never_grows() {
        for (format, ext) in [(ImageFormat::Png, "png"), (ImageFormat::Jpeg, "jpg")] {
            let original = sample(format);
            let optimized = encoder().optimize(&original, ext).unwrap();
            assert!(optimized.len() <= original.len(), "{ext}");
            assert!(image::load_from_memory(&optimized).is_ok());
        }
    }

    #[test]
    fn test_optimize_passthrough() {
        let ico = vec![0u8, 0, 1, 0, 1, 0];
        assert_eq!(encoder().optimize(&ico, "ico").unwrap(), ico);
    }

    #[test]
    fn test_optimize_svg() {
        let svg = br##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10">
    <!-- square -->
    <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
</svg>
"##;
        let out = String::from_utf8(encoder().optimize(svg, "svg").unwrap()).unwrap();
        assert!(out.len() < svg.len());
        assert!(!out.contains("square"));
        assert!(out.contains(r##"<rect x="0" y="0" width="10" height="10" fill="#ff0000"/>"##));
        assert!(out.contains(r#"viewBox="0 0 10 10""#));
    }

    #[test]
    fn test_optimize_svg_keeps_text_and_view_box() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="50" viewBox="0 0 200 50">
  <!-- label -->
  <text x="10" y="30" font-size="20">Hello <tspan>big</tspan> world</text>
  <rect id="keep" x="0" y="0" width="5" height="5"/>
</svg>"#;
        let out = String::from_utf8(encoder().optimize(svg, "svg").unwrap()).unwrap();
        assert!(out.contains(r#"viewBox="0 0 200 50""#), "{out}");
        assert!(out.contains("Hello <tspan>big</tspan> world"), "{out}");
        assert!(out.contains(r#"<rect id="keep""#), "{out}");
        assert!(!out.contains("label"));
    }

    #[test]
    fn test_malformed_svg_is_an_error() {
        assert!(encoder().optimize(b"<svg><g></svg>", "svg").is_err());
    }

    #[test]
    fn test_corrupt_image_is_an_error() {
        assert!(encoder().optimize(b"not a png", "png").is_err());
        assert!(encoder().to_webp(b"not a jpeg", "jpg").is_err());
    }
}
