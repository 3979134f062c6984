//! `[css]` and `[images]` sections: options handed to the wrapped tools.

use serde::{Deserialize, Serialize};

/// Stylesheet post-processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
    /// Class set on `<html>` when the browser supports WebP.
    pub webp_class: String,
    /// Class set on `<html>` when it does not.
    pub no_webp_class: String,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            browsers: vec!["last 5 versions".into()],
            webp_class: ".webp".into(),
            no_webp_class: ".no-webp".into(),
        }
    }
}

/// Image conversion and optimization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// JPEG re-encode quality (1-100) used by the optimizer.
    pub jpeg_quality: u8,
    /// Extensions that get a `.webp` sibling.
    pub webp_from: Vec<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            webp_from: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}
