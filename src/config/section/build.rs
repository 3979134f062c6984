//! `[build]` section: output directories below the build root.
//!
//! ```toml
//! [build]
//! html = ""          # pages land directly in the build root
//! css = "css"
//! js = "js"
//! img = "img"
//! fonts = "fonts"
//! sprite = "img/icons/icons.svg"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output directories, relative to the build root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildPaths {
    pub html: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
    pub img: PathBuf,
    pub fonts: PathBuf,
    /// Stack sprite file produced by the `svg-sprite` task.
    pub sprite: PathBuf,
}

impl Default for BuildPaths {
    fn default() -> Self {
        Self {
            html: PathBuf::new(),
            css: "css".into(),
            js: "js".into(),
            img: "img".into(),
            fonts: "fonts".into(),
            sprite: "img/icons/icons.svg".into(),
        }
    }
}

impl BuildPaths {
    pub(crate) fn all(&self) -> [(&'static str, &PathBuf); 6] {
        [
            ("build.html", &self.html),
            ("build.css", &self.css),
            ("build.js", &self.js),
            ("build.img", &self.img),
            ("build.fonts", &self.fonts),
            ("build.sprite", &self.sprite),
        ]
    }
}
