//! `[src]` and `[watch]` sections: glob patterns relative to the source root.
//!
//! ```toml
//! [src.html]
//! include = ["*.html"]
//! exclude = ["_*.html"]      # partials are only pulled in through @@include
//!
//! [watch]
//! css = "scss/**/*.scss"
//! ```

use serde::{Deserialize, Serialize};

/// Ordered include patterns plus exclusions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternList {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl PatternList {
    fn of(include: &[&str]) -> Self {
        Self {
            include: include.iter().map(|s| (*s).to_string()).collect(),
            exclude: Vec::new(),
        }
    }

    fn excluding(mut self, exclude: &[&str]) -> Self {
        self.exclude = exclude.iter().map(|s| (*s).to_string()).collect();
        self
    }
}

/// Source globs per asset category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    pub html: PatternList,
    pub css: PatternList,
    pub js: PatternList,
    pub img: PatternList,
    pub fonts: PatternList,
    pub sprite: PatternList,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            html: PatternList::of(&["*.html"]).excluding(&["_*.html"]),
            css: PatternList::of(&["scss/style.scss"]),
            js: PatternList::of(&["js/**/*.js"]),
            img: PatternList::of(&["img/**/*.{jpg,svg,png,ico,webp,gif}"]),
            fonts: PatternList::of(&["fonts/*.ttf"]),
            sprite: PatternList::of(&["iconsprite/*.svg"]),
        }
    }
}

/// Watch globs for the live-rebuild categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchPaths {
    pub html: String,
    pub css: String,
    pub js: String,
    pub img: String,
}

impl Default for WatchPaths {
    fn default() -> Self {
        Self {
            html: "**/*.html".into(),
            css: "scss/**/*.scss".into(),
            js: "js/**/*.js".into(),
            img: "img/**/*.{jpg,svg,png,ico,webp,gif}".into(),
        }
    }
}
