//! Wrapped third-party tools behind narrow interfaces.
//!
//! Every transform step a task performs goes through one of these traits,
//! so tasks stay independent of the library doing the work.
//!
//! | Trait             | Native implementation       |
//! |-------------------|-----------------------------|
//! | `StyleCompiler`   | grass                       |
//! | `StyleProcessor`  | lightningcss                |
//! | `ScriptMinifier`  | oxc                         |
//! | `Includer`        | `@@include` expander        |
//! | `MarkupRewriter`  | `<picture>` wrapper         |
//! | `ImageEncoder`    | image + quick-xml           |
//! | `FontConverter`   | ttf-parser + flate2/brotli  |
//! | `SpriteBuilder`   | quick-xml                   |

mod css;
pub(crate) mod font;
mod include;
mod markup;
mod raster;
mod sass;
mod script;
mod sprite;
mod webp_css;

use std::path::Path;

use thiserror::Error;

use crate::config::ProjectConfig;

pub use css::LightningProcessor;
pub use font::NativeFontConverter;
pub use include::FileIncluder;
pub use markup::PictureRewriter;
pub use raster::NativeImageEncoder;
pub use sass::GrassCompiler;
pub use script::OxcMinifier;
pub use sprite::StackSprite;

/// Failure reported by a wrapped tool, as the tool phrased it.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ToolError(pub String);

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// SCSS to expanded CSS.
pub trait StyleCompiler: Send + Sync {
    fn compile(&self, path: &Path) -> ToolResult<String>;
}

/// CSS post-processing steps, applied in this order by the css task.
pub trait StyleProcessor: Send + Sync {
    /// Merge media queries with the same condition and move them to the end.
    fn group_media(&self, css: &str) -> ToolResult<String>;
    /// Add vendor prefixes for the configured browsers. Implementations may
    /// also normalize rules, but must leave the output unminified.
    fn prefix(&self, css: &str) -> ToolResult<String>;
    /// Add `.webp` / `.no-webp` variants of raster background rules.
    fn inject_webp(&self, css: &str) -> ToolResult<String>;
    fn minify(&self, css: &str) -> ToolResult<String>;
}

pub trait ScriptMinifier: Send + Sync {
    fn minify(&self, source: &str) -> ToolResult<String>;
}

/// Inline `@@include` directives relative to `file`.
pub trait Includer: Send + Sync {
    fn expand(&self, text: &str, file: &Path) -> ToolResult<String>;
}

pub trait MarkupRewriter: Send + Sync {
    /// Wrap raster `<img>` tags in `<picture>` with a WebP source.
    fn inject_webp(&self, html: &str) -> String;
}

/// Image conversion keyed by lowercase file extension.
pub trait ImageEncoder: Send + Sync {
    /// WebP rendition, or `None` when the format is not converted.
    fn to_webp(&self, bytes: &[u8], ext: &str) -> ToolResult<Option<Vec<u8>>>;
    /// Optimized bytes; formats without an optimizer pass through.
    fn optimize(&self, bytes: &[u8], ext: &str) -> ToolResult<Vec<u8>>;
}

/// TrueType to web font containers.
pub trait FontConverter: Send + Sync {
    fn to_woff(&self, ttf: &[u8]) -> ToolResult<Vec<u8>>;
    fn to_woff2(&self, ttf: &[u8]) -> ToolResult<Vec<u8>>;
}

pub trait SpriteBuilder: Send + Sync {
    /// Stack named SVG icons into one `:target`-addressable sprite.
    fn stack(&self, icons: &[(String, Vec<u8>)]) -> ToolResult<String>;
}

/// The set of tools handed to every task.
pub struct Toolchain {
    pub sass: Box<dyn StyleCompiler>,
    pub css: Box<dyn StyleProcessor>,
    pub script: Box<dyn ScriptMinifier>,
    pub include: Box<dyn Includer>,
    pub markup: Box<dyn MarkupRewriter>,
    pub image: Box<dyn ImageEncoder>,
    pub font: Box<dyn FontConverter>,
    pub sprite: Box<dyn SpriteBuilder>,
}

impl Toolchain {
    /// Library-backed implementations configured from the project.
    pub fn native(config: &ProjectConfig) -> ToolResult<Self> {
        Ok(Self {
            sass: Box::new(GrassCompiler),
            css: Box::new(LightningProcessor::new(&config.css)?),
            script: Box::new(OxcMinifier),
            include: Box::new(FileIncluder::default()),
            markup: Box::new(PictureRewriter),
            image: Box::new(NativeImageEncoder::new(&config.images)),
            font: Box::new(NativeFontConverter),
            sprite: Box::new(StackSprite),
        })
    }
}
