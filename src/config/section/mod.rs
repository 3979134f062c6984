//! Configuration sections of `assetpipe.toml`.

mod build;
mod serve;
mod source;
mod tools;
mod vendor;

pub use build::BuildPaths;
pub use serve::ServeConfig;
pub use source::{PatternList, SourcePaths, WatchPaths};
pub use tools::{CssConfig, ImageConfig};
pub use vendor::{VendorBundle, VendorConfig};
