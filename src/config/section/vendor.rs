//! `[vendor]` section: third-party files concatenated into the source tree.
//!
//! ```toml
//! [vendor.js]
//! inputs = ["node_modules/jquery/dist/jquery.js"]
//! output = "js/libs.js"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One concatenated bundle.
///
/// `inputs` are relative to the project root, `output` to the source root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorBundle {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    pub css: VendorBundle,
    pub js: VendorBundle,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            css: VendorBundle {
                inputs: vec!["node_modules/animate.css/animate.css".into()],
                output: "scss/libs.scss".into(),
            },
            js: VendorBundle {
                inputs: vec!["node_modules/jquery/dist/jquery.js".into()],
                output: "js/libs.js".into(),
            },
        }
    }
}
