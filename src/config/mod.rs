//! Project configuration: the path table and tool options.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build] [src] [watch] [vendor] [serve] [css] [images]
//! ├── error          # ConfigError
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! The configuration is built once at startup from built-in defaults,
//! optionally overridden by `assetpipe.toml` in the project root, validated,
//! and then shared read-only as `Arc<ProjectConfig>`.
//!
//! | Key        | Purpose                                            |
//! |------------|----------------------------------------------------|
//! | `project`  | Build root (default: name of the project dir)      |
//! | `source`   | Source root (default: `#src`)                      |
//! | `fonts_partial` | Font include partial, relative to `source`    |
//! | `[build]`  | Output directories below the build root            |
//! | `[src]`    | Source globs per category, relative to `source`    |
//! | `[watch]`  | Watch globs per category, relative to `source`     |
//! | `[vendor]` | Third-party bundles written into the source tree   |
//! | `[serve]`  | Dev server and live-reload ports                   |
//! | `[css]`    | Prefix targets and WebP classes                    |
//! | `[images]` | JPEG quality and WebP conversion inputs            |

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{
    BuildPaths, CssConfig, ImageConfig, PatternList, ServeConfig, SourcePaths, VendorBundle,
    VendorConfig, WatchPaths,
};

use crate::core::Task;
use crate::log;
use crate::utils::glob::{GlobMatcher, SourceSet};
use crate::utils::path::{is_contained, to_slash};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Optional override file, looked up in the project root.
pub const CONFIG_FILE: &str = "assetpipe.toml";

/// Immutable path table plus tool options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build root, relative to the project root
    pub project: PathBuf,

    /// Source root, relative to the project root
    pub source: PathBuf,

    /// Font include partial, relative to the source root
    pub fonts_partial: PathBuf,

    pub build: BuildPaths,
    pub src: SourcePaths,
    pub watch: WatchPaths,
    pub vendor: VendorConfig,
    pub serve: ServeConfig,
    pub css: CssConfig,
    pub images: ImageConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            project: PathBuf::new(),
            source: "#src".into(),
            fonts_partial: "scss/fonts.scss".into(),
            build: BuildPaths::default(),
            src: SourcePaths::default(),
            watch: WatchPaths::default(),
            vendor: VendorConfig::default(),
            serve: ServeConfig::default(),
            css: CssConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration for the project at `root`.
    ///
    /// Reads `assetpipe.toml` when present; unknown keys are reported and
    /// ignored.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        let mut config = if path.is_file() {
            Self::from_path(&path)?
        } else {
            Self::default()
        };
        config.finalize(root);
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults for `root`, without reading any file.
    pub fn default_for(root: &Path) -> Self {
        let mut config = Self::default();
        config.finalize(root);
        config
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}: {}", CONFIG_FILE, ignored.join(", "));
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Resolve the root and the default build root name.
    fn finalize(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        if self.project.as_os_str().is_empty() {
            self.project = root
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("dist"));
        }
    }

    /// Check paths, ports and patterns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, path) in [
            ("project", &self.project),
            ("source", &self.source),
            ("fonts_partial", &self.fonts_partial),
            ("vendor.css.output", &self.vendor.css.output),
            ("vendor.js.output", &self.vendor.js.output),
        ] {
            if path.as_os_str().is_empty() || !is_contained(path) {
                return Err(ConfigError::Validation(format!(
                    "`{field}` must be a non-empty relative path inside the project, got `{}`",
                    path.display()
                )));
            }
        }

        for (field, path) in self.build.all() {
            if !is_contained(path) {
                return Err(ConfigError::Validation(format!(
                    "`{field}` must stay inside the build root, got `{}`",
                    path.display()
                )));
            }
        }

        if self.project.starts_with(&self.source) || self.source.starts_with(&self.project) {
            return Err(ConfigError::Validation(format!(
                "build root `{}` and source root `{}` must not contain each other",
                self.project.display(),
                self.source.display()
            )));
        }

        if self.serve.port == 0 || self.serve.reload_port == 0 {
            return Err(ConfigError::Validation("ports must be non-zero".into()));
        }

        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(ConfigError::Validation(format!(
                "`images.jpeg_quality` must be within 1..=100, got {}",
                self.images.jpeg_quality
            )));
        }

        for task in Task::ALL {
            if let Some(list) = self.patterns(task) {
                self.source_set(list)?;
            }
        }
        for task in Task::WATCHED {
            self.watch_matcher(task)?;
        }

        Ok(())
    }

    // ------------------------------------------------------------------------
    // Resolved paths
    // ------------------------------------------------------------------------

    /// Get the project root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Absolute source root.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.source)
    }

    /// Absolute build output root.
    pub fn build_root(&self) -> PathBuf {
        self.root.join(&self.project)
    }

    /// Absolute font include partial.
    pub fn fonts_partial_path(&self) -> PathBuf {
        self.source_dir().join(&self.fonts_partial)
    }

    /// Absolute output directory of a build task.
    ///
    /// Vendor bundles land in the source tree, next to their output file.
    pub fn output_dir(&self, task: Task) -> PathBuf {
        let build = self.build_root();
        match task {
            Task::Html => build.join(&self.build.html),
            Task::Css => build.join(&self.build.css),
            Task::Js => build.join(&self.build.js),
            Task::Images => build.join(&self.build.img),
            Task::Fonts => build.join(&self.build.fonts),
            Task::SvgSprite => build
                .join(&self.build.sprite)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or(build),
            Task::VendorCss => self.vendor_output(&self.vendor.css),
            Task::VendorJs => self.vendor_output(&self.vendor.js),
        }
    }

    /// Absolute output file of a vendor bundle.
    pub fn vendor_file(&self, bundle: &VendorBundle) -> PathBuf {
        self.source_dir().join(&bundle.output)
    }

    fn vendor_output(&self, bundle: &VendorBundle) -> PathBuf {
        self.vendor_file(bundle)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.source_dir())
    }

    /// Site URL of a file below the build root (`/css/style.css`).
    pub fn url_of(&self, path: &Path) -> String {
        let relative = path.strip_prefix(self.build_root()).unwrap_or(path);
        format!("/{}", to_slash(relative))
    }

    // ------------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------------

    fn patterns(&self, task: Task) -> Option<&PatternList> {
        match task {
            Task::Html => Some(&self.src.html),
            Task::Css => Some(&self.src.css),
            Task::Js => Some(&self.src.js),
            Task::Images => Some(&self.src.img),
            Task::Fonts => Some(&self.src.fonts),
            Task::SvgSprite => Some(&self.src.sprite),
            Task::VendorCss | Task::VendorJs => None,
        }
    }

    /// Prefix a source-relative pattern with the source root.
    fn in_source(&self, pattern: &str) -> String {
        let source = to_slash(&self.source);
        if source.is_empty() {
            pattern.to_string()
        } else {
            format!("{source}/{pattern}")
        }
    }

    fn source_set(&self, list: &PatternList) -> Result<SourceSet, ConfigError> {
        let include: Vec<_> = list.include.iter().map(|p| self.in_source(p)).collect();
        let exclude: Vec<_> = list.exclude.iter().map(|p| self.in_source(p)).collect();
        SourceSet::new(&self.root, &include, &exclude).map_err(|source| ConfigError::Pattern {
            pattern: include.join(", "),
            source,
        })
    }

    /// Source files matched for a glob-driven task.
    ///
    /// Vendor tasks read an explicit file list and have no source set.
    pub fn sources(&self, task: Task) -> Result<Option<SourceSet>, ConfigError> {
        self.patterns(task)
            .map(|list| self.source_set(list))
            .transpose()
    }

    /// Compiled watch globs for a watched task.
    pub fn watch_matcher(&self, task: Task) -> Result<Option<GlobMatcher>, ConfigError> {
        let pattern = match task {
            Task::Html => &self.watch.html,
            Task::Css => &self.watch.css,
            Task::Js => &self.watch.js,
            Task::Images => &self.watch.img,
            _ => return Ok(None),
        };
        let pattern = self.in_source(pattern);
        GlobMatcher::new(&[pattern.as_str()])
            .map(Some)
            .map_err(|source| ConfigError::Pattern { pattern, source })
    }
}
