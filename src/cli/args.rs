//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};

use crate::core::Task;

/// Front-end asset builder with a live-reload dev server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Print per-task timings and file details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand; `watch` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands. None takes options: the project is the working
/// directory and `assetpipe.toml` is the only configuration.
#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Commands {
    /// Concatenate vendor scripts into the source tree
    VendorJsBundle,

    /// Concatenate vendor stylesheets into the source tree
    VendorCssBundle,

    /// Fill an empty fonts partial with one include per font family
    FontStyleGenerate,

    /// Convert TrueType fonts to WOFF and WOFF2
    FontsConvert,

    /// Convert rasters to WebP and optimize all images
    ImagesConvert,

    /// Expand includes and minify scripts
    JsBuild,

    /// Compile, prefix and minify stylesheets
    CssBuild,

    /// Expand partials and add WebP sources to pages
    HtmlBuild,

    /// Stack icons into one SVG sprite
    SvgSprite,

    /// Remove the build output
    Clean,

    /// Clean, run every build task, then generate the fonts partial
    #[command(visible_alias = "b")]
    Build,

    /// Build, then rebuild on change and serve with live reload
    #[command(visible_alias = "w")]
    #[default]
    Watch,
}

impl Commands {
    /// The single task a per-task command runs.
    pub fn task(&self) -> Option<Task> {
        match self {
            Self::VendorJsBundle => Some(Task::VendorJs),
            Self::VendorCssBundle => Some(Task::VendorCss),
            Self::FontsConvert => Some(Task::Fonts),
            Self::ImagesConvert => Some(Task::Images),
            Self::JsBuild => Some(Task::Js),
            Self::CssBuild => Some(Task::Css),
            Self::HtmlBuild => Some(Task::Html),
            Self::SvgSprite => Some(Task::SvgSprite),
            Self::FontStyleGenerate | Self::Clean | Self::Build | Self::Watch => None,
        }
    }
}
