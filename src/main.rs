//! assetpipe - front-end asset builder with a live-reload dev server.

mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod toolchain;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{ColorChoice, Parser};

use cli::{Cli, Commands};
use config::ProjectConfig;
use pipeline::{BuildReport, TaskContext, fonts_style};
use toolchain::Toolchain;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let command = cli.command.unwrap_or_default();

    let config = ProjectConfig::load(&std::env::current_dir()?)?;
    let tools = Toolchain::native(&config)?;
    let ctx = TaskContext::new(Arc::new(config), Arc::new(tools));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match command {
        Commands::Watch => runtime.block_on(cli::watch::run(ctx)),
        Commands::Build => finish(runtime.block_on(pipeline::build(&ctx))),
        Commands::Clean => Ok(pipeline::clean(&ctx.config)?),
        Commands::FontStyleGenerate => {
            if let fonts_style::FontsStyle::Written { path, families } =
                fonts_style::generate(&ctx.config)?
            {
                crate::log!("fonts"; "{} include(s) written to {}", families, path.display());
            }
            Ok(())
        }
        other => match other.task() {
            Some(task) => finish(runtime.block_on(pipeline::run_task(&ctx, task))),
            None => bail!("no task for `{other:?}`"),
        },
    }
}

/// Log the report; any failed task fails the process.
fn finish(report: BuildReport) -> Result<()> {
    report.log();
    if report.is_success() {
        Ok(())
    } else {
        bail!("build failed")
    }
}
