//! Images: WebP renditions of rasters, then optimized originals.

use std::path::PathBuf;

use rayon::prelude::*;

use super::{notify_reload, read_sources};
use crate::core::Task;
use crate::pipeline::{StreamItem, TaskContext, TaskError, TaskResult, TaskSummary};

pub fn run(ctx: &TaskContext) -> TaskResult<TaskSummary> {
    let out = ctx.config.output_dir(Task::Images);
    let items = read_sources(ctx, Task::Images)?;

    let written = items
        .par_iter()
        .map(|item| convert(ctx, item, &out))
        .collect::<TaskResult<Vec<_>>>()?;

    let mut summary = TaskSummary::new(Task::Images);
    summary.written = written.into_iter().flatten().collect();

    notify_reload(ctx, &summary);
    Ok(summary)
}

/// Encode both outputs in memory, then write them.
fn convert(ctx: &TaskContext, item: &StreamItem, out: &std::path::Path) -> TaskResult<Vec<PathBuf>> {
    let path = item.source_path();
    let ext = item.extension();
    let encode_err = |e| TaskError::encode(&path, e);

    let image = &ctx.tools.image;
    let webp = image.to_webp(&item.contents, &ext).map_err(encode_err)?;
    let optimized = image.optimize(&item.contents, &ext).map_err(encode_err)?;

    let mut written = Vec::with_capacity(2);
    if let Some(webp) = webp {
        written.push(item.with_contents(webp).renamed("webp").write_to(out)?);
    }
    written.push(item.with_contents(optimized).write_to(out)?);
    Ok(written)
}
