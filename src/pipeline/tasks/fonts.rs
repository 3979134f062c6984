//! Fonts: each TrueType file as WOFF and WOFF2.

use super::read_sources;
use crate::core::Task;
use crate::pipeline::{TaskContext, TaskError, TaskResult, TaskSummary};

pub fn run(ctx: &TaskContext) -> TaskResult<TaskSummary> {
    let out = ctx.config.output_dir(Task::Fonts);
    let font = &ctx.tools.font;
    let mut summary = TaskSummary::new(Task::Fonts);

    for item in read_sources(ctx, Task::Fonts)? {
        let path = item.source_path();
        let woff = font
            .to_woff(&item.contents)
            .map_err(|e| TaskError::encode(&path, e))?;
        let woff2 = font
            .to_woff2(&item.contents)
            .map_err(|e| TaskError::encode(&path, e))?;

        summary.written.push(item.with_contents(woff).renamed("woff").write_to(&out)?);
        summary.written.push(item.with_contents(woff2).renamed("woff2").write_to(&out)?);
    }

    Ok(summary)
}
