//! Icon sprite: every SVG in the sprite folder stacked into one file.

use super::read_sources;
use crate::core::Task;
use crate::pipeline::{TaskContext, TaskError, TaskResult, TaskSummary};
use crate::utils::fs::write_file;

pub fn run(ctx: &TaskContext) -> TaskResult<TaskSummary> {
    let mut summary = TaskSummary::new(Task::SvgSprite);
    let items = read_sources(ctx, Task::SvgSprite)?;
    if items.is_empty() {
        return Ok(summary);
    }

    let icons: Vec<_> = items
        .iter()
        .map(|item| (item.stem(), item.contents.clone()))
        .collect();
    let output = ctx.config.build_root().join(&ctx.config.build.sprite);
    let sprite = ctx
        .tools
        .sprite
        .stack(&icons)
        .map_err(|e| TaskError::source(&ctx.config.source_dir(), e))?;

    write_file(&output, sprite).map_err(TaskError::io(&output))?;
    summary.written.push(output);
    Ok(summary)
}
