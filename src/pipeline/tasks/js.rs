//! Scripts: `@@include` expansion, then a minified twin.

use super::{notify_reload, read_sources};
use crate::core::Task;
use crate::pipeline::{TaskContext, TaskError, TaskResult, TaskSummary};

pub fn run(ctx: &TaskContext) -> TaskResult<TaskSummary> {
    let out = ctx.config.output_dir(Task::Js);
    let mut summary = TaskSummary::new(Task::Js);

    for item in read_sources(ctx, Task::Js)? {
        let path = item.source_path();
        let expanded = ctx
            .tools
            .include
            .expand(item.text()?, &path)
            .map_err(|e| TaskError::source(&path, e))?;
        let min = ctx
            .tools
            .script
            .minify(&expanded)
            .map_err(|e| TaskError::source(&path, e))?;

        let full = item.with_contents(expanded);
        let min = full.with_contents(min).renamed("min.js");
        summary.written.push(full.write_to(&out)?);
        summary.written.push(min.write_to(&out)?);
    }

    notify_reload(ctx, &summary);
    Ok(summary)
}
