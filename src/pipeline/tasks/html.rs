//! Pages: `@@include` partials, then `<picture>` WebP sources.

use super::{notify_reload, read_sources};
use crate::core::Task;
use crate::pipeline::{TaskContext, TaskError, TaskResult, TaskSummary};

pub fn run(ctx: &TaskContext) -> TaskResult<TaskSummary> {
    let out = ctx.config.output_dir(Task::Html);
    let mut summary = TaskSummary::new(Task::Html);

    for item in read_sources(ctx, Task::Html)? {
        let path = item.source_path();
        let expanded = ctx
            .tools
            .include
            .expand(item.text()?, &path)
            .map_err(|e| TaskError::source(&path, e))?;
        let html = ctx.tools.markup.inject_webp(&expanded);

        summary.written.push(item.with_contents(html).write_to(&out)?);
    }

    notify_reload(ctx, &summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tasks::fixture::Project;
    use crate::reload::Change;

    #[test]
    fn test_partials_inlined_and_excluded() {
        let p = Project::new();
        p.file("#src/_header.html", "<header>@@title</header>");
        p.file(
            "#src/index.html",
            "@@include('_header.html', {\"title\": \"Home\"})\n<img src=\"img/a.jpg\">",
        );

        let summary = run(&p.ctx).unwrap();

        assert_eq!(summary.written.len(), 1);
        assert!(!p.exists("dist/_header.html"));
        let html = p.read("dist/index.html");
        assert!(html.contains("<header>Home</header>"));
        assert!(html.contains("<picture><source srcset=\"img/a.webp\" type=\"image/webp\">"));
        assert_eq!(
            p.recorder.0.lock().as_slice(),
            [Change::Reload {
                path: "/index.html".into()
            }]
        );
    }

    #[test]
    fn test_missing_partial_is_source_error() {
        let p = Project::new();
        p.file("#src/index.html", "@@include('_nope.html')");

        let err = run(&p.ctx).unwrap_err();
        assert!(matches!(err, TaskError::Source { .. }));
        assert!(!p.exists("dist/index.html"));
        assert!(p.recorder.0.lock().is_empty());
    }
}
