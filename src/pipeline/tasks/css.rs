//! Stylesheets: compile, group media queries, prefix, WebP classes,
//! then a minified twin.

use crate::core::Task;
use crate::pipeline::{TaskContext, TaskError, TaskResult, TaskSummary};
use crate::reload::Change;

use super::read_sources;

pub fn run(ctx: &TaskContext) -> TaskResult<TaskSummary> {
    let out = ctx.config.output_dir(Task::Css);
    let css = &ctx.tools.css;
    let mut summary = TaskSummary::new(Task::Css);

    for item in read_sources(ctx, Task::Css)? {
        let path = item.source_path();
        let source_err = |e| TaskError::source(&path, e);

        let compiled = ctx.tools.sass.compile(&path).map_err(source_err)?;
        let grouped = css.group_media(&compiled).map_err(source_err)?;
        let prefixed = css.prefix(&grouped).map_err(source_err)?;
        let full = css.inject_webp(&prefixed).map_err(source_err)?;
        let min = css.minify(&full).map_err(source_err)?;

        let full = item.with_contents(full).renamed("css");
        let min = full.with_contents(min).renamed("min.css");
        for item in [full, min] {
            let written = item.write_to(&out)?;
            ctx.notify(Change::Css {
                path: ctx.config.url_of(&written),
            });
            summary.written.push(written);
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tasks::fixture::Project;

    #[test]
    fn test_full_and_min_written() {
        let p = Project::new();
        p.file("#src/scss/_vars.scss", "$main: #ff0000;");
        p.file(
            "#src/scss/style.scss",
            "@import 'vars';\n.a { color: $main; .b { margin: 0px; } }\n\
             .hero { background: url(../img/hero.jpg); }\n",
        );

        let summary = run(&p.ctx).unwrap();

        assert_eq!(summary.written.len(), 2);
        let full = p.read("dist/css/style.css");
        let min = p.read("dist/css/style.min.css");
        assert!(full.contains(".a .b"));
        assert!(full.contains(".webp .hero"));
        assert!(full.contains("hero.webp"));
        assert!(!p.exists("dist/css/_vars.css"));
        assert!(min.len() <= full.len());

        let changes = p.recorder.0.lock();
        assert_eq!(
            changes.as_slice(),
            [
                Change::Css {
                    path: "/css/style.css".into()
                },
                Change::Css {
                    path: "/css/style.min.css".into()
                },
            ]
        );
    }

    #[test]
    fn test_syntax_error_writes_nothing() {
        let p = Project::new();
        p.file("#src/scss/style.scss", ".a { color: red;");

        let err = run(&p.ctx).unwrap_err();
        assert!(matches!(err, TaskError::Source { .. }));
        assert!(!p.exists("dist/css"));
    }
}
