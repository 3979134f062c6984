//! Transform tasks.
//!
//! Every task reads its matched sources, runs each file's chain fully in
//! memory and writes the results below the task's output directory. The
//! first failing file aborts the task; files already written stay.

mod css;
mod fonts;
mod html;
mod images;
mod js;
mod sprite;
mod vendor;

use super::{StreamItem, TaskContext, TaskResult, TaskSummary};
use crate::core::Task;
use crate::reload::Change;

/// Run one task to completion.
pub fn run(ctx: &TaskContext, task: Task) -> TaskResult<TaskSummary> {
    let summary = match task {
        Task::VendorJs => vendor::run(ctx, Task::VendorJs, &ctx.config.vendor.js)?,
        Task::VendorCss => vendor::run(ctx, Task::VendorCss, &ctx.config.vendor.css)?,
        Task::Js => js::run(ctx)?,
        Task::Css => css::run(ctx)?,
        Task::Html => html::run(ctx)?,
        Task::Images => images::run(ctx)?,
        Task::Fonts => fonts::run(ctx)?,
        Task::SvgSprite => sprite::run(ctx)?,
    };

    crate::debug!(task.name(); "wrote {} file(s)", summary.written.len());
    Ok(summary)
}

/// Matched sources of a glob-driven task; empty when nothing matches.
fn read_sources(ctx: &TaskContext, task: Task) -> TaskResult<Vec<StreamItem>> {
    match ctx.config.sources(task)? {
        Some(set) => StreamItem::read_all(&set),
        None => Ok(Vec::new()),
    }
}

/// One page reload for everything a task wrote.
fn notify_reload(ctx: &TaskContext, summary: &TaskSummary) {
    if let Some(first) = summary.written.first() {
        ctx.notify(Change::Reload {
            path: ctx.config.url_of(first),
        });
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::config::ProjectConfig;
    use crate::pipeline::TaskContext;
    use crate::reload::testing::Recorder;
    use crate::toolchain::Toolchain;

    /// A project in a temp dir with default paths.
    pub struct Project {
        pub dir: TempDir,
        pub ctx: TaskContext,
        pub recorder: Arc<Recorder>,
    }

    impl Project {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let mut config = ProjectConfig::default_for(dir.path());
            config.project = "dist".into();
            let tools = Toolchain::native(&config).unwrap();
            let recorder = Arc::new(Recorder::default());
            let ctx = TaskContext::new(Arc::new(config), Arc::new(tools))
                .with_reload(recorder.clone())
                .quiet();
            Self { dir, ctx, recorder }
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        /// Write a file relative to the project root.
        pub fn file(&self, relative: &str, contents: impl AsRef<[u8]>) {
            let path = self.root().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        pub fn read(&self, relative: &str) -> String {
            fs::read_to_string(self.root().join(relative)).unwrap()
        }

        pub fn exists(&self, relative: &str) -> bool {
            self.root().join(relative).exists()
        }
    }
}
