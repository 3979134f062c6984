//! Build pipeline.
//!
//! ```text
//! clean ─▶ ┌ vendor-js ┐
//!          │ js        │
//!          │ vendor-css│
//!          │ css       │ ─▶ fonts_style
//!          │ html      │
//!          │ images    │
//!          └ fonts     ┘
//! ```
//!
//! - `item` - files read into memory, renamed, written
//! - `tasks` - one function per transform task
//! - `fonts_style` - font include partial
//! - `clean` - build root removal
//! - `orchestrator` - the barrier between the stages

mod clean;
mod error;
pub mod fonts_style;
mod item;
mod orchestrator;
pub mod tasks;


use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ProjectConfig;
use crate::core::Task;
use crate::reload::{Change, NoReload, ReloadSink};
use crate::toolchain::Toolchain;

pub use clean::clean;
pub use error::{TaskError, TaskResult};
pub use item::StreamItem;
pub use orchestrator::{BuildReport, TaskOutcome, build, run_parallel, run_task};

/// Everything a task needs, shared across worker threads.
#[derive(Clone)]
pub struct TaskContext {
    pub config: Arc<ProjectConfig>,
    pub tools: Arc<Toolchain>,
    pub reload: Arc<dyn ReloadSink>,
    /// Suppress the build progress line.
    pub quiet: bool,
}

impl TaskContext {
    pub fn new(config: Arc<ProjectConfig>, tools: Arc<Toolchain>) -> Self {
        Self {
            config,
            tools,
            reload: Arc::new(NoReload),
            quiet: false,
        }
    }

    pub fn with_reload(mut self, reload: Arc<dyn ReloadSink>) -> Self {
        self.reload = reload;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn notify(&self, change: Change) {
        self.reload.notify(change);
    }
}

/// Files written by one successful task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub task: Task,
    pub written: Vec<PathBuf>,
}

impl TaskSummary {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            written: Vec::new(),
        }
    }
}
