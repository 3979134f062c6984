//! Task scheduling.
//!
//! `build` runs clean, then every build task as its own blocking job, waits
//! for all of them, then runs the font style generator. Tasks never see each
//! other's results; a failure or panic in one is recorded and the others
//! still finish.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use super::fonts_style::{self, FontsStyle};
use super::{TaskContext, TaskError, TaskResult, TaskSummary, clean, tasks};
use crate::core::Task;
use crate::logger::ProgressLine;

/// Result of one task run.
#[derive(Debug)]
pub struct TaskOutcome {
    pub task: Task,
    pub result: TaskResult<TaskSummary>,
    pub elapsed: Duration,
}

impl TaskOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything a build or single-task run produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Set when cleaning failed; nothing else ran.
    pub clean_error: Option<TaskError>,
    /// In task order.
    pub outcomes: Vec<TaskOutcome>,
    /// `None` when the generator did not run.
    pub fonts_style: Option<TaskResult<FontsStyle>>,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.clean_error.is_none()
            && self.outcomes.iter().all(TaskOutcome::is_ok)
            && !matches!(self.fonts_style, Some(Err(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (Task, &TaskError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.task, e)))
    }

    pub fn outcome(&self, task: Task) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.task == task)
    }

    /// Print failures and a one-line summary.
    pub fn log(&self) {
        if let Some(err) = &self.clean_error {
            crate::log!("error"; "clean: {}", err);
        }
        for (task, err) in self.failures() {
            crate::log!("failed"; "{}: {}", task, err);
        }
        if let Some(Err(err)) = &self.fonts_style {
            crate::log!("failed"; "font-style: {}", err);
        }
        for outcome in &self.outcomes {
            crate::debug!(outcome.task.name(); "{:.2?}", outcome.elapsed);
        }

        let failed = self.failures().count();
        if self.is_success() {
            crate::log!("build"; "done in {:.2?}", self.elapsed);
        } else if failed > 0 {
            crate::log!("build"; "{} of {} task(s) failed", failed, self.outcomes.len());
        }
    }
}

/// Full build: clean, all build tasks, font style partial.
pub async fn build(ctx: &TaskContext) -> BuildReport {
    let start = Instant::now();

    if let Err(e) = clean(&ctx.config) {
        return BuildReport {
            clean_error: Some(e),
            elapsed: start.elapsed(),
            ..BuildReport::default()
        };
    }

    let outcomes = run_parallel(ctx, &Task::BUILD).await;

    // Runs after the barrier whatever the outcomes.
    let fonts_style = Some(fonts_style::generate(&ctx.config));

    BuildReport {
        clean_error: None,
        outcomes,
        fonts_style,
        elapsed: start.elapsed(),
    }
}

/// Run one task on its own.
pub async fn run_task(ctx: &TaskContext, task: Task) -> BuildReport {
    let start = Instant::now();
    let outcomes = run_parallel(ctx, &[task]).await;
    BuildReport {
        outcomes,
        elapsed: start.elapsed(),
        ..BuildReport::default()
    }
}

/// Run `selected` concurrently and wait for all of them.
///
/// Outcomes come back in the order of `selected`.
pub async fn run_parallel(ctx: &TaskContext, selected: &[Task]) -> Vec<TaskOutcome> {
    let progress = (!ctx.quiet).then(|| Arc::new(ProgressLine::new(selected.len())));

    let mut set = JoinSet::new();
    for &task in selected {
        let ctx = ctx.clone();
        let progress = progress.clone();
        set.spawn_blocking(move || {
            let start = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(|| tasks::run(&ctx, task)))
                .unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(&*payload))));
            if let Some(progress) = &progress {
                progress.done(task.name(), result.is_ok());
            }
            TaskOutcome {
                task,
                result,
                elapsed: start.elapsed(),
            }
        });
    }

    let mut outcomes = Vec::with_capacity(selected.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => crate::log!("error"; "task join failed: {}", e),
        }
    }
    outcomes.sort_by_key(|o| selected.iter().position(|t| *t == o.task));

    if let Some(progress) = progress.and_then(|p| Arc::try_unwrap(p).ok()) {
        progress.finish();
    }
    outcomes
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| -> u8 { panic!("boom") }).unwrap_err();
        assert_eq!(panic_message(&*payload), "boom");
        let payload = panic::catch_unwind(|| -> u8 { panic!("{}", 42) }).unwrap_err();
        assert_eq!(panic_message(&*payload), "42");
    }

    #[test]
    fn test_report_success() {
        let mut report = BuildReport::default();
        assert!(report.is_success());

        report.outcomes.push(TaskOutcome {
            task: Task::Js,
            result: Err(TaskError::Panicked("boom".into())),
            elapsed: Duration::ZERO,
        });
        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 1);
        assert!(report.outcome(Task::Js).is_some());
        assert!(report.outcome(Task::Css).is_none());
    }
}
