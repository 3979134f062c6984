//! Watch mode: rebuild what changed.
//!
//! ```text
//! notify ─▶ Debouncer (100 ms) ─▶ classify ─▶ run_parallel(tasks)
//!                                               │
//!                                               ▼
//!                                     WatchStatus / ReloadSink
//! ```
//!
//! The watcher subscribes before the initial build, so edits made while
//! that build runs are picked up afterwards.

mod debouncer;

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use rustc_hash::FxHashSet;

use crate::config::{ConfigError, ProjectConfig};
use crate::core::Task;
use crate::logger::{status_error, status_success};
use crate::pipeline::{TaskContext, TaskOutcome, run_parallel};
use crate::reload::Change;
use crate::utils::glob::GlobMatcher;
use crate::utils::path::{normalize_path, to_slash};

use debouncer::Debouncer;

/// Maps changed files to the tasks that consume them.
pub struct Classifier {
    roots: Vec<PathBuf>,
    matchers: Vec<(Task, GlobMatcher)>,
}

impl Classifier {
    pub fn new(config: &ProjectConfig) -> Result<Self, ConfigError> {
        let mut matchers = Vec::with_capacity(Task::WATCHED.len());
        for task in Task::WATCHED {
            if let Some(matcher) = config.watch_matcher(task)? {
                matchers.push((task, matcher));
            }
        }

        // notify may report canonical paths (e.g. resolved symlinks)
        let mut roots = vec![config.get_root().to_path_buf()];
        let canonical = normalize_path(config.get_root());
        if canonical != roots[0] {
            roots.push(canonical);
        }

        Ok(Self { roots, matchers })
    }

    /// Tasks to re-run for `paths`, in task order.
    pub fn classify<'a>(&self, paths: impl IntoIterator<Item = &'a PathBuf>) -> Vec<Task> {
        let mut tasks = FxHashSet::default();
        for path in paths {
            let Some(relative) = self.relative(path) else {
                continue;
            };
            for (task, matcher) in &self.matchers {
                if matcher.matches(&relative) {
                    tasks.insert(*task);
                }
            }
        }

        let mut tasks: Vec<_> = tasks.into_iter().collect();
        tasks.sort();
        tasks
    }

    fn relative(&self, path: &Path) -> Option<String> {
        self.roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
            .map(to_slash)
    }
}

/// Recursive subscription on the source root.
pub struct SourceWatcher {
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Dropping the watcher ends the subscription.
    _watcher: RecommendedWatcher,
    classifier: Classifier,
}

impl SourceWatcher {
    /// Start watching immediately; events buffer until `run`.
    pub fn new(config: &ProjectConfig) -> anyhow::Result<Self> {
        let classifier = Classifier::new(config)?;
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let source = config.source_dir();
        std::fs::create_dir_all(&source)?;
        watcher.watch(&source, RecursiveMode::Recursive)?;
        crate::log!("watch"; "watching {}", source.display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            classifier,
        })
    }

    /// Rebuild on changes until `shutdown` fires or its sender is dropped.
    pub async fn run(self, ctx: TaskContext, shutdown: crossbeam::channel::Receiver<()>) {
        let Self {
            notify_rx,
            _watcher,
            classifier,
        } = self;
        let mut debouncer = Debouncer::new();

        let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if event_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();
        std::thread::spawn(move || {
            let _ = shutdown.recv();
            let _ = stop_tx.send(());
        });

        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                Some(event) = event_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(paths) = debouncer.take_if_ready() else {
                        continue;
                    };
                    let tasks = classifier.classify(&paths);
                    if tasks.is_empty() {
                        continue;
                    }
                    crate::debug!("watch"; "{} change(s) -> {:?}", paths.len(), tasks);
                    let outcomes = run_parallel(&ctx, &tasks).await;
                    report(&ctx, &outcomes);
                }
            }
        }

        crate::log!("watch"; "stopped");
    }
}

/// Status line for one rebuild; failures also go to the browser.
fn report(ctx: &TaskContext, outcomes: &[TaskOutcome]) {
    let names = outcomes
        .iter()
        .map(|o| o.task.name())
        .collect::<Vec<_>>()
        .join(", ");

    let failures: Vec<_> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().err().map(|e| (o.task, e)))
        .collect();

    if failures.is_empty() {
        status_success(&format!("rebuilt {names}"));
        return;
    }

    let detail = failures
        .iter()
        .map(|(task, err)| format!("{task}: {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    status_error(&format!("{} failed", failures.len()), &detail);

    for (task, err) in failures {
        ctx.notify(Change::Failed {
            task: task.name().to_string(),
            message: err.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn classifier(root: &Path) -> Classifier {
        Classifier::new(&ProjectConfig::default_for(root)).unwrap()
    }

    #[test]
    fn test_classify_by_watch_pattern() {
        let dir = TempDir::new().unwrap();
        let c = classifier(dir.path());
        let at = |p: &str| dir.path().join(p);

        assert_eq!(c.classify(&[at("#src/scss/base/_grid.scss")]), [Task::Css]);
        assert_eq!(c.classify(&[at("#src/_footer.html")]), [Task::Html]);
        assert_eq!(c.classify(&[at("#src/js/app.js")]), [Task::Js]);
        assert_eq!(c.classify(&[at("#src/img/a/b.png")]), [Task::Images]);
        assert!(c.classify(&[at("#src/fonts/Roboto.ttf")]).is_empty());
        assert!(c.classify(&[PathBuf::from("/elsewhere/#src/index.html")]).is_empty());
    }

    #[test]
    fn test_classify_dedups_and_orders() {
        let dir = TempDir::new().unwrap();
        let c = classifier(dir.path());
        let paths = [
            dir.path().join("#src/index.html"),
            dir.path().join("#src/js/app.js"),
            dir.path().join("#src/about.html"),
        ];

        assert_eq!(c.classify(&paths), [Task::Js, Task::Html]);
    }

    #[tokio::test]
    async fn test_rebuilds_on_change_and_stops() {
        use crate::pipeline::tasks::fixture::Project;
        use std::time::Duration;

        let p = Project::new();
        p.file("#src/js/app.js", "console.log(1);");
        let watcher = SourceWatcher::new(&p.ctx.config).unwrap();
        let (stop_tx, stop_rx) = crossbeam::channel::bounded(1);
        let handle = tokio::spawn(watcher.run(p.ctx.clone(), stop_rx));

        tokio::time::sleep(Duration::from_millis(200)).await;
        p.file("#src/js/app.js", "console.log(2);");

        let min = p.root().join("dist/js/app.min.js");
        for _ in 0..100 {
            if min.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(min.exists());

        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
