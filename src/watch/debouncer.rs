use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashSet;

pub(super) const DEBOUNCE_MS: u64 = 100;

/// Coalesces bursts of events into one set of changed paths.
///
/// Ready once no new event arrived for `DEBOUNCE_MS`.
pub(super) struct Debouncer {
    pub(super) changes: FxHashSet<PathBuf>,
    pub(super) last_event: Option<Instant>,
    window: Duration,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self::with_window(Duration::from_millis(DEBOUNCE_MS))
    }

    pub(super) fn with_window(window: Duration) -> Self {
        Self {
            changes: FxHashSet::default(),
            last_event: None,
            window,
        }
    }

    pub(super) fn add_event(&mut self, event: &notify::Event) {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // mtime/chmod noise, e.g. from our own reads
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            self.changes.insert(path.clone());
            self.last_event = Some(Instant::now());
        }
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.window && !self.changes.is_empty())
    }

    /// Take the collected paths once the window has passed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashSet<PathBuf>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        Some(std::mem::take(&mut self.changes))
    }

    /// Time until the window closes; a day when idle.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last) = self.last_event else {
            return Duration::from_secs(86400);
        };
        self.window
            .saturating_sub(last.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Editor backups, swap files and our own atomic-write temp files.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind};

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    fn modify(path: &str) -> notify::Event {
        event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), path)
    }

    #[test]
    fn test_coalesces_per_path() {
        let mut debouncer = Debouncer::with_window(Duration::ZERO);
        debouncer.add_event(&modify("/p/#src/scss/style.scss"));
        debouncer.add_event(&modify("/p/#src/scss/style.scss"));
        debouncer.add_event(&event(EventKind::Create(CreateKind::File), "/p/#src/js/app.js"));

        let changes = debouncer.take_if_ready().unwrap();
        assert_eq!(changes.len(), 2);
        assert!(debouncer.take_if_ready().is_none());
        assert!(debouncer.last_event.is_none());
    }

    #[test]
    fn test_waits_for_quiet_window() {
        let mut debouncer = Debouncer::with_window(Duration::from_secs(60));
        debouncer.add_event(&modify("/p/#src/index.html"));

        assert!(!debouncer.is_ready());
        assert!(debouncer.take_if_ready().is_none());
        assert!(debouncer.sleep_duration() > Duration::from_secs(1));
    }

    #[test]
    fn test_ignores_metadata_and_temp_files() {
        let mut debouncer = Debouncer::with_window(Duration::ZERO);
        debouncer.add_event(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            "/p/#src/index.html",
        ));
        debouncer.add_event(&modify("/p/#src/js/.libs.js.42.tmp"));
        debouncer.add_event(&modify("/p/#src/index.html~"));
        debouncer.add_event(&modify("/p/#src/.index.html.swp"));

        assert!(debouncer.changes.is_empty());
        assert!(debouncer.take_if_ready().is_none());
        assert_eq!(debouncer.sleep_duration(), Duration::from_secs(86400));
    }
}
