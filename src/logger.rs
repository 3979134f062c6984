//! Terminal output: prefixed log lines, build progress, watch status.
//!
//! - `log!` / `debug!` print `[module] message` with a colored prefix
//! - `ProgressLine` keeps a single in-place line of finished build tasks
//! - `WatchStatus` overwrites its previous block on every rebuild
//!
//! ```ignore
//! log!("css"; "wrote {}", path.display());
//!
//! let progress = ProgressLine::new(7);
//! progress.done("css", true);
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Number of in-place lines currently below the log output
static PINNED_LINES: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a message only when --verbose is enabled
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Print one prefixed line.
///
/// A pinned progress line is cleared first and redraws on its next update.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();

    let pinned = PINNED_LINES.load(Ordering::SeqCst);
    if pinned > 0 {
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" | "reload" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "error" | "failed" => prefix.bright_red().bold().to_string(),
        "warning" => prefix.bright_magenta().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch Status
// ============================================================================

/// Current UTC wall-clock time as HH:MM:SS
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

/// Status block for watch mode.
///
/// Every message replaces the block printed before it, so a fixed error
/// disappears on the next successful rebuild.
pub struct WatchStatus {
    /// Lines of previous output to clear
    last_lines: usize,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    pub const fn new() -> Self {
        Self { last_lines: 0 }
    }

    pub fn success(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Error summary with an optional multi-line detail.
    pub fn error(&mut self, summary: &str, detail: &str) {
        self.display(format!("{}", "✗".red()), &Self::compose(summary, detail));
    }

    fn compose(summary: &str, detail: &str) -> String {
        if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        }
    }

    fn display(&mut self, symbol: String, message: &str) {
        let mut stdout = stdout().lock();

        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.last_lines as u16;
            execute!(stdout, cursor::MoveUp(lines)).ok();
            execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        writeln!(stdout, "{timestamp} {symbol} {message}").ok();
        stdout.flush().ok();

        self.last_lines = line_count(message);
    }
}

fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

pub fn status_success(message: &str) {
    WATCH_STATUS.lock().success(message);
}

pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().error(summary, detail);
}

// ============================================================================
// Progress Line
// ============================================================================

/// In-place line of finished build tasks.
///
/// Displays: `[build] 4/7 vendor-js js css html`
pub struct ProgressLine {
    total: usize,
    finished: Mutex<Vec<String>>,
}

impl ProgressLine {
    pub fn new(total: usize) -> Self {
        PINNED_LINES.store(1, Ordering::SeqCst);
        let progress = Self {
            total,
            finished: Mutex::new(Vec::with_capacity(total)),
        };
        progress.draw(false);
        progress
    }

    /// Record a finished task; failures are shown in red.
    pub fn done(&self, name: &str, ok: bool) {
        let label = if ok {
            name.to_string()
        } else {
            name.red().to_string()
        };
        self.finished.lock().push(label);
        self.draw(false);
    }

    fn render(&self) -> String {
        let finished = self.finished.lock();
        format!("{}/{} {}", finished.len(), self.total, finished.join(" "))
    }

    fn draw(&self, newline: bool) {
        let line = self.render();
        let prefix = colorize_prefix("build");

        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if newline {
            writeln!(stdout, "{prefix} {}", line.trim_end()).ok();
        } else {
            write!(stdout, "{prefix} {}", line.trim_end()).ok();
        }
        stdout.flush().ok();
    }

    /// Keep the final line and move below it.
    pub fn finish(self) {
        PINNED_LINES.store(0, Ordering::SeqCst);
        self.draw(true);
        std::mem::forget(self);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        PINNED_LINES.store(0, Ordering::SeqCst);
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        stdout.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_status_starts_empty() {
        assert_eq!(WatchStatus::new().last_lines, 0);
    }

    #[test]
    fn test_status_block_line_count() {
        assert_eq!(line_count("rebuilt: css"), 1);
        let message = WatchStatus::compose(
            "js failed",
            "#src/js/app.js: Unexpected token\n  --> 3:7",
        );
        assert_eq!(line_count(&message), 3);
        assert_eq!(WatchStatus::compose("css", ""), "css");
    }

    #[test]
    fn test_progress_line_counts_finished_tasks() {
        let progress = ProgressLine::new(3);
        progress.done("css", true);
        progress.done("js", true);
        assert!(progress.render().starts_with("2/3 css js"));
        drop(progress);
        assert_eq!(PINNED_LINES.load(Ordering::SeqCst), 0);
    }
}
