//! Font include partial.
//!
//! Fills an empty `fonts.scss` with one `@include font(...)` line per font
//! family found in the build fonts directory. A partial with any content is
//! treated as hand-maintained and left alone.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{TaskError, TaskResult};
use crate::config::ProjectConfig;
use crate::core::Task;
use crate::utils::fs::write_file;

/// What the generator did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontsStyle {
    /// The partial was empty and now lists these families.
    Written { path: PathBuf, families: usize },
    /// The partial already had content.
    Untouched,
}

pub fn generate(config: &ProjectConfig) -> TaskResult<FontsStyle> {
    let partial = config.fonts_partial_path();

    let current = match fs::read(&partial) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(TaskError::io(&partial)(e)),
    };
    if !current.is_empty() {
        return Ok(FontsStyle::Untouched);
    }

    let names = font_files(config)?;
    let includes = font_includes(&names);
    let families = includes.lines().count();
    write_file(&partial, includes).map_err(TaskError::io(&partial))?;

    crate::debug!("fonts"; "{} include(s) written to {}", families, partial.display());
    Ok(FontsStyle::Written {
        path: partial,
        families,
    })
}

/// File names in the build fonts directory, sorted; none when it is missing.
fn font_files(config: &ProjectConfig) -> TaskResult<Vec<String>> {
    let dir = config.output_dir(Task::Fonts);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(TaskError::io(&dir)(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(TaskError::io(&dir))?;
        if entry.file_type().is_ok_and(|t| t.is_file()) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// One include line per family, in the given order.
///
/// A name is skipped only when it repeats the family right before it, so
/// `a.woff, b.woff, a.woff2` yields three lines.
pub fn font_includes<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = String::new();
    let mut previous: Option<&str> = None;

    for name in names {
        let family = name.as_ref().split('.').next().unwrap_or_default();
        if previous == Some(family) {
            continue;
        }
        out.push_str(&format!(
            "@include font(\"{family}\", \"{family}\", \"400\", \"normal\");\r\n"
        ));
        previous = Some(family);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> ProjectConfig {
        let mut config = ProjectConfig::default_for(dir.path());
        config.project = "dist".into();
        config
    }

    fn touch(dir: &TempDir, relative: &str, contents: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_two_families_from_three_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "#src/scss/fonts.scss", "");
        for name in ["Roboto.woff", "Roboto.woff2", "OpenSans.woff"] {
            touch(&dir, &format!("dist/fonts/{name}"), "x");
        }

        let result = generate(&config(&dir)).unwrap();

        assert!(matches!(result, FontsStyle::Written { families: 2, .. }));
        let partial = fs::read_to_string(dir.path().join("#src/scss/fonts.scss")).unwrap();
        assert_eq!(
            partial,
            "@include font(\"OpenSans\", \"OpenSans\", \"400\", \"normal\");\r\n\
             @include font(\"Roboto\", \"Roboto\", \"400\", \"normal\");\r\n"
        );
    }

    #[test]
    fn test_non_empty_partial_untouched() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "#src/scss/fonts.scss", "// mine");
        touch(&dir, "dist/fonts/Roboto.woff", "x");

        assert_eq!(generate(&config(&dir)).unwrap(), FontsStyle::Untouched);
        let partial = fs::read_to_string(dir.path().join("#src/scss/fonts.scss")).unwrap();
        assert_eq!(partial, "// mine");
    }

    #[test]
    fn test_missing_partial_created() {
        let dir = TempDir::new().unwrap();

        let result = generate(&config(&dir)).unwrap();

        assert!(matches!(result, FontsStyle::Written { families: 0, .. }));
        assert!(dir.path().join("#src/scss/fonts.scss").exists());
    }

    #[test]
    fn test_only_consecutive_duplicates_collapse() {
        let out = font_includes(&["a.woff", "b.woff", "a.woff2"]);
        assert_eq!(out.lines().count(), 3);

        let out = font_includes(&["Lato-Bold.woff", "Lato-Bold.woff2"]);
        assert_eq!(
            out,
            "@include font(\"Lato-Bold\", \"Lato-Bold\", \"400\", \"normal\");\r\n"
        );
        assert_eq!(font_includes::<&str>(&[]), "");
    }
}
