//! Source globs: brace expansion, glob bases, and directory matching.
//!
//! Patterns are written the gulp way (`#src/img/**/*.{jpg,png}`) and are
//! always relative to the project root. Excludes live in their own list
//! instead of carrying a `!` prefix.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, PatternError};
use jwalk::WalkDir;
use thiserror::Error;

use super::path::to_slash;

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand `{a,b}` groups into one pattern per alternative.
///
/// Groups do not nest; the first `}` closes the group.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(len) = pattern[open..].find('}') else {
        return vec![pattern.to_string()];
    };
    let close = open + len;
    let (head, tail) = (&pattern[..open], &pattern[close + 1..]);

    pattern[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{head}{alt}{tail}")))
        .collect()
}

/// The directory part of a pattern before the first wildcard.
///
/// Matched files keep their path below this base, so `#src/js/**/*.js`
/// maps `#src/js/lib/a.js` to `lib/a.js`.
pub fn glob_base(pattern: &str) -> &str {
    let prefix = match pattern.find(['*', '?', '[']) {
        Some(i) => &pattern[..i],
        None => pattern,
    };
    prefix.rfind('/').map_or("", |i| &pattern[..i])
}

/// A set of compiled patterns, any of which may match.
#[derive(Debug, Clone, Default)]
pub struct GlobMatcher {
    patterns: Vec<Pattern>,
}

impl GlobMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .flat_map(|p| expand_braces(p.as_ref()))
            .map(|p| Pattern::new(&p))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Match a root-relative, `/`-separated path.
    pub fn matches(&self, relative: &str) -> bool {
        self.patterns.iter().any(|p| p.matches_with(relative, MATCH))
    }
}

/// A file matched by a [`SourceSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path below the glob base; this is the output-relative path.
    pub relative: PathBuf,
}

#[derive(Debug, Clone)]
struct SourceGlob {
    base: PathBuf,
    pattern: Pattern,
    recursive: bool,
}

/// Include/exclude patterns resolved against a project root.
#[derive(Debug, Clone)]
pub struct SourceSet {
    root: PathBuf,
    includes: Vec<SourceGlob>,
    excludes: GlobMatcher,
}

impl SourceSet {
    pub fn new<S: AsRef<str>>(
        root: &Path,
        includes: &[S],
        excludes: &[S],
    ) -> Result<Self, PatternError> {
        let mut globs = Vec::new();
        for include in includes {
            for pattern in expand_braces(include.as_ref()) {
                let base = glob_base(&pattern);
                let rest = pattern[base.len()..].trim_start_matches('/');
                globs.push(SourceGlob {
                    base: PathBuf::from(base),
                    recursive: rest.contains('/') || rest.contains("**"),
                    pattern: Pattern::new(&pattern)?,
                });
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            includes: globs,
            excludes: GlobMatcher::new(excludes)?,
        })
    }

    /// List matching files, sorted by path.
    ///
    /// A missing base directory contributes nothing; any other failure to
    /// read the tree is an error.
    pub fn resolve(&self) -> Result<Vec<SourceFile>, WalkError> {
        let mut found = BTreeMap::new();

        for glob in &self.includes {
            let base_dir = self.root.join(&glob.base);
            match fs::metadata(&base_dir) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(WalkError {
                        path: base_dir,
                        source,
                    });
                }
            }

            let walker = WalkDir::new(&base_dir).sort(true);
            let walker = if glob.recursive {
                walker
            } else {
                walker.max_depth(1)
            };

            for entry in walker {
                let entry = entry.map_err(|e| WalkError {
                    path: e.path().map_or_else(|| base_dir.clone(), Path::to_path_buf),
                    source: e.into(),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let Ok(relative_to_root) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let relative_to_root = to_slash(relative_to_root);
                if !glob.pattern.matches_with(&relative_to_root, MATCH)
                    || self.excludes.matches(&relative_to_root)
                {
                    continue;
                }
                let relative = path
                    .strip_prefix(&base_dir)
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                found
                    .entry(path.clone())
                    .or_insert(SourceFile { path, relative });
            }
        }

        Ok(found.into_values().collect())
    }
}

/// A directory under a glob base could not be read.
#[derive(Debug, Error)]
#[error("cannot read {}: {source}", path.display())]
pub struct WalkError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relatives(files: &[SourceFile]) -> Vec<String> {
        files.iter().map(|f| to_slash(&f.relative)).collect()
    }

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("a/*.js"), vec!["a/*.js"]);
        assert_eq!(
            expand_braces("img/**/*.{jpg,png}"),
            vec!["img/**/*.jpg", "img/**/*.png"]
        );
        assert_eq!(
            expand_braces("{a,b}/*.{x,y}"),
            vec!["a/*.x", "a/*.y", "b/*.x", "b/*.y"]
        );
        assert_eq!(expand_braces("broken{a,b"), vec!["broken{a,b"]);
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("#src/js/**/*.js"), "#src/js");
        assert_eq!(glob_base("#src/*.html"), "#src");
        assert_eq!(glob_base("#src/scss/style.scss"), "#src/scss");
        assert_eq!(glob_base("*.html"), "");
    }

    #[test]
    fn test_matcher_respects_separators() {
        let matcher = GlobMatcher::new(&["#src/*.html"]).unwrap();
        assert!(matcher.matches("#src/index.html"));
        assert!(!matcher.matches("#src/partials/header.html"));

        let deep = GlobMatcher::new(&["#src/**/*.html"]).unwrap();
        assert!(deep.matches("#src/index.html"));
        assert!(deep.matches("#src/partials/header.html"));
    }

    #[test]
    fn test_resolve_include_exclude() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "#src/index.html");
        touch(dir.path(), "#src/about.html");
        touch(dir.path(), "#src/_header.html");
        touch(dir.path(), "#src/partials/nav.html");

        let set = SourceSet::new(dir.path(), &["#src/*.html"], &["#src/_*.html"]).unwrap();
        assert_eq!(relatives(&set.resolve().unwrap()), vec!["about.html", "index.html"]);
    }

    #[test]
    fn test_resolve_recursive_keeps_structure() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "#src/img/logo.png");
        touch(dir.path(), "#src/img/icons/arrow.svg");
        touch(dir.path(), "#src/img/notes.txt");

        let set = SourceSet::new(
            dir.path(),
            &["#src/img/**/*.{jpg,svg,png}"],
            &[] as &[&str],
        )
        .unwrap();
        assert_eq!(
            relatives(&set.resolve().unwrap()),
            vec!["icons/arrow.svg", "logo.png"]
        );
    }

    #[test]
    fn test_resolve_literal_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "#src/scss/style.scss");
        touch(dir.path(), "#src/scss/_vars.scss");

        let set =
            SourceSet::new(dir.path(), &["#src/scss/style.scss"], &[] as &[&str]).unwrap();
        assert_eq!(relatives(&set.resolve().unwrap()), vec!["style.scss"]);
    }

    #[test]
    fn test_resolve_missing_base_is_empty() {
        let dir = TempDir::new().unwrap();
        let set = SourceSet::new(dir.path(), &["#src/js/**/*.js"], &[] as &[&str]).unwrap();
        assert!(set.resolve().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_reports_unreadable_base() {
        let dir = TempDir::new().unwrap();
        // `#src` is a file, so its `js` directory cannot even be stat'ed.
        touch(dir.path(), "#src");

        let set = SourceSet::new(dir.path(), &["#src/js/**/*.js"], &[] as &[&str]).unwrap();
        let err = set.resolve().unwrap_err();
        assert_eq!(err.path, dir.path().join("#src/js"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_reports_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "#src/img/logo.png");
        touch(dir.path(), "#src/img/locked/arrow.png");
        let locked = dir.path().join("#src/img/locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let set = SourceSet::new(dir.path(), &["#src/img/**/*.png"], &[] as &[&str]).unwrap();
        let readable = fs::read_dir(&locked).is_ok();
        let result = set.resolve();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Privileged users read through the permission bits.
        if readable {
            return;
        }
        assert!(result.is_err());
    }
}
