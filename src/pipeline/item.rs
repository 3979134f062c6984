//! Files flowing through a task.

use std::fs;
use std::path::{Path, PathBuf};

use super::{TaskError, TaskResult};
use crate::utils::fs::write_file;
use crate::utils::glob::{SourceFile, SourceSet};

/// A file read into memory.
///
/// `relative` is the path below the glob base and becomes the path below
/// the output directory; renaming only touches its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamItem {
    pub base: PathBuf,
    pub relative: PathBuf,
    pub contents: Vec<u8>,
}

impl StreamItem {
    pub fn read(file: &SourceFile) -> TaskResult<Self> {
        let contents = fs::read(&file.path).map_err(TaskError::io(&file.path))?;
        let base = file
            .path
            .ancestors()
            .nth(file.relative.components().count())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            base,
            relative: file.relative.clone(),
            contents,
        })
    }

    /// Read every file of a source set, in path order.
    pub fn read_all(set: &SourceSet) -> TaskResult<Vec<Self>> {
        let files = set.resolve().map_err(|e| TaskError::Io {
            path: e.path,
            source: e.source,
        })?;
        files.iter().map(Self::read).collect()
    }

    /// Where the item was read from.
    pub fn source_path(&self) -> PathBuf {
        self.base.join(&self.relative)
    }

    /// Lowercase extension, empty when there is none.
    pub fn extension(&self) -> String {
        self.relative
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Contents as UTF-8 text.
    pub fn text(&self) -> TaskResult<&str> {
        std::str::from_utf8(&self.contents).map_err(|e| TaskError::Source {
            path: self.source_path(),
            message: format!("not valid UTF-8: {e}"),
        })
    }

    /// Same location, new contents.
    pub fn with_contents(&self, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            base: self.base.clone(),
            relative: self.relative.clone(),
            contents: contents.into(),
        }
    }

    /// Replace the extension: `style.css` with `min.css` gives `style.min.css`.
    pub fn renamed(mut self, extension: &str) -> Self {
        self.relative.set_extension(extension);
        self
    }

    /// Write below `dir`, returning the written path.
    pub fn write_to(&self, dir: &Path) -> TaskResult<PathBuf> {
        let path = dir.join(&self.relative);
        write_file(&path, &self.contents).map_err(TaskError::io(&path))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_keeps_glob_relative_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("#src/js/lib")).unwrap();
        fs::write(dir.path().join("#src/js/lib/a.js"), "a()").unwrap();

        let set = SourceSet::new(dir.path(), &["#src/js/**/*.js"], &[]).unwrap();
        let items = StreamItem::read_all(&set).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].relative, PathBuf::from("lib/a.js"));
        assert_eq!(items[0].base, dir.path().join("#src/js"));
        assert_eq!(items[0].source_path(), dir.path().join("#src/js/lib/a.js"));
        assert_eq!(items[0].text().unwrap(), "a()");
    }

    #[test]
    fn test_walk_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("#src"), "").unwrap();

        let set = SourceSet::new(dir.path(), &["#src/js/**/*.js"], &[]).unwrap();
        let err = StreamItem::read_all(&set).unwrap_err();

        assert!(matches!(err, TaskError::Io { .. }));
        assert_eq!(err.path(), Some(dir.path().join("#src/js").as_path()));
    }

    #[test]
    fn test_rename_and_write() {
        let dir = TempDir::new().unwrap();
        let item = StreamItem {
            base: PathBuf::from("/src"),
            relative: PathBuf::from("sub/style.css"),
            contents: b"a{}".to_vec(),
        };
        assert_eq!(item.extension(), "css");
        assert_eq!(item.stem(), "style");

        let min = item.with_contents("x").renamed("min.css");
        let written = min.write_to(dir.path()).unwrap();
        assert_eq!(written, dir.path().join("sub/style.min.css"));
        assert_eq!(fs::read_to_string(written).unwrap(), "x");
    }

    #[test]
    fn test_binary_text_is_source_error() {
        let item = StreamItem {
            base: PathBuf::new(),
            relative: PathBuf::from("a.html"),
            contents: vec![0xff, 0xfe],
        };
        assert!(matches!(item.text(), Err(TaskError::Source { .. })));
    }
}
