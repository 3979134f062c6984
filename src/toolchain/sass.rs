//! SCSS compilation with grass.

use std::path::Path;

use grass::{Options, OutputStyle};

use super::{StyleCompiler, ToolError, ToolResult};

/// Compiles the entry file; `@import`/`@use` resolve next to the importing
/// file.
pub struct GrassCompiler;

impl StyleCompiler for GrassCompiler {
    fn compile(&self, path: &Path) -> ToolResult<String> {
        let load_paths: Vec<_> = path.parent().into_iter().collect();
        let options = Options::default()
            .load_paths(&load_paths)
            .style(OutputStyle::Expanded);

        grass::from_path(path, &options).map_err(|e| ToolError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compile_with_partial() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_vars.scss"), "$accent: #c00;").unwrap();
        let entry = dir.path().join("style.scss");
        fs::write(&entry, "@import 'vars';\n.a { .b { color: $accent; } }").unwrap();

        let css = GrassCompiler.compile(&entry).unwrap();
        assert!(css.contains(".a .b"));
        assert!(css.contains("color: #c00"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("style.scss");
        fs::write(&entry, ".a { color: $missing; }").unwrap();

        let err = GrassCompiler.compile(&entry).unwrap_err();
        assert!(err.to_string().contains("Undefined variable"));
    }
}
