//! `@@include` expansion for HTML and script sources.
//!
//! ```text
//! @@include('_header.html', {"title": "Home"})
//! <h1>@@title</h1>
//! ```
//!
//! Paths are relative to the including file. The optional JSON object
//! becomes the variable context of the included file, on top of the
//! context it was included from.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use super::{Includer, ToolError, ToolResult};

static INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)@@include\(\s*['"]([^'"]+)['"]\s*(?:,\s*(\{.*?\}))?\s*\)"#).unwrap()
});

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@@([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)").unwrap());

pub struct FileIncluder {
    max_depth: usize,
}

impl Default for FileIncluder {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

impl Includer for FileIncluder {
    fn expand(&self, text: &str, file: &Path) -> ToolResult<String> {
        self.expand_with(text, file, &Map::new(), 0)
    }
}

impl FileIncluder {
    fn expand_with(
        &self,
        text: &str,
        file: &Path,
        context: &Map<String, Value>,
        depth: usize,
    ) -> ToolResult<String> {
        if depth > self.max_depth {
            return Err(ToolError(format!(
                "include depth exceeds {} at {} (recursive include?)",
                self.max_depth,
                file.display()
            )));
        }

        let dir = file.parent().unwrap_or(Path::new(""));
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in INCLUDE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&substitute(&text[last..whole.start()], context));
            last = whole.end();

            let target = dir.join(&caps[1]);
            let included = fs::read_to_string(&target).map_err(|e| {
                ToolError(format!(
                    "{}: cannot include `{}`: {e}",
                    file.display(),
                    &caps[1]
                ))
            })?;

            let mut inner = context.clone();
            if let Some(json) = caps.get(2) {
                let vars: Map<String, Value> = serde_json::from_str(json.as_str()).map_err(|e| {
                    ToolError(format!(
                        "{}: invalid include context for `{}`: {e}",
                        file.display(),
                        &caps[1]
                    ))
                })?;
                inner.extend(vars);
            }

            out.push_str(&self.expand_with(&included, &target, &inner, depth + 1)?);
        }

        out.push_str(&substitute(&text[last..], context));
        Ok(out)
    }
}

/// Replace `@@name` and `@@name.field` with values from `context`.
///
/// Unknown names are left as written.
fn substitute(text: &str, context: &Map<String, Value>) -> String {
    if context.is_empty() {
        return text.to_string();
    }
    VARIABLE
        .replace_all(text, |caps: &Captures<'_>| {
            lookup(context, &caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn lookup(context: &Map<String, Value>, name: &str) -> Option<String> {
    let mut parts = name.split('.');
    let mut value = context.get(parts.next()?)?;
    for part in parts {
        value = value.get(part)?;
    }
    Some(match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
