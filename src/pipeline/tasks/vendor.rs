//! Vendor bundles: third-party files concatenated into the source tree.

use std::fs;

use crate::config::VendorBundle;
use crate::core::Task;
use crate::pipeline::{TaskContext, TaskError, TaskResult, TaskSummary};
use crate::utils::fs::write_atomic;

pub fn run(ctx: &TaskContext, task: Task, bundle: &VendorBundle) -> TaskResult<TaskSummary> {
    let mut summary = TaskSummary::new(task);

    let mut parts = Vec::with_capacity(bundle.inputs.len());
    for input in &bundle.inputs {
        let path = ctx.config.get_root().join(input);
        match fs::read_to_string(&path) {
            Ok(text) => parts.push(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                crate::log!("warning"; "{}: {} not found, skipped", task, input.display());
            }
            Err(e) => return Err(TaskError::io(&path)(e)),
        }
    }

    if parts.is_empty() {
        return Ok(summary);
    }

    // The css and js tasks may be reading this directory concurrently.
    let output = ctx.config.vendor_file(bundle);
    write_atomic(&output, parts.join("\n")).map_err(TaskError::io(&output))?;
    summary.written.push(output);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tasks::fixture::Project;

    #[test]
    fn test_concat_in_order() {
        let p = Project::new();
        p.file("node_modules/jquery/dist/jquery.js", "var jQuery = 1;");
        let bundle = VendorBundle {
            inputs: vec![
                "node_modules/jquery/dist/jquery.js".into(),
                "node_modules/missing.js".into(),
                "vendor/extra.js".into(),
            ],
            output: "js/libs.js".into(),
        };
        p.file("vendor/extra.js", "var extra = 2;");

        let summary = run(&p.ctx, Task::VendorJs, &bundle).unwrap();

        assert_eq!(summary.written, vec![p.root().join("#src/js/libs.js")]);
        assert_eq!(p.read("#src/js/libs.js"), "var jQuery = 1;\nvar extra = 2;");
    }

    #[test]
    fn test_no_inputs_writes_nothing() {
        let p = Project::new();
        let summary = run(&p.ctx, Task::VendorCss, &p.ctx.config.vendor.css).unwrap();

        assert!(summary.written.is_empty());
        assert!(!p.exists("#src/scss/libs.scss"));
    }
}
