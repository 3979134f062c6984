use std::fs;
use std::io::ErrorKind;

use super::{TaskError, TaskResult};
use crate::config::ProjectConfig;

/// Remove the build root. Nothing to remove counts as success.
pub fn clean(config: &ProjectConfig) -> TaskResult<()> {
    let root = config.build_root();
    match fs::remove_dir_all(&root) {
        Ok(()) => {
            crate::debug!("clean"; "removed {}", root.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TaskError::io(&root)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_twice() {
        let dir = TempDir::new().unwrap();
        let mut config = ProjectConfig::default_for(dir.path());
        config.project = "dist".into();
        fs::create_dir_all(dir.path().join("dist/css")).unwrap();
        fs::write(dir.path().join("dist/css/style.css"), "a{}").unwrap();

        clean(&config).unwrap();
        assert!(!dir.path().join("dist").exists());
        clean(&config).unwrap();
        assert!(dir.path().exists());
    }
}
