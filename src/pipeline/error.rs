use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;
use crate::toolchain::ToolError;

/// Why a task run failed.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The source file's content was rejected (syntax errors, bad includes).
    #[error("{}: {message}", path.display())]
    Source { path: PathBuf, message: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A binary converter (images, fonts) could not produce output.
    #[error("{}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("task panicked: {0}")]
    Panicked(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl TaskError {
    pub fn source(path: &Path, err: ToolError) -> Self {
        Self::Source {
            path: path.to_path_buf(),
            message: err.0,
        }
    }

    pub fn encode(path: &Path, err: ToolError) -> Self {
        Self::Encode {
            path: path.to_path_buf(),
            message: err.0,
        }
    }

    /// Adapter for `map_err` on filesystem calls.
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path of the file involved, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Source { path, .. } | Self::Io { path, .. } | Self::Encode { path, .. } => {
                Some(path)
            }
            Self::Config(_) | Self::Panicked(_) => None,
        }
    }
}
