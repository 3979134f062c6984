//! Shared helpers: paths, globs, file writes and MIME types.

pub mod fs;
pub mod glob;
pub mod mime;
pub mod path;
