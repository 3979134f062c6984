//! Command-line interface module.

mod args;
pub mod watch;

pub use args::{Cli, Commands};
