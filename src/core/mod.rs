//! Core types shared across the codebase.

mod state;
mod task;

pub use state::{is_shutdown, register_server, setup_shutdown_handler};
pub use task::Task;
